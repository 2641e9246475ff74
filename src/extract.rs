//! PDF text extraction strategies.
//!
//! Each strategy implements [`TextExtractor`]. An [`ExtractorChain`] tries
//! them in order and keeps the first result that is long enough to be real
//! text. The standard chain is: the `pdf-extract` library, the external
//! `pdftotext` tool, then a raw byte scan for PDF string literals.

use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::ExtractConfig;

/// Reason recorded when no strategy produced usable text.
pub const UNEXTRACTABLE: &str = "Testo non estraibile";

/// Longest PDF literal the byte scan will buffer before giving up on it.
const MAX_LITERAL_BYTES: usize = 4096;

/// Extraction error. Never panics; the stage records it and moves on.
#[derive(Debug)]
pub enum ExtractError {
    Pdf(String),
    Command(String),
    ByteScan(String),
    Unextractable,
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Command(e) => write!(f, "pdftotext failed: {}", e),
            ExtractError::ByteScan(e) => write!(f, "byte scan failed: {}", e),
            ExtractError::Unextractable => write!(f, "{}", UNEXTRACTABLE),
        }
    }
}

impl std::error::Error for ExtractError {}

/// One way of turning a PDF into text.
pub trait TextExtractor {
    /// Label written to the `# Metodo:` header line.
    fn method(&self) -> &'static str;

    fn extract(&self, path: &Path, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Text extraction through the `pdf-extract` crate.
pub struct LibraryExtractor;

impl TextExtractor for LibraryExtractor {
    fn method(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, _path: &Path, bytes: &[u8]) -> Result<String, ExtractError> {
        // pdf-extract panics on some malformed documents.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        }));
        match result {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
            Err(_) => Err(ExtractError::Pdf(
                "library panicked (malformed document)".to_string(),
            )),
        }
    }
}

/// Text extraction through an external `pdftotext` process.
pub struct CommandExtractor {
    program: String,
    max_output_bytes: usize,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, max_output_bytes: usize) -> Self {
        Self {
            program: program.into(),
            max_output_bytes,
        }
    }
}

impl TextExtractor for CommandExtractor {
    fn method(&self) -> &'static str {
        "pdftotext"
    }

    fn extract(&self, path: &Path, _bytes: &[u8]) -> Result<String, ExtractError> {
        let mut child = Command::new(&self.program)
            .args(["-layout", "-enc", "UTF-8"])
            .arg(path)
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ExtractError::Command(format!("cannot run {}: {}", self.program, e)))?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ExtractError::Command("stdout not captured".to_string()));
        };

        let limit = self.max_output_bytes as u64;
        let mut out = Vec::new();
        let read = stdout.take(limit + 1).read_to_end(&mut out);
        if read.is_err() || out.len() as u64 > limit {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ExtractError::Command(match read {
                Err(e) => format!("reading output of {}: {}", self.program, e),
                Ok(_) => format!("output exceeds {} bytes", self.max_output_bytes),
            }));
        }

        let status = child
            .wait()
            .map_err(|e| ExtractError::Command(format!("waiting for {}: {}", self.program, e)))?;
        if !status.success() {
            return Err(ExtractError::Command(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Last-resort scan of the raw file for parenthesized PDF string literals.
///
/// Only works for uncompressed content streams, which is enough for the
/// simple exports the breed sheets come from.
pub struct ByteScanExtractor;

static READABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[\p{L}\p{N}\s.,;:!?'"()\[\]/%&+°’“”«»–-]+$"#).unwrap()
});
static HAS_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}").unwrap());

impl TextExtractor for ByteScanExtractor {
    fn method(&self) -> &'static str {
        "byte-scan"
    }

    fn extract(&self, _path: &Path, bytes: &[u8]) -> Result<String, ExtractError> {
        let pieces: Vec<String> = scan_literals(bytes)
            .into_iter()
            .map(|raw| decode_latin1(&raw))
            .map(|s| s.trim().to_string())
            .filter(|s| looks_readable(s))
            .collect();

        if pieces.is_empty() {
            return Err(ExtractError::ByteScan(
                "no readable string literals".to_string(),
            ));
        }
        Ok(pieces.join(" "))
    }
}

fn looks_readable(s: &str) -> bool {
    s.chars().count() >= 2 && READABLE.is_match(s) && HAS_LETTER.is_match(s)
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Collect the decoded bytes of every balanced `( ... )` literal.
fn scan_literals(bytes: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'(' {
            i += 1;
            continue;
        }
        match read_literal(bytes, i + 1) {
            Some((literal, end)) => {
                out.push(literal);
                i = end;
            }
            None => i += 1,
        }
    }
    out
}

/// Read one literal starting just after its opening parenthesis. Returns the
/// decoded bytes and the index after the closing parenthesis.
fn read_literal(bytes: &[u8], start: usize) -> Option<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut depth = 1usize;
    let mut j = start;
    while j < bytes.len() {
        if buf.len() > MAX_LITERAL_BYTES {
            return None;
        }
        let b = bytes[j];
        match b {
            b'\\' => {
                j += 1;
                let next = *bytes.get(j)?;
                match next {
                    b'n' => buf.push(b'\n'),
                    b'r' => buf.push(b'\r'),
                    b't' => buf.push(b'\t'),
                    b'b' => buf.push(0x08),
                    b'f' => buf.push(0x0c),
                    b'(' | b')' | b'\\' => buf.push(next),
                    b'\r' => {
                        // line continuation, CRLF counts as one
                        if bytes.get(j + 1) == Some(&b'\n') {
                            j += 1;
                        }
                    }
                    b'\n' => {}
                    b'0'..=b'7' => {
                        let mut value: u32 = 0;
                        let mut digits = 0;
                        while digits < 3 {
                            match bytes.get(j) {
                                Some(&d) if (b'0'..=b'7').contains(&d) => {
                                    value = value * 8 + u32::from(d - b'0');
                                    digits += 1;
                                    j += 1;
                                }
                                _ => break,
                            }
                        }
                        buf.push((value & 0xff) as u8);
                        continue;
                    }
                    other => buf.push(other),
                }
                j += 1;
            }
            b'(' => {
                depth += 1;
                buf.push(b);
                j += 1;
            }
            b')' => {
                depth -= 1;
                j += 1;
                if depth == 0 {
                    return Some((buf, j));
                }
                buf.push(b);
            }
            _ => {
                buf.push(b);
                j += 1;
            }
        }
    }
    None
}

/// Text produced by the winning strategy.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub method: &'static str,
    pub text: String,
}

/// Ordered list of strategies tried one after the other.
pub struct ExtractorChain {
    extractors: Vec<Box<dyn TextExtractor>>,
    min_chars: usize,
    accept_chars: usize,
}

impl ExtractorChain {
    pub fn new(extractors: Vec<Box<dyn TextExtractor>>, min_chars: usize, accept_chars: usize) -> Self {
        Self {
            extractors,
            min_chars,
            accept_chars,
        }
    }

    /// Library, then external tool, then byte scan.
    pub fn standard(config: &ExtractConfig) -> Self {
        Self::new(
            vec![
                Box::new(LibraryExtractor),
                Box::new(CommandExtractor::new(
                    config.pdftotext.clone(),
                    config.max_output_bytes,
                )),
                Box::new(ByteScanExtractor),
            ],
            config.min_chars,
            config.accept_chars,
        )
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.method()).collect()
    }

    /// Try each strategy in order. The first output longer than `min_chars`
    /// wins; otherwise the longest output is kept if it is longer than
    /// `accept_chars`.
    pub fn extract(&self, path: &Path, bytes: &[u8]) -> Result<Extraction, ExtractError> {
        let mut best: Option<Extraction> = None;

        for extractor in &self.extractors {
            let text = match extractor.extract(path, bytes) {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!(
                        path = %path.display(),
                        method = extractor.method(),
                        error = %e,
                        "extraction attempt failed"
                    );
                    continue;
                }
            };

            let trimmed = text.trim();
            let chars = trimmed.chars().count();
            if chars > self.min_chars {
                return Ok(Extraction {
                    method: extractor.method(),
                    text: trimmed.to_string(),
                });
            }

            tracing::debug!(
                path = %path.display(),
                method = extractor.method(),
                chars,
                "extraction too short"
            );
            let longer = best
                .as_ref()
                .map_or(true, |b| chars > b.text.chars().count());
            if longer {
                best = Some(Extraction {
                    method: extractor.method(),
                    text: trimmed.to_string(),
                });
            }
        }

        match best {
            Some(candidate) if candidate.text.chars().count() > self.accept_chars => Ok(candidate),
            _ => Err(ExtractError::Unextractable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Fixed {
        method: &'static str,
        output: Option<String>,
        calls: Rc<Cell<u32>>,
    }

    impl Fixed {
        fn boxed(method: &'static str, output: Option<&str>, calls: &Rc<Cell<u32>>) -> Box<dyn TextExtractor> {
            Box::new(Fixed {
                method,
                output: output.map(str::to_string),
                calls: Rc::clone(calls),
            })
        }
    }

    impl TextExtractor for Fixed {
        fn method(&self) -> &'static str {
            self.method
        }

        fn extract(&self, _path: &Path, _bytes: &[u8]) -> Result<String, ExtractError> {
            self.calls.set(self.calls.get() + 1);
            self.output
                .clone()
                .ok_or_else(|| ExtractError::Pdf("boom".to_string()))
        }
    }

    fn text(n: usize) -> String {
        "x".repeat(n)
    }

    #[test]
    fn first_long_output_wins_and_stops() {
        let calls = Rc::new(Cell::new(0));
        let long = text(150);
        let chain = ExtractorChain::new(
            vec![
                Fixed::boxed("a", None, &calls),
                Fixed::boxed("b", Some(long.as_str()), &calls),
                Fixed::boxed("c", Some(text(500).as_str()), &calls),
            ],
            100,
            50,
        );
        let got = chain.extract(Path::new("x.pdf"), b"").unwrap();
        assert_eq!(got.method, "b");
        assert_eq!(got.text.len(), 150);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn longest_short_output_accepted_above_floor() {
        let calls = Rc::new(Cell::new(0));
        let chain = ExtractorChain::new(
            vec![
                Fixed::boxed("a", Some(text(60).as_str()), &calls),
                Fixed::boxed("b", Some(text(80).as_str()), &calls),
                Fixed::boxed("c", Some(text(10).as_str()), &calls),
            ],
            100,
            50,
        );
        let got = chain.extract(Path::new("x.pdf"), b"").unwrap();
        assert_eq!(got.method, "b");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn everything_short_is_unextractable() {
        let calls = Rc::new(Cell::new(0));
        let chain = ExtractorChain::new(
            vec![
                Fixed::boxed("a", Some(text(50).as_str()), &calls),
                Fixed::boxed("b", None, &calls),
            ],
            100,
            50,
        );
        let err = chain.extract(Path::new("x.pdf"), b"").unwrap_err();
        assert!(matches!(err, ExtractError::Unextractable));
        assert_eq!(err.to_string(), UNEXTRACTABLE);
    }

    #[test]
    fn standard_chain_order() {
        let chain = ExtractorChain::standard(&ExtractConfig::default());
        assert_eq!(chain.methods(), vec!["pdf-extract", "pdftotext", "byte-scan"]);
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = LibraryExtractor
            .extract(Path::new("x.pdf"), b"not a pdf")
            .unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn missing_command_returns_error() {
        let extractor = CommandExtractor::new("definitely-not-a-real-pdftotext-binary", 1024);
        let err = extractor.extract(Path::new("x.pdf"), b"").unwrap_err();
        assert!(matches!(err, ExtractError::Command(_)));
    }

    #[test]
    fn byte_scan_decodes_escapes() {
        let literals = scan_literals(br"BT (Cane \(energico\)) Tj (a\\b) Tj (\101\102C) Tj (x\
y) Tj ET");
        let decoded: Vec<String> = literals.iter().map(|l| decode_latin1(l)).collect();
        assert_eq!(decoded, vec!["Cane (energico)", "a\\b", "ABC", "xy"]);
    }

    #[test]
    fn byte_scan_handles_nested_parens() {
        let literals = scan_literals(b"(outer (inner) text)");
        assert_eq!(decode_latin1(&literals[0]), "outer (inner) text");
    }

    #[test]
    fn byte_scan_keeps_readable_text_only() {
        let pdf = b"%PDF-1.4\n(\x01\x02\x03\x04) (Labrador Retriever) (12) (Descrizione: cane docile) (\xe8 vero)";
        let text = ByteScanExtractor.extract(Path::new("x.pdf"), pdf).unwrap();
        assert_eq!(text, "Labrador Retriever Descrizione: cane docile è vero");
    }

    #[test]
    fn byte_scan_without_literals_fails() {
        let err = ByteScanExtractor
            .extract(Path::new("x.pdf"), b"no strings here")
            .unwrap_err();
        assert!(matches!(err, ExtractError::ByteScan(_)));
    }

    #[cfg(unix)]
    fn fake_tool(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn command_output_is_capped_while_running() {
        let tmp = tempfile::TempDir::new().unwrap();
        // Never exits on its own; only the cap can stop it.
        let tool = fake_tool(tmp.path(), "endless", "exec yes testo-infinito");
        let started = std::time::Instant::now();
        let err = CommandExtractor::new(tool, 1024)
            .extract(Path::new("razze.pdf"), b"")
            .unwrap_err();
        assert!(err.to_string().contains("exceeds 1024 bytes"), "{err}");
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn command_output_under_cap_is_returned() {
        let tmp = tempfile::TempDir::new().unwrap();
        let tool = fake_tool(tmp.path(), "short", "echo \"1. Labrador\"");
        let text = CommandExtractor::new(tool, 1024)
            .extract(Path::new("razze.pdf"), b"")
            .unwrap();
        assert_eq!(text, "1. Labrador\n");

        let failing = fake_tool(tmp.path(), "broken", "exit 3");
        let err = CommandExtractor::new(failing, 1024)
            .extract(Path::new("razze.pdf"), b"")
            .unwrap_err();
        assert!(err.to_string().contains("exited with"), "{err}");
    }
}

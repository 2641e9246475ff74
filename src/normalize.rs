//! Whitespace normalization and the `.txt` metadata header.
//!
//! Every extracted document is normalized the same way before it is written,
//! and carries a four-line `# `-prefixed header describing where the text
//! came from. Downstream stages strip that header with
//! [`strip_comment_header`] before parsing.

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalize extracted text: drop NUL bytes, unify line endings, collapse
/// spaces/tabs, trim each line, and keep at most one empty line between
/// paragraphs.
pub fn normalize_whitespace(text: &str) -> String {
    let unified = text
        .replace('\0', "")
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let collapsed = HORIZONTAL_WS.replace_all(&unified, " ");
    let trimmed_lines = collapsed
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_RUNS
        .replace_all(&trimmed_lines, "\n\n")
        .trim()
        .to_string()
}

/// The metadata block written at the top of every normalized `.txt` file.
pub fn metadata_header(
    source_name: &str,
    method: &str,
    extracted_at: DateTime<Utc>,
    chars: usize,
) -> String {
    format!(
        "# Fonte: {}\n# Metodo: {}\n# Estratto: {}\n# Caratteri: {}\n\n",
        source_name,
        method,
        extracted_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        chars
    )
}

/// Drop leading `#` comment lines (and blank lines between them).
pub fn strip_comment_header(text: &str) -> &str {
    let mut rest = text;
    loop {
        let line_end = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
        let line = rest[..line_end].trim();
        if line.starts_with('#') || (line.is_empty() && line_end > 0) {
            rest = &rest[line_end..];
        } else {
            break;
        }
    }
    rest
}

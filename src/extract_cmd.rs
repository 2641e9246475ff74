//! Extractor stage: PDF tree → normalized `.txt` tree.
//!
//! Every `.pdf` under the source root is run through the standard
//! [`ExtractorChain`], normalized, given a metadata header and written to
//! the mirrored path under the output root. Existing `.txt` files are
//! always overwritten. A PDF that yields no usable text is recorded in the
//! report and the walk moves on.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::extract::{ExtractError, ExtractorChain, UNEXTRACTABLE};
use crate::fsutil::write_overwrite;
use crate::mapping::resolve;
use crate::models::SourceDocument;
use crate::normalize::{metadata_header, normalize_whitespace};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::report::{ExtractReport, FileError};
use crate::slug::slugify;

const STAGE: &str = "extract";

/// Every `.pdf` (any case) under `root`, sorted by path.
pub fn scan_sources(root: &Path) -> Result<Vec<SourceDocument>> {
    let mut docs = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_pdf = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            continue;
        }

        let path = entry.into_path();
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        let placement = resolve(&relative);
        docs.push(SourceDocument {
            path,
            relative,
            category: placement.category,
            species: placement.species,
        });
    }
    Ok(docs)
}

/// Output path for a source document: mirrored directory, slugified stem.
pub fn output_path(output_root: &Path, doc: &SourceDocument) -> PathBuf {
    let stem = doc
        .relative
        .file_stem()
        .map(|s| slugify(&s.to_string_lossy()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "documento".to_string());
    let dir = doc
        .relative
        .parent()
        .map(|p| output_root.join(p))
        .unwrap_or_else(|| output_root.to_path_buf());
    dir.join(format!("{}.txt", stem))
}

pub fn run_extract(
    config: &Config,
    source_root: &Path,
    output_root: &Path,
    progress: &dyn ProgressReporter,
) -> Result<ExtractReport> {
    if !source_root.is_dir() {
        bail!("Source folder does not exist: {}", source_root.display());
    }

    let chain = ExtractorChain::standard(&config.extract);
    progress.report(ProgressEvent::Discovering { stage: STAGE });
    let docs = scan_sources(source_root)?;

    let folders: BTreeSet<&Path> = docs
        .iter()
        .filter_map(|d| d.relative.parent())
        .collect();
    tracing::info!(
        files = docs.len(),
        folders = folders.len(),
        methods = ?chain.methods(),
        "extracting PDFs"
    );

    let mut report = ExtractReport {
        folders: folders.len(),
        files: docs.len(),
        ..Default::default()
    };
    let total = docs.len() as u64;

    for (i, doc) in docs.iter().enumerate() {
        match extract_one(&chain, doc, output_root) {
            Ok(method) => {
                report.extracted += 1;
                *report.by_method.entry(method.to_string()).or_insert(0) += 1;
            }
            Err(e) => {
                let message = match e.downcast_ref::<ExtractError>() {
                    Some(ExtractError::Unextractable) => UNEXTRACTABLE.to_string(),
                    _ => format!("{:#}", e),
                };
                tracing::warn!(
                    file = %doc.relative.display(),
                    species = %doc.species,
                    error = %message,
                    "extraction failed"
                );
                report.errors.push(FileError::new(&doc.path, message));
            }
        }

        progress.report(ProgressEvent::Processing {
            stage: STAGE,
            n: i as u64 + 1,
            total,
        });
    }

    Ok(report)
}

/// Extract, normalize and write one document. Returns the winning method.
fn extract_one(
    chain: &ExtractorChain,
    doc: &SourceDocument,
    output_root: &Path,
) -> Result<&'static str> {
    let bytes = std::fs::read(&doc.path)
        .with_context(|| format!("Failed to read {}", doc.path.display()))?;
    let extraction = chain.extract(&doc.path, &bytes)?;

    let body = normalize_whitespace(&extraction.text);
    let source_name = doc
        .relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let header = metadata_header(
        &source_name,
        extraction.method,
        Utc::now(),
        body.chars().count(),
    );

    let target = output_path(output_root, doc);
    write_overwrite(&target, &format!("{}{}\n", header, body))?;
    tracing::debug!(
        path = %target.display(),
        method = extraction.method,
        "wrote text"
    );
    Ok(extraction.method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scan_finds_pdfs_with_placement() {
        let tmp = TempDir::new().unwrap();
        let dogs = tmp.path().join("01-Animali domestici").join("Cani");
        fs::create_dir_all(&dogs).unwrap();
        fs::write(dogs.join("Razze Cani.PDF"), b"%PDF").unwrap();
        fs::write(dogs.join("note.txt"), b"x").unwrap();

        let docs = scan_sources(tmp.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].category, "domestici");
        assert_eq!(docs[0].species, "dog");
        assert_eq!(
            output_path(Path::new("/out"), &docs[0]),
            Path::new("/out/01-Animali domestici/Cani/razze-cani.txt")
        );
    }

    #[test]
    fn corrupt_pdf_is_recorded_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("pdf").join("Gatti");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("rotto.pdf"), b"not a pdf at all").unwrap();
        let out = tmp.path().join("raw");

        let mut config = Config::default();
        config.extract.pdftotext = "definitely-not-installed-pdftotext".to_string();
        let report = run_extract(&config, &tmp.path().join("pdf"), &out, &NoProgress).unwrap();
        assert_eq!(report.files, 1);
        assert_eq!(report.folders, 1);
        assert_eq!(report.extracted, 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, UNEXTRACTABLE);
        assert!(!out.join("Gatti/rotto.txt").exists());
    }

    #[test]
    fn missing_source_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = run_extract(
            &Config::default(),
            &tmp.path().join("nope"),
            &tmp.path().join("raw"),
            &NoProgress,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}

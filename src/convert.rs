//! Batch conversion of the raw text tree into Markdown drafts.
//!
//! Walks every `.txt` under the raw root, resolves `(category, species)`
//! from the folder names, parses the numbered breed entries and writes one
//! draft per breed to `<output>/<category>/<species>/<slug>.md`.
//!
//! Drafts are first-write-wins: once a file exists it is treated as
//! human-owned and never overwritten, so re-running the converter only adds
//! breeds that are new. The global `index.json` is rebuilt from the output
//! tree after every run.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::fsutil::{write_if_absent, write_json, WriteOutcome};
use crate::mapping::{resolve, IgnoreRules};
use crate::normalize::strip_comment_header;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::report::{ConvertReport, FileError};
use crate::text_parser::{generate_markdown, parse_multiple_breeds};

const STAGE: &str = "convert";

/// Global index written to `<output>/index.json`.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalIndex {
    pub generated: String,
    pub stats: IndexStats,
    pub categories: BTreeMap<String, CategoryIndex>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct IndexStats {
    pub categories: usize,
    pub species: usize,
    pub breeds: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryIndex {
    pub species: BTreeMap<String, Vec<String>>,
}

/// What happened to one raw text file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FileOutcome {
    parsed: usize,
    created: usize,
    existing: usize,
    unmapped: bool,
    /// Drafts of this file that could not be written.
    errors: Vec<FileError>,
}

/// All `.txt` files under `root`, sorted by path.
fn scan_text_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_txt = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if is_txt {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub fn run_convert(
    config: &Config,
    raw_root: &Path,
    output_root: &Path,
    progress: &dyn ProgressReporter,
) -> Result<ConvertReport> {
    if !raw_root.is_dir() {
        bail!("Raw text folder does not exist: {}", raw_root.display());
    }

    let ignore = IgnoreRules::new(&config.convert.ignore_globs)?;
    let today = Utc::now().date_naive();

    progress.report(ProgressEvent::Discovering { stage: STAGE });
    let files = scan_text_files(raw_root)?;
    tracing::info!(files = files.len(), raw = %raw_root.display(), "converting raw text");

    let mut report = ConvertReport {
        files_seen: files.len(),
        ..Default::default()
    };
    let total = files.len() as u64;

    for (i, path) in files.iter().enumerate() {
        let relative = path.strip_prefix(raw_root).unwrap_or(path);
        let file_name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if ignore.is_ignored(&file_name) {
            tracing::debug!(file = %relative.display(), "ignored by pattern");
            report.skipped_ignored += 1;
        } else {
            match convert_file(config, path, relative, output_root, today) {
                Ok(None) => {
                    tracing::debug!(file = %relative.display(), "content too short");
                    report.skipped_short += 1;
                }
                Ok(Some(outcome)) => {
                    report.processed += 1;
                    report.breeds_parsed += outcome.parsed;
                    report.breeds_created += outcome.created;
                    report.skipped_existing += outcome.existing;
                    if outcome.unmapped {
                        report.unmapped += 1;
                    }
                    for e in &outcome.errors {
                        tracing::warn!(path = %e.path, error = %e.message, "draft not written");
                    }
                    report.errors.extend(outcome.errors);
                }
                Err(e) => {
                    tracing::warn!(file = %relative.display(), error = %e, "conversion failed");
                    report.errors.push(FileError::new(path, format!("{:#}", e)));
                }
            }
        }

        progress.report(ProgressEvent::Processing {
            stage: STAGE,
            n: i as u64 + 1,
            total,
        });
    }

    let index = build_global_index(output_root)?;
    write_json(&output_root.join("index.json"), &index)?;
    tracing::info!(
        created = report.breeds_created,
        breeds = index.stats.breeds,
        "rebuilt global index"
    );

    Ok(report)
}

/// Convert one raw file. `Ok(None)` means it was too short to parse.
fn convert_file(
    config: &Config,
    path: &Path,
    relative: &Path,
    output_root: &Path,
    today: NaiveDate,
) -> Result<Option<FileOutcome>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let content = strip_comment_header(&raw).trim();
    if content.chars().count() < config.convert.min_content_chars {
        return Ok(None);
    }

    let placement = resolve(relative);
    if !placement.mapped {
        tracing::warn!(
            file = %relative.display(),
            species = %placement.species,
            "folder not in lookup tables, using folder name"
        );
    }

    let mut outcome = FileOutcome {
        unmapped: !placement.mapped,
        ..Default::default()
    };
    let target_dir = output_root
        .join(&placement.category)
        .join(&placement.species);

    for breed in parse_multiple_breeds(content) {
        outcome.parsed += 1;
        let md = generate_markdown(&breed, &placement.species, &placement.category, today);
        let target = target_dir.join(format!("{}.md", md.slug));
        match write_if_absent(&target, &md.content) {
            Ok(WriteOutcome::Created) => {
                tracing::debug!(path = %target.display(), "created draft");
                outcome.created += 1;
            }
            Ok(WriteOutcome::AlreadyExists) => outcome.existing += 1,
            Err(e) => outcome
                .errors
                .push(FileError::new(&target, format!("{:#}", e))),
        }
    }

    Ok(Some(outcome))
}

fn sorted_dirs(path: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Re-scan `<output>/<category>/<species>/*.md` (skipping `_` files) into
/// the global index.
pub fn build_global_index(output_root: &Path) -> Result<GlobalIndex> {
    let mut categories = BTreeMap::new();
    let mut stats = IndexStats::default();

    if output_root.is_dir() {
        for (category, category_path) in sorted_dirs(output_root)? {
            let mut cat_index = CategoryIndex::default();
            for (species, species_path) in sorted_dirs(&category_path)? {
                let mut ids = Vec::new();
                for entry in std::fs::read_dir(&species_path)? {
                    let entry = entry?;
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if !entry.file_type()?.is_file() || name.starts_with('_') {
                        continue;
                    }
                    if let Some(id) = name.strip_suffix(".md") {
                        ids.push(id.to_string());
                    }
                }
                ids.sort();
                stats.species += 1;
                stats.breeds += ids.len();
                cat_index.species.insert(species, ids);
            }
            stats.categories += 1;
            categories.insert(category, cat_index);
        }
    }

    Ok(GlobalIndex {
        generated: Utc::now().to_rfc3339(),
        stats,
        categories,
    })
}

//! Run reports returned by each stage.
//!
//! Stages never share a mutable accumulator: each one returns its own report
//! by value and the caller decides how to combine and print them. The printed
//! summaries go to stdout so they stay visible when logs are filtered.

use std::collections::BTreeMap;
use std::path::Path;

/// Number of per-file errors shown in a printed summary.
pub const MAX_ERRORS_SHOWN: usize = 10;

/// A per-file failure that was recorded and skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub path: String,
    pub message: String,
}

impl FileError {
    pub fn new(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.display().to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of `breeds extract`.
#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    pub folders: usize,
    pub files: usize,
    pub extracted: usize,
    /// Successful extractions per winning method.
    pub by_method: BTreeMap<String, usize>,
    pub errors: Vec<FileError>,
}

/// Outcome of `breeds parse`.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub breeds_parsed: usize,
    pub files_written: usize,
    pub output_dir: String,
}

/// Outcome of `breeds convert`.
#[derive(Debug, Clone, Default)]
pub struct ConvertReport {
    pub files_seen: usize,
    pub processed: usize,
    pub breeds_parsed: usize,
    pub breeds_created: usize,
    pub skipped_existing: usize,
    pub skipped_ignored: usize,
    pub skipped_short: usize,
    pub unmapped: usize,
    pub errors: Vec<FileError>,
}

/// Outcome of `breeds build`.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub lang: String,
    pub files_seen: usize,
    pub built: usize,
    pub skipped_stub: usize,
    pub categories: usize,
    pub errors: Vec<FileError>,
}

/// Reports from a full `breeds run`, merged by the caller.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub extract: Option<ExtractReport>,
    pub convert: Option<ConvertReport>,
    pub build: Option<BuildReport>,
}

impl PipelineReport {
    pub fn with_extract(mut self, report: ExtractReport) -> Self {
        self.extract = Some(report);
        self
    }

    pub fn with_convert(mut self, report: ConvertReport) -> Self {
        self.convert = Some(report);
        self
    }

    pub fn with_build(mut self, report: BuildReport) -> Self {
        self.build = Some(report);
        self
    }

    /// Per-file errors across every stage that ran.
    pub fn total_errors(&self) -> usize {
        self.extract.as_ref().map_or(0, |r| r.errors.len())
            + self.convert.as_ref().map_or(0, |r| r.errors.len())
            + self.build.as_ref().map_or(0, |r| r.errors.len())
    }
}

/// Human summary printed at the end of a run.
pub trait Summary {
    fn summary_lines(&self) -> Vec<String>;

    fn print_summary(&self) {
        for line in self.summary_lines() {
            println!("{}", line);
        }
    }
}

fn error_lines(errors: &[FileError]) -> Vec<String> {
    let mut lines = Vec::new();
    if errors.is_empty() {
        return lines;
    }
    lines.push(format!("  errors: {}", errors.len()));
    for e in errors.iter().take(MAX_ERRORS_SHOWN) {
        lines.push(format!("    - {}: {}", e.path, e.message));
    }
    if errors.len() > MAX_ERRORS_SHOWN {
        lines.push(format!(
            "    ... and {} more",
            errors.len() - MAX_ERRORS_SHOWN
        ));
    }
    lines
}

impl Summary for ExtractReport {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            "extract".to_string(),
            format!("  folders: {}", self.folders),
            format!("  pdf files: {}", self.files),
            format!("  extracted: {}", self.extracted),
        ];
        for (method, count) in &self.by_method {
            lines.push(format!("    via {}: {}", method, count));
        }
        lines.extend(error_lines(&self.errors));
        lines
    }
}

impl Summary for ParseReport {
    fn summary_lines(&self) -> Vec<String> {
        vec![
            "parse".to_string(),
            format!("  breeds parsed: {}", self.breeds_parsed),
            format!("  files written: {}", self.files_written),
            format!("  output: {}", self.output_dir),
        ]
    }
}

impl Summary for ConvertReport {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            "convert".to_string(),
            format!("  text files: {}", self.files_seen),
            format!("  processed: {}", self.processed),
            format!("  breeds parsed: {}", self.breeds_parsed),
            format!("  created: {}", self.breeds_created),
            format!("  skipped (already exists): {}", self.skipped_existing),
            format!("  skipped (ignored): {}", self.skipped_ignored),
            format!("  skipped (too short): {}", self.skipped_short),
        ];
        if self.unmapped > 0 {
            lines.push(format!("  unmapped folders: {}", self.unmapped));
        }
        lines.extend(error_lines(&self.errors));
        lines
    }
}

impl Summary for BuildReport {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("build {}", self.lang),
            format!("  markdown files: {}", self.files_seen),
            format!("  breeds built: {}", self.built),
            format!("  skipped (empty stub): {}", self.skipped_stub),
            format!("  categories: {}", self.categories),
        ];
        lines.extend(error_lines(&self.errors));
        lines
    }
}

impl Summary for PipelineReport {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(r) = &self.extract {
            lines.extend(r.summary_lines());
        }
        if let Some(r) = &self.convert {
            lines.extend(r.summary_lines());
        }
        if let Some(r) = &self.build {
            lines.extend(r.summary_lines());
        }
        lines.push(format!("total errors: {}", self.total_errors()));
        lines
    }
}

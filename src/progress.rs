//! Stage progress reporting.
//!
//! Reports what a stage is scanning and how many files are left, so long
//! extraction runs show movement. Progress is emitted on **stderr** so stdout
//! keeps only the run summary.

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The stage is walking its input tree. Total unknown.
    Discovering { stage: &'static str },
    /// `n` files handled out of `total`.
    Processing {
        stage: &'static str,
        n: u64,
        total: u64,
    },
}

/// Reports stage progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "convert  processing  12 / 1,340 files".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Discovering { stage } => format!("{}  discovering...\n", stage),
            ProgressEvent::Processing { stage, n, total } => format!(
                "{}  processing  {} / {} files\n",
                stage,
                format_number(*n),
                format_number(*total)
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Discovering { stage } => serde_json::json!({
                "event": "progress",
                "stage": stage,
                "phase": "discovering"
            }),
            ProgressEvent::Processing { stage, n, total } => serde_json::json!({
                "event": "progress",
                "stage": stage,
                "phase": "processing",
                "n": n,
                "total": total
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

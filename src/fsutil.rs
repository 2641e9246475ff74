//! File writing helpers shared by the stages.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Outcome of a first-write-wins write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    AlreadyExists,
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Write `content`, replacing whatever is at `path`.
pub fn write_overwrite(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write `content` only if nothing exists at `path` yet. The check and the
/// create are one `create_new` open, so an existing file is never touched.
pub fn write_if_absent(path: &Path, content: &str) -> Result<WriteOutcome> {
    ensure_parent(path)?;
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(WriteOutcome::AlreadyExists),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to create {}", path.display()));
        }
    };
    fill_or_remove(path, &mut file, content)?;
    Ok(WriteOutcome::Created)
}

/// Write the body of a freshly created file. On failure the partial file is
/// removed so a later run can create it again.
fn fill_or_remove<W: Write>(path: &Path, writer: &mut W, content: &str) -> Result<()> {
    let written = writer.write_all(content.as_bytes()).and_then(|_| writer.flush());
    if let Err(e) = written {
        let _ = std::fs::remove_file(path);
        return Err(e).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}

/// Pretty JSON with a 2-space indent and a trailing newline.
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_overwrite(path, &to_json_pretty(value)?)
}

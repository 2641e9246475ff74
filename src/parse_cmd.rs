//! Standalone text parser: one text file (or stdin) → Markdown drafts.
//!
//! Unlike the batch converter this always overwrites, and it writes a
//! per-folder `_index.json` listing the breeds it produced.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::fsutil::{write_json, write_overwrite};
use crate::models::BreedRef;
use crate::normalize::strip_comment_header;
use crate::report::ParseReport;
use crate::text_parser::{generate_markdown, parse_multiple_breeds};

/// Per-folder summary written next to the drafts.
#[derive(Debug, Clone, Serialize)]
pub struct FolderIndex {
    pub generated: String,
    pub species: String,
    pub category: String,
    pub count: usize,
    pub breeds: Vec<BreedRef>,
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    if !input.is_file() {
        bail!("Input file does not exist: {}", input.display());
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

pub fn run_parse(
    config: &Config,
    input: &Path,
    species: &str,
    category: &str,
    output_dir: Option<PathBuf>,
) -> Result<ParseReport> {
    let text = read_input(input)?;
    let output_dir = output_dir.unwrap_or_else(|| {
        config
            .markdown_root(&config.lang)
            .join(category)
            .join(species)
    });

    let breeds = parse_multiple_breeds(strip_comment_header(&text));
    if breeds.is_empty() {
        tracing::warn!(input = %input.display(), "no numbered breed entries found");
    }

    let today = Utc::now().date_naive();
    let mut refs = Vec::with_capacity(breeds.len());
    for breed in &breeds {
        let md = generate_markdown(breed, species, category, today);
        let target = output_dir.join(format!("{}.md", md.slug));
        write_overwrite(&target, &md.content)?;
        tracing::debug!(path = %target.display(), "wrote draft");
        refs.push(BreedRef {
            id: md.slug,
            name: breed.name.clone(),
        });
    }

    let index = FolderIndex {
        generated: Utc::now().to_rfc3339(),
        species: species.to_string(),
        category: category.to_string(),
        count: refs.len(),
        breeds: refs,
    };
    write_json(&output_dir.join("_index.json"), &index)?;
    tracing::info!(breeds = index.count, output = %output_dir.display(), "parsed breeds");

    Ok(ParseReport {
        breeds_parsed: breeds.len(),
        files_written: index.count,
        output_dir: output_dir.display().to_string(),
    })
}

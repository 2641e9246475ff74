//! Numbered breed lists → [`BreedEntry`] values → Markdown drafts.
//!
//! Input text looks like:
//!
//! ```text
//! 1. Labrador
//! Descrizione: Cane energico
//! Comportamento: Amichevole
//!
//! 2. Barboncino
//! Descrizione: Intelligente
//! ```
//!
//! Every line that starts with `<digits>.` opens a new entry. Fields are
//! captured one line each; lines without a known label are dropped.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;

use crate::models::{BreedEntry, BreedMarkdown};
use crate::slug::slugify;

/// Body used for a section with no source text.
pub const PLACEHOLDER: &str = "_Da completare_";

/// Default for every 1–5 characteristic score.
pub const DEFAULT_SCORE: u8 = 3;

/// Characteristic score keys, in front-matter order.
pub const SCORE_KEYS: [&str; 5] = ["energy", "affection", "trainability", "grooming", "health"];

/// Section headings, in file order.
pub const SECTION_TITLES: [&str; 6] = [
    "Descrizione",
    "Comportamento",
    "Problemi Genetici",
    "Cure",
    "Pro",
    "Contro",
];

static ENTRY_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());
static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s*").unwrap());

#[derive(Debug, Clone, Copy)]
enum Field {
    Description,
    Behavior,
    GeneticIssues,
    Care,
    Pros,
    Cons,
}

static LABELS: Lazy<Vec<(Regex, Field)>> = Lazy::new(|| {
    [
        (r"(?i)^descrizione\s*:\s*(.*)$", Field::Description),
        (r"(?i)^comportamento\s*:\s*(.*)$", Field::Behavior),
        (r"(?i)^problemi\s+genetici\s*:\s*(.*)$", Field::GeneticIssues),
        (r"(?i)^cure\s*:\s*(.*)$", Field::Care),
        (r"(?i)^pro\s*:\s*(.*)$", Field::Pros),
        (r"(?i)^contro\s*:\s*(.*)$", Field::Cons),
    ]
    .into_iter()
    .map(|(pattern, field)| (Regex::new(pattern).unwrap(), field))
    .collect()
});

impl BreedEntry {
    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Description => self.description = value,
            Field::Behavior => self.behavior = value,
            Field::GeneticIssues => self.genetic_issues = value,
            Field::Care => self.care = value,
            Field::Pros => self.pros = value,
            Field::Cons => self.cons = value,
        }
    }

    /// Field texts paired with their section headings.
    pub fn sections(&self) -> [(&'static str, &str); 6] {
        [
            (SECTION_TITLES[0], self.description.as_str()),
            (SECTION_TITLES[1], self.behavior.as_str()),
            (SECTION_TITLES[2], self.genetic_issues.as_str()),
            (SECTION_TITLES[3], self.care.as_str()),
            (SECTION_TITLES[4], self.pros.as_str()),
            (SECTION_TITLES[5], self.cons.as_str()),
        ]
    }
}

/// Split text into blocks: one at the start and one per `<digits>.` line.
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks: Vec<Vec<&str>> = vec![Vec::new()];
    for line in text.lines() {
        if ENTRY_START.is_match(line) {
            blocks.push(Vec::new());
        }
        if let Some(current) = blocks.last_mut() {
            current.push(line);
        }
    }
    blocks
}

fn parse_block(lines: &[&str], ordinal: u32) -> Option<BreedEntry> {
    let mut rest = lines.iter().map(|l| l.trim()).skip_while(|l| l.is_empty());
    let heading = rest.next()?;

    let (number, name) = match NUMBER_PREFIX.captures(heading) {
        Some(caps) => {
            let number = caps[1].parse().unwrap_or(ordinal);
            (number, heading[caps[0].len()..].trim())
        }
        None => (ordinal, heading),
    };

    // The slug becomes the file name, so a name without letters or digits
    // has nowhere to go.
    if name.chars().count() <= 1 || slugify(name).is_empty() {
        return None;
    }

    let mut entry = BreedEntry {
        name: name.to_string(),
        number,
        ..Default::default()
    };

    for line in rest {
        if let Some((value, field)) = LABELS
            .iter()
            .find_map(|(re, field)| re.captures(line).map(|c| (c[1].trim().to_string(), *field)))
        {
            entry.set(field, value);
        }
    }

    Some(entry)
}

/// Parse every numbered entry in `text`. Entries with an empty or
/// single-character name are dropped.
pub fn parse_multiple_breeds(text: &str) -> Vec<BreedEntry> {
    split_blocks(text)
        .iter()
        .filter(|block| block.iter().any(|l| !l.trim().is_empty()))
        .enumerate()
        .filter_map(|(i, block)| parse_block(block, i as u32 + 1))
        .collect()
}

/// Quote a front-matter string value.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render the Markdown draft for one breed.
pub fn generate_markdown(
    breed: &BreedEntry,
    species: &str,
    category: &str,
    today: NaiveDate,
) -> BreedMarkdown {
    let slug = slugify(&breed.name);
    let mut out = String::new();

    out.push_str("---\n");
    let _ = writeln!(out, "id: {}", slug);
    let _ = writeln!(out, "name: {}", quote(&breed.name));
    let _ = writeln!(out, "species: {}", species);
    let _ = writeln!(out, "category: {}", category);
    out.push_str("lang: it\n");
    for key in ["fci_group", "origin", "lifespan", "size"] {
        let _ = writeln!(out, "{}: null", key);
    }
    out.push_str("# Caratteristiche (1-5)\n");
    for key in SCORE_KEYS {
        let _ = writeln!(out, "{}: {}", key, DEFAULT_SCORE);
    }
    out.push_str("status: draft\n");
    out.push_str("needs_review: true\n");
    let _ = writeln!(out, "last_updated: {}", today.format("%Y-%m-%d"));
    out.push_str("---\n\n");

    let _ = writeln!(out, "# {}\n", breed.name);
    for (title, text) in breed.sections() {
        let body = if text.trim().is_empty() {
            PLACEHOLDER
        } else {
            text.trim()
        };
        let _ = writeln!(out, "## {}\n\n{}\n", title, body);
    }

    BreedMarkdown {
        slug,
        content: out,
    }
}

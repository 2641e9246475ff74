//! Core data types that flow between the pipeline stages.
//!
//! Files on disk are the real interface between stages; these types are the
//! in-memory view of one unit of each stage's input or output.

use serde::Serialize;
use std::path::PathBuf;

/// A source PDF found under `<category-folder>/<species-folder>/`.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    /// Path relative to the source root, used to mirror the output tree.
    pub relative: PathBuf,
    pub category: String,
    pub species: String,
}

/// One numbered breed parsed from a text block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreedEntry {
    pub name: String,
    pub number: u32,
    pub description: String,
    pub behavior: String,
    pub genetic_issues: String,
    pub care: String,
    pub pros: String,
    pub cons: String,
}

/// A generated Markdown draft: the slug doubles as file stem and front-matter `id`.
#[derive(Debug, Clone)]
pub struct BreedMarkdown {
    pub slug: String,
    pub content: String,
}

/// Where a raw text file lands in the Markdown tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub category: String,
    pub species: String,
    /// `false` when neither lookup table matched and the parent folder was used.
    pub mapped: bool,
}

/// `{id, name}` pair used by the per-folder `_index.json`.
#[derive(Debug, Clone, Serialize)]
pub struct BreedRef {
    pub id: String,
    pub name: String,
}

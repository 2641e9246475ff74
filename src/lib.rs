//! # Breed Pipeline
//!
//! File-driven batch pipeline that turns breed reference PDFs into the
//! Markdown drafts and JSON assets used by the app.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌────────────┐   ┌────────────┐
//! │   PDF    │──▶│ Extractor │──▶│ Converter  │──▶│   Builder  │
//! │  tree    │   │  .txt     │   │ .md drafts │   │ .json      │
//! └──────────┘   └───────────┘   └────────────┘   └────────────┘
//! ```
//!
//! Each stage reads one directory tree and writes another; the files on
//! disk are the only interface between them. Every stage returns its own
//! report and keeps going when a single file fails.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | PDF text extraction strategies |
//! | [`extract_cmd`] | Extractor stage |
//! | [`text_parser`] | Numbered-entry parser and Markdown generator |
//! | [`parse_cmd`] | Standalone text parser |
//! | [`mapping`] | Folder-name lookup tables and ignore rules |
//! | [`convert`] | Batch converter and global index |
//! | [`frontmatter`] | Markdown front-matter and section parsing |
//! | [`json_builder`] | BreedDetail JSON builder |
//! | [`pipeline`] | Full extract → convert → build run |

pub mod config;
pub mod convert;
pub mod extract;
pub mod extract_cmd;
pub mod frontmatter;
pub mod fsutil;
pub mod heuristics;
pub mod json_builder;
pub mod mapping;
pub mod models;
pub mod normalize;
pub mod parse_cmd;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod slug;
pub mod text_parser;

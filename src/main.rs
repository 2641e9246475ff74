//! # Breed Pipeline CLI (`breeds`)
//!
//! Runs the content pipeline stages one at a time or end to end.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `breeds extract [SOURCE] [OUTPUT]` | PDF tree → normalized `.txt` tree |
//! | `breeds parse <INPUT> <SPECIES> <CATEGORY> [OUTPUT_DIR]` | One text file → Markdown drafts |
//! | `breeds convert [RAW] [OUTPUT]` | Raw text tree → Markdown drafts + `index.json` |
//! | `breeds build [LANG]` | Markdown tree → BreedDetail JSON |
//! | `breeds run` | All of the above with configured paths |
//!
//! ## Examples
//!
//! ```bash
//! breeds extract ~/Documenti/razze content/breeds/raw
//! breeds parse - dog domestici < incollato.txt
//! breeds convert
//! breeds build en
//! RUST_LOG=debug breeds run --skip-extract
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use breed_pipeline::config;
use breed_pipeline::convert::run_convert;
use breed_pipeline::extract_cmd::run_extract;
use breed_pipeline::json_builder::run_build;
use breed_pipeline::parse_cmd::run_parse;
use breed_pipeline::pipeline::run_pipeline;
use breed_pipeline::progress::ProgressMode;
use breed_pipeline::report::Summary;

/// Breed content pipeline: PDF → text → Markdown → JSON.
///
/// All commands accept a `--config` flag pointing to a TOML file. When the
/// file does not exist, built-in defaults apply.
#[derive(Parser)]
#[command(
    name = "breeds",
    about = "Breed content pipeline: PDF → text → Markdown → JSON",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/breeds.toml`.
    #[arg(long, global = true, default_value = "./config/breeds.toml")]
    config: PathBuf,

    /// Progress on stderr. Defaults to `human` when stderr is a TTY.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from every PDF under SOURCE into OUTPUT.
    ///
    /// Output mirrors the source folders; existing `.txt` files are
    /// overwritten.
    Extract {
        /// PDF source root. Defaults to `paths.pdf`.
        source: Option<PathBuf>,
        /// Text output root. Defaults to `paths.raw`.
        output: Option<PathBuf>,
    },

    /// Parse one text file (or `-` for stdin) into Markdown drafts.
    ///
    /// Always overwrites the drafts it writes and adds `_index.json`.
    Parse {
        /// Input text file, or `-` for stdin.
        input: PathBuf,
        /// Species id written to front-matter (e.g. `dog`).
        species: String,
        /// Category id written to front-matter (e.g. `domestici`).
        category: String,
        /// Output folder. Defaults to `<content>/<lang>/<category>/<species>`.
        output_dir: Option<PathBuf>,
    },

    /// Convert the whole raw text tree into Markdown drafts.
    ///
    /// Existing drafts are never overwritten.
    Convert {
        /// Raw text root. Defaults to `paths.raw`.
        raw: Option<PathBuf>,
        /// Markdown output root. Defaults to `<content>/<lang>`.
        output: Option<PathBuf>,
    },

    /// Build BreedDetail JSON from the Markdown tree of one language.
    Build {
        /// Language folder. Defaults to `lang`.
        lang: Option<String>,
    },

    /// Run extract, convert and build with the configured paths.
    Run {
        /// Start from the existing raw text tree.
        #[arg(long)]
        skip_extract: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_or_default(&cli.config)?;
    let progress = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    match cli.command {
        Commands::Extract { source, output } => {
            let source = source.unwrap_or_else(|| cfg.paths.pdf.clone());
            let output = output.unwrap_or_else(|| cfg.paths.raw.clone());
            run_extract(&cfg, &source, &output, progress.as_ref())?.print_summary();
        }
        Commands::Parse {
            input,
            species,
            category,
            output_dir,
        } => {
            run_parse(&cfg, &input, &species, &category, output_dir)?.print_summary();
        }
        Commands::Convert { raw, output } => {
            let raw = raw.unwrap_or_else(|| cfg.paths.raw.clone());
            let output = output.unwrap_or_else(|| cfg.markdown_root(&cfg.lang));
            run_convert(&cfg, &raw, &output, progress.as_ref())?.print_summary();
        }
        Commands::Build { lang } => {
            let lang = lang.unwrap_or_else(|| cfg.lang.clone());
            run_build(&cfg, &lang, progress.as_ref())?.print_summary();
        }
        Commands::Run { skip_extract } => {
            run_pipeline(&cfg, skip_extract, progress.as_ref())?.print_summary();
        }
    }

    Ok(())
}

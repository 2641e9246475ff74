use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    /// Language folder for Markdown drafts and JSON output.
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub convert: ConvertConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            lang: default_lang(),
            extract: ExtractConfig::default(),
            convert: ConvertConfig::default(),
        }
    }
}

fn default_lang() -> String {
    "it".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Root of the `<category>/<species>/*.pdf` source tree.
    #[serde(default = "default_pdf_root")]
    pub pdf: PathBuf,
    /// Normalized text tree written by `extract` and read by `convert`.
    #[serde(default = "default_raw_root")]
    pub raw: PathBuf,
    /// Markdown content root; drafts live under `<content>/<lang>`.
    #[serde(default = "default_content_root")]
    pub content: PathBuf,
    /// JSON asset root; output lives under `<assets>/<lang>`.
    #[serde(default = "default_assets_root")]
    pub assets: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pdf: default_pdf_root(),
            raw: default_raw_root(),
            content: default_content_root(),
            assets: default_assets_root(),
        }
    }
}

fn default_pdf_root() -> PathBuf {
    PathBuf::from("content/breeds/pdf")
}
fn default_raw_root() -> PathBuf {
    PathBuf::from("content/breeds/raw")
}
fn default_content_root() -> PathBuf {
    PathBuf::from("content/breeds")
}
fn default_assets_root() -> PathBuf {
    PathBuf::from("src/assets/data/breeds")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractConfig {
    /// An extractor wins outright once its output is longer than this.
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    /// Best candidate is still accepted when longer than this.
    #[serde(default = "default_accept_chars")]
    pub accept_chars: usize,
    /// External text extraction tool.
    #[serde(default = "default_pdftotext")]
    pub pdftotext: String,
    /// Maximum stdout accepted from the external tool.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            accept_chars: default_accept_chars(),
            pdftotext: default_pdftotext(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

fn default_min_chars() -> usize {
    100
}
fn default_accept_chars() -> usize {
    50
}
fn default_pdftotext() -> String {
    "pdftotext".to_string()
}
fn default_max_output_bytes() -> usize {
    50 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConvertConfig {
    /// Text files shorter than this (after the header is stripped) are skipped.
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
    /// File-name globs that are never parsed, matched case-insensitively.
    #[serde(default = "default_ignore_globs")]
    pub ignore_globs: Vec<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            min_content_chars: default_min_content_chars(),
            ignore_globs: default_ignore_globs(),
        }
    }
}

fn default_min_content_chars() -> usize {
    100
}

fn default_ignore_globs() -> Vec<String> {
    vec![
        "info-*".to_string(),
        "elenco-*".to_string(),
        "lista-*".to_string(),
        "*prova*".to_string(),
        "00-*".to_string(),
    ]
}

impl Config {
    /// Markdown tree for one language: `<content>/<lang>`.
    pub fn markdown_root(&self, lang: &str) -> PathBuf {
        self.paths.content.join(lang)
    }

    /// JSON output tree for one language: `<assets>/<lang>`.
    pub fn assets_root(&self, lang: &str) -> PathBuf {
        self.paths.assets.join(lang)
    }
}

/// Load the config file, or fall back to defaults when it does not exist.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.lang.trim().is_empty() {
        anyhow::bail!("lang must not be empty");
    }

    if config.extract.min_chars == 0 {
        anyhow::bail!("extract.min_chars must be > 0");
    }

    if config.extract.accept_chars > config.extract.min_chars {
        anyhow::bail!(
            "extract.accept_chars ({}) must be <= extract.min_chars ({})",
            config.extract.accept_chars,
            config.extract.min_chars
        );
    }

    if config.extract.max_output_bytes == 0 {
        anyhow::bail!("extract.max_output_bytes must be > 0");
    }

    if config.convert.min_content_chars == 0 {
        anyhow::bail!("convert.min_content_chars must be > 0");
    }

    Ok(())
}

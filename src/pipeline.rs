//! Full run: extract → convert → build, using the configured paths.

use anyhow::Result;

use crate::config::Config;
use crate::convert::run_convert;
use crate::extract_cmd::run_extract;
use crate::json_builder::run_build;
use crate::progress::ProgressReporter;
use crate::report::PipelineReport;

/// Run every stage in order. Extraction is skipped when `skip_extract` is
/// set or the PDF root does not exist; the other stages always run.
pub fn run_pipeline(
    config: &Config,
    skip_extract: bool,
    progress: &dyn ProgressReporter,
) -> Result<PipelineReport> {
    let mut report = PipelineReport::default();

    if skip_extract {
        tracing::info!("skipping extraction");
    } else if config.paths.pdf.is_dir() {
        let extract = run_extract(config, &config.paths.pdf, &config.paths.raw, progress)?;
        report = report.with_extract(extract);
    } else {
        tracing::info!(
            pdf = %config.paths.pdf.display(),
            "PDF folder not found, skipping extraction"
        );
    }

    let markdown_root = config.markdown_root(&config.lang);
    let convert = run_convert(config, &config.paths.raw, &markdown_root, progress)?;
    report = report.with_convert(convert);

    let build = run_build(config, &config.lang, progress)?;
    Ok(report.with_build(build))
}

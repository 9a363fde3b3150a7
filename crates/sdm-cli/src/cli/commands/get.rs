//! `sdm get <url>` – download one resource in parallel sections.

use anyhow::{Context, Result};
use sdm_core::config;
use sdm_core::job::{default_target_filename, Job};
use sdm_core::pipeline;
use std::path::PathBuf;

/// Output path: `--output` if given, else the URL's file name in the current directory.
pub(crate) fn resolve_target(url: &str, output: Option<PathBuf>) -> Result<PathBuf> {
    match output {
        Some(path) => Ok(path),
        None => Ok(std::env::current_dir()
            .context("current directory")?
            .join(default_target_filename(url))),
    }
}

pub async fn run_get(url: &str, output: Option<PathBuf>, sections: Option<usize>) -> Result<()> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    let target = resolve_target(url, output)?;
    let sections = sections.unwrap_or(cfg.sections);
    let job = Job::new(url, &target, sections)?;

    println!("Making connection");
    let report = pipeline::download_async(job, cfg)
        .await
        .with_context(|| format!("download of {} failed", url))?;

    println!(
        "Saved {} ({} bytes, {} sections)",
        target.display(),
        report.bytes_merged,
        report.sections
    );
    println!(
        "Download completed in {:.2} seconds",
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

//! End-to-end download of one job.
//!
//! Drives `Idle -> Probing -> Planning -> Fetching -> Merging -> Done`, with
//! `Failed` reachable from any stage. Nothing is retried: the first error
//! ends the run and is returned to the caller. A zero-length resource skips
//! planning and fetching and merges zero sections into an empty target.

use anyhow::Context;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::SdmConfig;
use crate::control::AbortToken;
use crate::downloader::{self, FetchContext};
use crate::error::Result;
use crate::fetch_head;
use crate::job::Job;
use crate::segmenter;
use crate::storage::{self, ArtifactStore};

/// Pipeline stage, used for logging transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Probing,
    Planning,
    Fetching,
    Merging,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::Probing => "probing",
            Stage::Planning => "planning",
            Stage::Fetching => "fetching",
            Stage::Merging => "merging",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Resource size reported by the probe.
    pub total_size: u64,
    pub sections: usize,
    /// Bytes appended to the final file.
    pub bytes_merged: u64,
    pub elapsed: Duration,
}

/// Downloads `job` with the settings in `cfg`. Blocks the calling thread.
pub fn download(job: &Job, cfg: &SdmConfig) -> Result<DownloadReport> {
    download_with_abort(job, cfg, AbortToken::new())
}

/// Like [`download`], but section fetches also stop when `abort` is set by the caller.
pub fn download_with_abort(job: &Job, cfg: &SdmConfig, abort: AbortToken) -> Result<DownloadReport> {
    let started = Instant::now();
    let mut stage = Stage::Idle;
    let result = run_stages(job, cfg, abort, &mut stage, started);
    match &result {
        Ok(report) => {
            transition(&mut stage, Stage::Done);
            tracing::info!(
                "downloaded {} ({} bytes) in {:.2}s",
                job.target().display(),
                report.bytes_merged,
                report.elapsed.as_secs_f64()
            );
        }
        Err(e) => {
            tracing::error!("download failed while {}: {}", stage, e);
            transition(&mut stage, Stage::Failed);
        }
    }
    result
}

/// Runs [`download`] on tokio's blocking pool.
pub async fn download_async(job: Job, cfg: SdmConfig) -> anyhow::Result<DownloadReport> {
    let report = tokio::task::spawn_blocking(move || download(&job, &cfg))
        .await
        .context("download task join")??;
    Ok(report)
}

fn run_stages(
    job: &Job,
    cfg: &SdmConfig,
    abort: AbortToken,
    stage: &mut Stage,
    started: Instant,
) -> Result<DownloadReport> {
    let http = cfg.http_options();

    transition(stage, Stage::Probing);
    let size = fetch_head::probe_size(job.url(), &http)?;
    tracing::info!("size is {} bytes", size);
    let store = ArtifactStore::for_target(job.target(), cfg.work_dir.as_deref());

    if size == 0 {
        // Nothing to fetch or plan: the target is created empty.
        transition(stage, Stage::Merging);
        let bytes_merged = storage::merge(job.target(), &store, 0)?;
        return Ok(DownloadReport {
            total_size: 0,
            sections: 0,
            bytes_merged,
            elapsed: started.elapsed(),
        });
    }

    transition(stage, Stage::Planning);
    let ranges = segmenter::plan(size, job.sections())?;
    tracing::info!(
        "each section is {} bytes, {} sections",
        size / job.sections() as u64,
        ranges.len()
    );
    tracing::debug!(?ranges, "planned ranges");

    transition(stage, Stage::Fetching);
    store.prepare()?;
    let ctx = Arc::new(FetchContext {
        url: job.url().to_string(),
        http,
        store: store.clone(),
        verify_ranges: cfg.verify_ranges,
        abort,
    });
    downloader::fetch_sections(ctx, &ranges)?;

    transition(stage, Stage::Merging);
    let bytes_merged = storage::merge(job.target(), &store, ranges.len())?;
    if cfg.cleanup_sections {
        store.cleanup(ranges.len());
    }

    Ok(DownloadReport {
        total_size: size,
        sections: ranges.len(),
        bytes_merged,
        elapsed: started.elapsed(),
    })
}

fn transition(stage: &mut Stage, next: Stage) {
    tracing::debug!("{} -> {}", stage, next);
    *stage = next;
}

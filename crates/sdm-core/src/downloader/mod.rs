//! Fan-out of section downloads.
//!
//! Runs one thread per planned section (the section count is the concurrency
//! level), each issuing a single HTTP Range GET into its own artifact. Every
//! thread reports a typed result over a channel; the coordinator waits for
//! all of them before returning, so nothing downstream sees partial output.

mod segment;

use std::collections::HashSet;
use std::io;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use crate::control::AbortToken;
use crate::error::{DownloadError, Result};
use crate::http::HttpOptions;
use crate::segmenter::ByteRange;
use crate::storage::ArtifactStore;

/// Read-only state shared by every section fetcher of one run.
#[derive(Debug)]
pub struct FetchContext {
    pub url: String,
    pub http: HttpOptions,
    pub store: ArtifactStore,
    /// Require `206` + matching `Content-Range` + exact byte count.
    pub verify_ranges: bool,
    /// Set when any section fails; in-flight transfers then stop.
    pub abort: AbortToken,
}

/// Body of one section thread.
type SectionWork = Box<dyn FnOnce() + Send + 'static>;

/// Downloads every range in parallel and returns the total bytes fetched.
///
/// On the first failure the shared abort token is set so the remaining
/// transfers stop early, but the coordinator still waits for every thread.
/// The error returned is the first real failure to arrive (sibling
/// cancellations are only reported if nothing else failed). Artifacts already
/// written are left in place.
///
/// If the OS refuses a thread, no further sections are started; the ones
/// already running are cancelled and joined, and the refused section is
/// reported as a `Transfer` error.
pub fn fetch_sections(ctx: Arc<FetchContext>, ranges: &[ByteRange]) -> Result<u64> {
    fetch_sections_with(ctx, ranges, |index, work| {
        thread::Builder::new()
            .name(format!("section-{}", index))
            .spawn(work)
    })
}

fn fetch_sections_with<S>(ctx: Arc<FetchContext>, ranges: &[ByteRange], mut spawn: S) -> Result<u64>
where
    S: FnMut(usize, SectionWork) -> io::Result<JoinHandle<()>>,
{
    let count = ranges.len();
    let (tx, rx) = mpsc::channel();
    let mut handles = Vec::with_capacity(count);
    let mut first_error: Option<DownloadError> = None;

    for (index, range) in ranges.iter().copied().enumerate() {
        let worker_ctx = Arc::clone(&ctx);
        let tx = tx.clone();
        let work: SectionWork = Box::new(move || {
            tracing::debug!(section = index, "fetching {}", range.range_header_value());
            let res = segment::fetch_section(&worker_ctx, index, range);
            if res.is_err() {
                worker_ctx.abort.abort();
            }
            let _ = tx.send((index, res));
        });
        match spawn(index, work) {
            Ok(handle) => handles.push((index, handle)),
            Err(e) => {
                // The refused closure is dropped here along with its sender.
                tracing::error!("cannot start thread for section {}: {}", index, e);
                ctx.abort.abort();
                first_error = Some(DownloadError::Transfer {
                    section: index,
                    reason: format!("cannot start section thread: {}", e),
                });
                break;
            }
        }
    }
    drop(tx);

    let mut reported: HashSet<usize> = HashSet::with_capacity(handles.len());
    let mut first_abort: Option<DownloadError> = None;
    let mut total = 0u64;

    // Ends when every sender is gone: each thread either sent or panicked.
    for (index, res) in rx {
        reported.insert(index);
        match res {
            Ok(n) => {
                tracing::info!("downloaded {} bytes for section {}", n, index);
                total += n;
            }
            Err(e) if e.is_aborted() => {
                tracing::debug!("section {} cancelled", index);
                first_abort.get_or_insert(e);
            }
            Err(e) => {
                tracing::error!("section {} failed: {}", index, e);
                first_error.get_or_insert(e);
            }
        }
    }

    for (index, handle) in handles {
        if handle.join().is_err() && !reported.contains(&index) {
            tracing::error!("section {} worker panicked", index);
            ctx.abort.abort();
            first_error.get_or_insert(DownloadError::Transfer {
                section: index,
                reason: "section worker panicked".to_string(),
            });
        }
    }

    match first_error.or(first_abort) {
        Some(e) => Err(e),
        None => Ok(total),
    }
}

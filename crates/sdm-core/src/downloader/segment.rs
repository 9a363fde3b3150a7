//! Single-section HTTP Range GET written to its own artifact.

use std::cell::RefCell;
use std::str;

use super::FetchContext;
use crate::error::{DownloadError, Result};
use crate::fetch_head::parse_http_status;
use crate::segmenter::ByteRange;
use crate::storage::SectionWriter;

/// Why the write callback refused the body.
enum WriteAbort {
    Storage(std::io::Error),
    RangeMismatch(String),
}

/// Downloads one section: GET with `Range: bytes=start-end`, body written
/// verbatim to the artifact for `index`. Returns the number of bytes written.
///
/// With `verify_ranges`, the response must be `206` with a `Content-Range`
/// matching `range`, and the byte count must equal `range.len()`.
pub(super) fn fetch_section(ctx: &FetchContext, index: usize, range: ByteRange) -> Result<u64> {
    if ctx.abort.is_aborted() {
        return Err(DownloadError::Aborted { section: index });
    }

    let path = ctx.store.artifact_path(index);
    let mut writer = SectionWriter::create(&path)?;
    if range.is_empty() {
        return writer.finish();
    }

    let transport_err = |source: curl::Error| DownloadError::Unreachable {
        url: ctx.url.clone(),
        section: Some(index),
        source,
    };

    let headers: RefCell<Vec<String>> = RefCell::new(Vec::new());
    let mut write_abort: Option<WriteAbort> = None;
    let mut checked = false;
    let mut discard_body = false;

    let mut easy = curl::easy::Easy::new();
    ctx.http.apply(&mut easy, &ctx.url).map_err(transport_err)?;
    // curl sends this as `Range: bytes=start-end`.
    easy.range(&format!("{}-{}", range.start, range.end))
        .map_err(transport_err)?;
    easy.progress(true).map_err(transport_err)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    if line.starts_with("HTTP/") {
                        headers.borrow_mut().clear();
                    }
                    headers.borrow_mut().push(line.to_string());
                }
                true
            })
            .map_err(transport_err)?;
        transfer
            .write_function(|data| {
                if !checked {
                    checked = true;
                    let lines = headers.borrow();
                    let status = parse_http_status(&lines).unwrap_or(0);
                    if !(200..300).contains(&status) {
                        // Reported from the response code after perform.
                        discard_body = true;
                    } else if ctx.verify_ranges {
                        if let Err(reason) = check_range_response(status, &lines, range) {
                            write_abort = Some(WriteAbort::RangeMismatch(reason));
                            return Ok(0);
                        }
                    }
                }
                if discard_body {
                    return Ok(data.len());
                }
                match writer.write(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        write_abort = Some(WriteAbort::Storage(e));
                        Ok(0)
                    }
                }
            })
            .map_err(transport_err)?;
        transfer
            .progress_function(|_, _, _, _| !ctx.abort.is_aborted())
            .map_err(transport_err)?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if e.is_write_error() {
            match write_abort.take() {
                Some(WriteAbort::Storage(io)) => return Err(DownloadError::io(&path, io)),
                Some(WriteAbort::RangeMismatch(reason)) => {
                    return Err(DownloadError::Transfer {
                        section: index,
                        reason,
                    })
                }
                None => {}
            }
        }
        if e.is_aborted_by_callback() && ctx.abort.is_aborted() {
            return Err(DownloadError::Aborted { section: index });
        }
        // Once a response has started, a failure means the body was cut short.
        if headers.borrow().is_empty() {
            return Err(transport_err(e));
        }
        return Err(DownloadError::Transfer {
            section: index,
            reason: e.to_string(),
        });
    }

    let code = easy.response_code().map_err(transport_err)?;
    if !(200..300).contains(&code) {
        return Err(DownloadError::UnsupportedStatus {
            url: ctx.url.clone(),
            status: code,
            section: Some(index),
        });
    }

    let received = writer.finish()?;
    let expected = range.len();
    tracing::debug!(section = index, received, expected, "section fetched");
    if ctx.verify_ranges && received != expected {
        return Err(DownloadError::Transfer {
            section: index,
            reason: format!("expected {} bytes, got {}", expected, received),
        });
    }
    Ok(received)
}

/// Checks that a response is `206` and its `Content-Range` covers exactly `range`.
fn check_range_response(
    status: u32,
    lines: &[String],
    range: ByteRange,
) -> std::result::Result<(), String> {
    if status != 206 {
        return Err(format!("expected 206 Partial Content, got HTTP {}", status));
    }
    match parse_content_range(lines) {
        Some((start, end)) if start == range.start && end == range.end => Ok(()),
        Some((start, end)) => Err(format!(
            "Content-Range {}-{} does not match requested {}-{}",
            start, end, range.start, range.end
        )),
        None => Err("missing Content-Range".to_string()),
    }
}

/// Parses `Content-Range: bytes start-end/total` into `(start, end)`.
fn parse_content_range(lines: &[String]) -> Option<(u64, u64)> {
    lines.iter().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case("content-range") {
            return None;
        }
        let spec = value.trim().strip_prefix("bytes")?.trim_start();
        let (span, _total) = spec.split_once('/')?;
        let (start, end) = span.split_once('-')?;
        Some((start.trim().parse().ok()?, end.trim().parse().ok()?))
    })
}

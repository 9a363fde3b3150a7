//! HTTP HEAD probing.
//!
//! Uses the curl crate (libcurl) to confirm the resource is reachable and read
//! its `Content-Length`. `Accept-Ranges`, ETag and Last-Modified are captured
//! for logging only.

mod parse;

use std::str;

use crate::error::{DownloadError, Result};
use crate::http::HttpOptions;

pub(crate) use parse::parse_http_status;

/// Result of a HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResult {
    /// Total size in bytes, if `Content-Length` is present and numeric.
    pub content_length: Option<u64>,
    /// True if server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
    /// `ETag` value if present.
    pub etag: Option<String>,
    /// `Last-Modified` value if present.
    pub last_modified: Option<String>,
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows redirects; only the final response's headers are parsed.
/// Blocks the current thread.
pub fn probe(url: &str, http: &HttpOptions) -> Result<HeadResult> {
    let transport_err = |source: curl::Error| DownloadError::Unreachable {
        url: url.to_string(),
        section: None,
        source,
    };

    let mut headers: Vec<String> = Vec::new();
    let mut easy = curl::easy::Easy::new();
    http.apply(&mut easy, url).map_err(transport_err)?;
    easy.nobody(true).map_err(transport_err)?; // HEAD request

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line starts the next response in a redirect chain.
                    if line.starts_with("HTTP/") {
                        headers.clear();
                    }
                    headers.push(line.to_string());
                }
                true
            })
            .map_err(transport_err)?;
        transfer.perform().map_err(transport_err)?;
    }

    let code = easy.response_code().map_err(transport_err)?;
    if !(200..300).contains(&code) {
        return Err(DownloadError::UnsupportedStatus {
            url: url.to_string(),
            status: code,
            section: None,
        });
    }

    Ok(parse::parse_headers(&headers))
}

/// Probes `url` and returns the resource size from `Content-Length`.
pub fn probe_size(url: &str, http: &HttpOptions) -> Result<u64> {
    let head = probe(url, http)?;
    if !head.accept_ranges {
        tracing::warn!(url, "server did not advertise Accept-Ranges: bytes");
    }
    tracing::debug!(etag = ?head.etag, last_modified = ?head.last_modified, "HEAD metadata");
    head.content_length.ok_or_else(|| DownloadError::MissingSize {
        url: url.to_string(),
    })
}

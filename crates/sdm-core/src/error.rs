//! Typed failures for every stage of a download.
//!
//! Each variant carries enough context (URL, section index, file path) to tell
//! which stage and which section failed. Application glue (config, logging,
//! CLI) wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, DownloadError>;

/// Error returned by the probe, section fetchers, coordinator and merger.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Transport failure: DNS, connect, TLS, timeout.
    #[error("{url} unreachable{}: {source}", section_suffix(.section))]
    Unreachable {
        url: String,
        section: Option<usize>,
        #[source]
        source: curl::Error,
    },

    /// Server answered with a status outside 200..=299.
    #[error("{url} returned HTTP {status}{}", section_suffix(.section))]
    UnsupportedStatus {
        url: String,
        status: u32,
        section: Option<usize>,
    },

    /// HEAD response had no usable `Content-Length`.
    #[error("{url}: missing or invalid Content-Length")]
    MissingSize { url: String },

    /// Response body could not be read in full, or did not match the requested range.
    #[error("section {section}: transfer failed: {reason}")]
    Transfer { section: usize, reason: String },

    /// Local file open/read/write failure.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Job parameters rejected before any network activity.
    #[error("invalid job: {0}")]
    InvalidJob(String),

    /// Section stopped because another section already failed.
    #[error("section {section}: aborted after another section failed")]
    Aborted { section: usize },
}

fn section_suffix(section: &Option<usize>) -> String {
    section
        .map(|i| format!(" (section {})", i))
        .unwrap_or_default()
}

impl DownloadError {
    /// Section index this error belongs to, if it came from a section fetch.
    pub fn section(&self) -> Option<usize> {
        match self {
            DownloadError::Unreachable { section, .. }
            | DownloadError::UnsupportedStatus { section, .. } => *section,
            DownloadError::Transfer { section, .. } | DownloadError::Aborted { section } => {
                Some(*section)
            }
            DownloadError::MissingSize { .. }
            | DownloadError::Io { .. }
            | DownloadError::InvalidJob(_) => None,
        }
    }

    /// True for the cancellation marker reported by sibling sections.
    pub fn is_aborted(&self) -> bool {
        matches!(self, DownloadError::Aborted { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DownloadError::Io {
            path: path.into(),
            source,
        }
    }
}

//! Download job: source URL, target path and section count.
//!
//! A job is validated once at construction and stays immutable for the
//! whole run.

mod filename;

pub use filename::{default_target_filename, sanitize_filename_for_linux};

use std::path::{Path, PathBuf};

use crate::error::{DownloadError, Result};
use crate::segmenter::MAX_SECTIONS;

/// One download: fetch `url` in `sections` parallel ranges into `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    url: String,
    target: PathBuf,
    sections: usize,
}

impl Job {
    /// Validates and builds a job. Only `http` and `https` URLs are accepted.
    pub fn new(url: &str, target: impl Into<PathBuf>, sections: usize) -> Result<Self> {
        let parsed = url::Url::parse(url)
            .map_err(|e| DownloadError::InvalidJob(format!("bad URL {:?}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DownloadError::InvalidJob(format!(
                "unsupported URL scheme {:?}",
                parsed.scheme()
            )));
        }
        if sections == 0 {
            return Err(DownloadError::InvalidJob("section count must be > 0".into()));
        }
        if sections > MAX_SECTIONS {
            return Err(DownloadError::InvalidJob(format!(
                "section count {} exceeds the maximum of {}",
                sections, MAX_SECTIONS
            )));
        }
        let target = target.into();
        if target.as_os_str().is_empty() {
            return Err(DownloadError::InvalidJob("target path is empty".into()));
        }
        Ok(Self {
            url: url.to_string(),
            target,
            sections,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn sections(&self) -> usize {
        self.sections
    }
}

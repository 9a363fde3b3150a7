//! Sequential writer for one section artifact.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{DownloadError, Result};

/// Buffered writer for a single section artifact. Owned by exactly one
/// section fetcher; bytes arrive in order, so no offsets are needed.
pub struct SectionWriter {
    out: BufWriter<File>,
    path: PathBuf,
    written: u64,
}

impl SectionWriter {
    /// Create (or truncate) the artifact at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| DownloadError::io(path, e))?;
        Ok(Self {
            out: BufWriter::new(file),
            path: path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.out.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered bytes and close the artifact. Returns the byte count.
    pub fn finish(self) -> Result<u64> {
        let written = self.written;
        let path = self.path;
        let file = self
            .out
            .into_inner()
            .map_err(|e| DownloadError::io(&path, e.into_error()))?;
        file.sync_all().map_err(|e| DownloadError::io(&path, e))?;
        Ok(written)
    }
}

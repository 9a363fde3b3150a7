//! Section artifacts and final-file assembly.
//!
//! Each section is buffered in its own file, `section-<index>.tmp`, inside a
//! per-target work directory (`<target>.sections/`). The merger appends the
//! artifacts in index order to the target and then removes them.

mod merge;
mod writer;

pub use merge::merge;
pub use writer::SectionWriter;

use std::path::{Path, PathBuf};

use crate::error::{DownloadError, Result};

/// Suffix of the per-target work directory.
pub const WORK_DIR_SUFFIX: &str = ".sections";

/// Locates section artifacts by index. Cheap to clone and share between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Store for `target`: `<target>.sections/`, or `<work_dir>/<target name>.sections/`.
    pub fn for_target(target: &Path, work_dir: Option<&Path>) -> Self {
        let mut name = target
            .file_name()
            .map(|n| n.to_owned())
            .unwrap_or_else(|| "download".into());
        name.push(WORK_DIR_SUFFIX);
        let parent = match work_dir {
            Some(dir) => dir.to_path_buf(),
            None => target.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        Self {
            dir: parent.join(name),
        }
    }

    /// Store rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic artifact path for section `index`.
    pub fn artifact_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("section-{}.tmp", index))
    }

    /// Create the work directory (and parents) if missing.
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| DownloadError::io(&self.dir, e))
    }

    /// Remove artifacts `0..sections` and the work directory if it ends up empty.
    /// Failures are logged, never returned.
    pub fn cleanup(&self, sections: usize) {
        for index in 0..sections {
            let path = self.artifact_path(index);
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("could not remove {}: {}", path.display(), e);
                }
            }
        }
        if let Err(e) = std::fs::remove_dir(&self.dir) {
            tracing::debug!("kept work dir {}: {}", self.dir.display(), e);
        }
    }
}

//! Append section artifacts, in index order, into the final output file.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use super::ArtifactStore;
use crate::error::{DownloadError, Result};

const COPY_BUF_BYTES: usize = 64 * 1024;

/// Truncate `target`, then append the artifacts of sections `0..sections` in
/// order. Returns the total number of bytes merged.
///
/// Artifacts are streamed one at a time, so memory use does not grow with
/// section size.
pub fn merge(target: &Path, store: &ArtifactStore, sections: usize) -> Result<u64> {
    let mut out = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(target)
        .map_err(|e| DownloadError::io(target, e))?;

    let mut total = 0u64;
    for index in 0..sections {
        let path = store.artifact_path(index);
        let n = append_artifact(&path, &mut out, target)?;
        tracing::info!("{} bytes merged from section {}", n, index);
        total += n;
    }

    out.flush().map_err(|e| DownloadError::io(target, e))?;
    out.sync_all().map_err(|e| DownloadError::io(target, e))?;
    Ok(total)
}

/// Stream one artifact onto the end of `out`, attributing read and write
/// failures to the right file.
fn append_artifact(path: &Path, out: &mut File, target: &Path) -> Result<u64> {
    let mut artifact = File::open(path).map_err(|e| DownloadError::io(path, e))?;
    let mut buf = vec![0u8; COPY_BUF_BYTES];
    let mut appended = 0u64;
    loop {
        let n = match artifact.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DownloadError::io(path, e)),
        };
        out.write_all(&buf[..n])
            .map_err(|e| DownloadError::io(target, e))?;
        appended += n as u64;
    }
    Ok(appended)
}

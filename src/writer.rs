//! Byte-diffing artifact writer.
//!
//! Generated files feed downstream incremental builds, so a file is rewritten
//! only when its rendered bytes differ from what is on disk. The store is a
//! trait so the materialize pass can be observed in tests without touching a
//! real filesystem.

use crate::error::ArtifactWriteError;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Capability surface the materialize pass needs: read what exists, write
/// what changed.
pub trait ArtifactStore {
    /// Returns the current bytes at `path`, or `None` if nothing exists
    /// there yet.
    fn read_existing(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Filesystem-backed store. Writes go through a sibling temp file and an
/// atomic rename so a crashed run never leaves a half-written artifact.
#[derive(Debug, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactStore for FsStore {
    fn read_existing(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }

        let mut temp = NamedTempFile::new_in(parent.unwrap_or_else(|| Path::new(".")))?;
        temp.write_all(bytes)?;
        temp.flush()?;
        temp.persist(path).map_err(|err| err.error)?;
        Ok(())
    }
}

/// Outcome of a single artifact write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Content differed (or the file was absent) and was written, or would
    /// have been on a dry run.
    Written,
    /// On-disk bytes already match; the file was left untouched.
    Unchanged,
}

/// Write `bytes` to `path` only if the current content differs. On a dry run
/// the comparison still happens but nothing is written.
pub fn write_if_changed(
    store: &mut dyn ArtifactStore,
    path: &Path,
    bytes: &[u8],
    dry_run: bool,
) -> Result<WriteOutcome, ArtifactWriteError> {
    let existing = store
        .read_existing(path)
        .map_err(|source| ArtifactWriteError {
            path: path.to_path_buf(),
            source,
        })?;

    if existing.as_deref() == Some(bytes) {
        debug!(path = %path.display(), "artifact unchanged, skipping write");
        return Ok(WriteOutcome::Unchanged);
    }

    if dry_run {
        info!(path = %path.display(), "dry run: artifact would be written");
        return Ok(WriteOutcome::Written);
    }

    store.write(path, bytes).map_err(|source| ArtifactWriteError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        bytes = bytes.len(),
        "artifact written"
    );
    Ok(WriteOutcome::Written)
}

/// SHA-256 of rendered content, for structured logging.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Summary of one materialize pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Destination paths that were written (or would be, on a dry run).
    pub written: Vec<PathBuf>,
    /// Destination paths whose content was already up to date.
    pub unchanged: Vec<PathBuf>,
    /// Keys that had contributions but never received an owning declaration.
    pub orphaned: Vec<String>,
}

impl MaterializeReport {
    pub fn artifact_count(&self) -> usize {
        self.written.len() + self.unchanged.len()
    }
}

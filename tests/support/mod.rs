//! Shared test support: an in-memory artifact store that records every write
//! so tests can observe the byte-diff policy.

use genweave::ArtifactStore;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct RecordingStore {
    /// Current "on-disk" content.
    pub files: HashMap<PathBuf, Vec<u8>>,
    /// Every write call, in order.
    pub writes: Vec<PathBuf>,
    /// Paths whose writes fail with a permission error.
    pub fail_paths: Vec<PathBuf>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, path: &Path) -> String {
        let bytes = self
            .files
            .get(path)
            .unwrap_or_else(|| panic!("no artifact written at {}", path.display()));
        String::from_utf8(bytes.clone()).expect("artifact is valid UTF-8")
    }
}

impl ArtifactStore for RecordingStore {
    fn read_existing(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        Ok(self.files.get(path).cloned())
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if self.fail_paths.iter().any(|p| p == path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "write rejected by test store",
            ));
        }
        self.writes.push(path.to_path_buf());
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

/// In-memory filesystem holding files and their modification times.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, SystemTime>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or touch) a file modified `secs` seconds after the epoch.
    pub fn add_file(&self, path: impl AsRef<Path>, secs: u64) {
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        let mut files = self.files.lock().unwrap();
        files.insert(path.as_ref().to_path_buf(), mtime);
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let mut files = self.files.lock().unwrap();
        files.remove(path.as_ref());
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.exists(path)
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let files = self.files.lock().unwrap();
        files
            .get(path)
            .copied()
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }
}

// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};

pub mod mock;

/// The filesystem queries needed to decide whether a job is up to date.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn modified(&self, path: &Path) -> Result<SystemTime>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .with_context(|| format!("reading modification time of {:?}", path))
    }
}

// Path: crates/store/src/local.rs
//! Local-directory store backend.
//!
//! Mirrors the bucket layout onto a directory tree, one directory per
//! conceptual prefix. Used by `--demo` runs and by tests; daemons and
//! operators sharing one directory behave exactly like a shared bucket
//! with slower hardware.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dexter_api::{ObjectStore, StoreError};

use crate::layout::{INVESTIGATIONS_PREFIX, INVESTIGATORS_PREFIX, REPORTS_PREFIX};

/// A directory-backed [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    /// Open a store rooted at `root`, creating the directory structure for
    /// the three prefixes if it does not exist yet.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for prefix in [INVESTIGATIONS_PREFIX, REPORTS_PREFIX, INVESTIGATORS_PREFIX] {
            tokio::fs::create_dir_all(root.join(prefix))
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        Ok(Self { root })
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn map_io(key: &str, err: std::io::Error) -> StoreError {
        if err.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(key.to_string())
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

#[async_trait]
impl ObjectStore for LocalDirStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.object_path(prefix);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Backend(e.to_string())),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            let name = entry.file_name();
            if let Some(name) = name.to_str() {
                keys.push(format!("{prefix}{name}"));
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        tokio::fs::read(self.object_path(key))
            .await
            .map_err(|e| Self::map_io(key, e))
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.object_path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        tokio::fs::remove_file(self.object_path(key))
            .await
            .map_err(|e| Self::map_io(key, e))
    }
}

impl LocalDirStore {
    /// The directory this store is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

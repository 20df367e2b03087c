// Path: crates/api/src/store.rs
//! API for the flat namespaced blob store shared by the fleet.
//!
//! Three conceptual prefixes live under one namespace: `investigations/`,
//! `reports/`, and `investigators/`. The store is multi-writer with
//! last-writer-wins on identical keys; nothing here coordinates writers.

use async_trait::async_trait;
use thiserror::Error;

/// Represents errors that can occur against the blob store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested key does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A generic error originating from the backend (network, disk, auth).
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// True when the error is a missing key rather than a backend fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// The blob store contract. Keys are flat strings; "directories" are only
/// shared prefixes ending in `/`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// All keys under `prefix`, in backend order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Fetch the blob at `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Write a blob, overwriting any existing object at `key`.
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), StoreError>;

    /// Remove the blob at `key`.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Relocate a blob: get, put under the new key, delete the old one.
    /// Used by archive operations that prepend `_` to a basename.
    async fn move_object(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let data = self.get(from).await?;
        self.put(to, &data).await?;
        self.delete(from).await
    }
}

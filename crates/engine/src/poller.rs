// Path: crates/engine/src/poller.rs
//! The store polling loop.
//!
//! The observed set is keyed by *filename*, not investigation id: every
//! uploader writes a new filename, so each approver upload re-surfaces the
//! investigation for processing. Validation is safe to repeat and report
//! paths overwrite, so replays converge instead of duplicating.
//!
//! Seeding happens once, before the first fetch, so blobs already on the
//! store at daemon startup are never replayed.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dexter_api::{ObjectStore, StoreError};
use dexter_store::layout;
use dexter_types::Investigation;

/// Backoff after a failed listing before the next attempt.
pub const LIST_RETRY_BACKOFF: Duration = Duration::from_secs(10);

/// Streams newly observed investigation blobs from the store.
pub struct Poller {
    store: Arc<dyn ObjectStore>,
    seen_files: HashSet<String>,
}

impl Poller {
    /// A poller over `store` with an empty observed set.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            seen_files: HashSet::new(),
        }
    }

    /// Mark everything currently present as observed, without fetching.
    /// Must complete before the first [`poll_once`]; historical
    /// investigations do not re-execute at startup.
    ///
    /// [`poll_once`]: Poller::poll_once
    pub async fn seed(&mut self) -> Result<(), StoreError> {
        for key in self.store.list(layout::INVESTIGATIONS_PREFIX).await? {
            self.seen_files.insert(key);
        }
        Ok(())
    }

    /// Record a filename as observed. Returns true when it was new.
    pub fn observe(&mut self, filename: &str) -> bool {
        self.seen_files.insert(filename.to_string())
    }

    /// One listing pass: fetch and decode every blob not seen before.
    /// A failed fetch un-marks the filename so the next tick retries it; a
    /// blob that fetches but does not parse stays marked, since refetching
    /// corrupt bytes would never converge.
    pub async fn poll_once(&mut self) -> Result<Vec<Investigation>, StoreError> {
        let keys = self.store.list(layout::INVESTIGATIONS_PREFIX).await?;

        let mut fresh = Vec::new();
        for key in keys {
            if !self.observe(&key) {
                continue;
            }
            let data = match self.store.get(&key).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "error getting investigation object from store");
                    self.seen_files.remove(&key);
                    continue;
                }
            };
            match serde_json::from_slice::<Investigation>(&data) {
                Ok(investigation) => fresh.push(investigation),
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "downloaded json-invalid investigation");
                }
            }
        }
        Ok(fresh)
    }
}

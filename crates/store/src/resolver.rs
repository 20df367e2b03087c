// Path: crates/store/src/resolver.rs
//! Short-id resolution.
//!
//! Operators pass partial ids on the command line. Given a prefix, the
//! resolver collects every id present under `investigations/` and
//! `reports/` and returns the full id only when exactly one matches.

use dexter_api::{ObjectStore, StoreError};
use thiserror::Error;

use crate::layout;

/// Why a partial id failed to resolve.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No stored id has the given prefix.
    #[error("no possible ID matches")]
    NoMatch,
    /// More than one stored id has the given prefix.
    #[error("too many possible ID matches")]
    TooManyMatches,
    /// The store could not be listed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolve a partial id against everything currently on the store.
pub async fn resolve_short_id(
    store: &dyn ObjectStore,
    partial: &str,
) -> Result<String, ResolveError> {
    let mut ids: Vec<String> = Vec::new();

    for key in store.list(layout::INVESTIGATIONS_PREFIX).await? {
        if let Some((id, _)) = layout::parse_investigation_key(&key) {
            if !ids.iter().any(|known| known == id) {
                ids.push(id.to_string());
            }
        }
    }
    for key in store.list(layout::REPORTS_PREFIX).await? {
        if let Some(locator) = layout::ReportLocator::parse(&key) {
            if !ids.iter().any(|known| known == &locator.id) {
                ids.push(locator.id);
            }
        }
    }

    let mut matches = ids.into_iter().filter(|id| id.starts_with(partial));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (Some(_), Some(_)) => Err(ResolveError::TooManyMatches),
        (None, _) => Err(ResolveError::NoMatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalDirStore;

    async fn seeded() -> (tempfile::TempDir, LocalDirStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDirStore::open(dir.path()).await.unwrap();
        store
            .put("investigations/a1b2c3d4.alice", b"{}")
            .await
            .unwrap();
        store
            .put("investigations/a1ffffff.alice", b"{}")
            .await
            .unwrap();
        store
            .put("reports/beef0000-h1.alice.zip.enc", b"x")
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn unique_prefix_resolves() {
        let (_dir, store) = seeded().await;
        assert_eq!(
            resolve_short_id(&store, "a1b").await.unwrap(),
            "a1b2c3d4".to_string()
        );
    }

    #[tokio::test]
    async fn report_only_ids_resolve() {
        let (_dir, store) = seeded().await;
        assert_eq!(
            resolve_short_id(&store, "beef").await.unwrap(),
            "beef0000".to_string()
        );
    }

    #[tokio::test]
    async fn ambiguous_prefix_rejected() {
        let (_dir, store) = seeded().await;
        assert!(matches!(
            resolve_short_id(&store, "a1").await,
            Err(ResolveError::TooManyMatches)
        ));
    }

    #[tokio::test]
    async fn unknown_prefix_rejected() {
        let (_dir, store) = seeded().await;
        assert!(matches!(
            resolve_short_id(&store, "ffff").await,
            Err(ResolveError::NoMatch)
        ));
    }

    #[tokio::test]
    async fn full_id_resolves_to_itself() {
        let (_dir, store) = seeded().await;
        assert_eq!(
            resolve_short_id(&store, "a1b2c3d4").await.unwrap(),
            "a1b2c3d4".to_string()
        );
    }
}

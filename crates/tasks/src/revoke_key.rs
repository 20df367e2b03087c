// Path: crates/tasks/src/revoke_key.rs
//! Emergency investigator key revocation.
//!
//! Overwrites the named investigators' public records with empty blobs so
//! no daemon can encrypt another report to them. Not permanent on its own:
//! the record returns if the investigator is ever re-published, but every
//! daemon in the fleet stops honoring the key as soon as its registry
//! re-reads the record.

use async_trait::async_trait;

use dexter_store::layout;

use crate::{ArtifactWriter, Task, TaskAction, TaskContext};

struct RevokeInvestigatorKey;

#[async_trait]
impl TaskAction for RevokeInvestigatorKey {
    async fn run(&self, ctx: &TaskContext<'_>, args: &[String], writer: &mut ArtifactWriter) {
        if args.is_empty() {
            let errstr = "no user specified to revoke";
            tracing::error!("{errstr}");
            writer.error(errstr);
            return;
        }
        for user in args {
            match ctx.store.put(&layout::investigator_key(user), &[]).await {
                Ok(()) => {
                    tracing::info!(investigator = %user, "destroyed investigator key");
                }
                Err(e) => {
                    tracing::error!(investigator = %user, error = %e, "error destroying investigator key");
                    writer.error(&format!("error destroying investigator key for {user}: {e}"));
                }
            }
        }
    }
}

/// Invalidate investigator keys on the whole fleet.
pub fn task() -> Task {
    Task {
        name: "revoke-key",
        description: "invalidate investigator key on all instances of dexter",
        minimum_arguments: 1,
        consensus_requirement: 2,
        supported_platforms: &[],
        action: Box::new(RevokeInvestigatorKey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexter_api::ObjectStore;
    use dexter_host::HostEnv;
    use dexter_store::LocalDirStore;

    #[tokio::test]
    async fn overwrites_record_with_empty_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDirStore::open(dir.path()).await.unwrap();
        store
            .put("investigators/mallory.json", b"{\"Name\":\"mallory\"}")
            .await
            .unwrap();

        let host = HostEnv::stub();
        let ctx = TaskContext {
            host: &host,
            store: &store,
        };
        let report = tempfile::tempdir().unwrap();
        task()
            .run(&ctx, report.path(), &["mallory".to_string()])
            .await;

        assert_eq!(
            store.get("investigators/mallory.json").await.unwrap(),
            Vec::<u8>::new()
        );
    }

    #[tokio::test]
    async fn no_arguments_records_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDirStore::open(dir.path()).await.unwrap();
        let host = HostEnv::stub();
        let ctx = TaskContext {
            host: &host,
            store: &store,
        };
        let report = tempfile::tempdir().unwrap();
        task().run(&ctx, report.path(), &[]).await;

        let errors =
            std::fs::read_to_string(report.path().join("revoke-key/errors.txt")).unwrap();
        assert!(errors.contains("no user specified"));
    }
}

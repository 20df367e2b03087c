// Path: crates/tasks/src/lib.rs
//! # Dexter Tasks Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]

//! # Dexter Tasks
//!
//! Tasks are the named actions an investigation runs on a host. Each task
//! writes its artifacts through an [`ArtifactWriter`] rooted in the task's
//! own subdirectory of the report; errors accumulate alongside and are
//! flushed to `errors.txt` so recipients see exactly what failed. A failing
//! task never aborts the investigation.

/// Per-container filesystem diff collection.
pub mod docker_diff;
/// File retrieval.
pub mod get_file;
/// osquery table collection.
pub mod osquery;
/// Emergency investigator key revocation.
pub mod revoke_key;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use dexter_api::ObjectStore;
use dexter_host::HostEnv;

/// What a task action gets to work with, besides its arguments.
pub struct TaskContext<'a> {
    /// The host the task is collecting from.
    pub host: &'a HostEnv,
    /// The shared object store, for tasks that act on the fleet itself.
    pub store: &'a dyn ObjectStore,
}

/// Helper for creating files in the correct path for a report.
pub struct ArtifactWriter {
    root: PathBuf,
    errors: Vec<String>,
}

impl ArtifactWriter {
    /// A writer rooted at the task's report subdirectory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            errors: Vec::new(),
        }
    }

    /// Write one piece of evidence under the task directory, creating
    /// intermediate directories. Leading `/` on `relative_path` is
    /// stripped so absolute source paths nest instead of escaping.
    /// Failures are logged and recorded; the task keeps running.
    pub async fn write(&mut self, relative_path: &str, data: &[u8]) {
        let destination = self.root.join(relative_path.trim_start_matches('/'));
        if let Some(dir) = destination.parent() {
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                tracing::error!(path = %dir.display(), error = %e, "unable to create directory for evidence");
                self.error(&format!(
                    "unable to create directory {}: {e}",
                    dir.display()
                ));
                return;
            }
        }
        if let Err(e) = tokio::fs::write(&destination, data).await {
            tracing::error!(file = %destination.display(), error = %e, "unable to write piece of evidence for report");
            self.error(&format!(
                "unable to write evidence {}: {e}",
                destination.display()
            ));
        }
    }

    /// Record an error into the task's report.
    pub fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    /// Flush accumulated errors to `errors.txt` in the task directory.
    pub async fn flush_errors(&mut self) {
        if self.errors.is_empty() {
            return;
        }
        let mut data = String::new();
        for error in &self.errors {
            data.push_str(error);
            data.push('\n');
        }
        data.push('\n');

        if let Err(e) = tokio::fs::create_dir_all(&self.root).await {
            tracing::error!(path = %self.root.display(), error = %e, "unable to create task directory for errors");
            return;
        }
        if let Err(e) = tokio::fs::write(self.root.join("errors.txt"), data).await {
            tracing::error!(error = %e, "unable to write task errors");
        }
    }
}

/// The action behind a task.
#[async_trait]
pub trait TaskAction: Send + Sync {
    /// Run the action. Failures are recorded through the writer; the
    /// action itself never propagates an error.
    async fn run(&self, ctx: &TaskContext<'_>, args: &[String], writer: &mut ArtifactWriter);
}

/// A named action Dexter can run on a host.
pub struct Task {
    /// Registry name, as it appears in an investigation's task list.
    pub name: &'static str,
    /// Human-readable description for the operator catalog.
    pub description: &'static str,
    /// Fewest arguments a selection must provide.
    pub minimum_arguments: usize,
    /// Distinct approvers required before a daemon will run an
    /// investigation containing this task.
    pub consensus_requirement: usize,
    supported_platforms: &'static [&'static str],
    action: Box<dyn TaskAction>,
}

impl Task {
    /// Run the task's action unless the platform is unsupported, then
    /// flush any recorded errors into the task directory.
    pub async fn run(&self, ctx: &TaskContext<'_>, report_dir: &Path, args: &[String]) {
        if !self.supported_platforms.is_empty()
            && !self.supported_platforms.contains(&ctx.host.platform())
        {
            tracing::error!(
                task = self.name,
                platform = ctx.host.platform(),
                "task not supported on platform"
            );
            return;
        }
        let mut writer = ArtifactWriter::new(report_dir.join(self.name));
        self.action.run(ctx, args, &mut writer).await;
        writer.flush_errors().await;
    }
}

/// Compile-time table of every task this build knows, keyed by name.
pub struct TaskRegistry {
    tasks: BTreeMap<&'static str, Task>,
}

impl TaskRegistry {
    /// The built-in task set.
    pub fn builtin() -> Self {
        let mut tasks = BTreeMap::new();
        for task in [
            get_file::task(),
            osquery::task(),
            docker_diff::task(),
            revoke_key::task(),
        ] {
            if tasks.insert(task.name, task).is_some() {
                tracing::warn!("task name already defined, overriding");
            }
        }
        Self { tasks }
    }

    /// Look up a task by name.
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Iterate the catalog in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexter_store::LocalDirStore;

    struct Noop;

    #[async_trait]
    impl TaskAction for Noop {
        async fn run(
            &self,
            _ctx: &TaskContext<'_>,
            _args: &[String],
            writer: &mut ArtifactWriter,
        ) {
            writer.write("out.txt", b"ok").await;
        }
    }

    #[tokio::test]
    async fn artifact_writer_creates_intermediates() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ArtifactWriter::new(dir.path().join("get-file"));
        writer.write("/etc/hostname", b"h1").await;

        let written = std::fs::read(dir.path().join("get-file/etc/hostname")).unwrap();
        assert_eq!(written, b"h1".to_vec());
    }

    #[tokio::test]
    async fn errors_flush_to_errors_txt() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ArtifactWriter::new(dir.path().join("task"));
        writer.error("first failure");
        writer.error("second failure");
        writer.flush_errors().await;

        let contents = std::fs::read_to_string(dir.path().join("task/errors.txt")).unwrap();
        assert_eq!(contents, "first failure\nsecond failure\n\n");
    }

    #[tokio::test]
    async fn no_errors_no_errors_txt() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ArtifactWriter::new(dir.path().join("task"));
        writer.flush_errors().await;
        assert!(!dir.path().join("task/errors.txt").exists());
    }

    #[tokio::test]
    async fn unsupported_platform_produces_no_artifacts() {
        let store_dir = tempfile::tempdir().unwrap();
        let store = LocalDirStore::open(store_dir.path()).await.unwrap();
        let host = HostEnv::stub();
        let ctx = TaskContext {
            host: &host,
            store: &store,
        };

        let task = Task {
            name: "martian-dump",
            description: "",
            minimum_arguments: 0,
            consensus_requirement: 1,
            supported_platforms: &["mars-os"],
            action: Box::new(Noop),
        };

        let report = tempfile::tempdir().unwrap();
        task.run(&ctx, report.path(), &[]).await;
        assert!(!report.path().join("martian-dump").exists());
    }

    #[test]
    fn builtin_registry_contents() {
        let registry = TaskRegistry::builtin();
        for name in [
            "get-file",
            "osquery-collect",
            "docker-filesystem-diff",
            "revoke-key",
        ] {
            assert!(registry.get(name).is_some(), "missing task {name}");
        }
        assert_eq!(registry.get("revoke-key").unwrap().consensus_requirement, 2);
        assert!(registry.get("no-such-task").is_none());
    }
}

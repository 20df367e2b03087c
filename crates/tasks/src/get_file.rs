// Path: crates/tasks/src/get_file.rs
//! File retrieval task.

use async_trait::async_trait;

use crate::{ArtifactWriter, Task, TaskAction, TaskContext};

struct GetFile;

#[async_trait]
impl TaskAction for GetFile {
    async fn run(&self, _ctx: &TaskContext<'_>, args: &[String], writer: &mut ArtifactWriter) {
        tracing::info!(arguments = ?args, "retrieving files");

        for arg in args {
            match tokio::fs::read(arg).await {
                Ok(bytes) => writer.write(arg, &bytes).await,
                Err(e) => {
                    tracing::error!(file = %arg, error = %e, "error reading file");
                    writer.error(&format!("error reading file: {arg}"));
                }
            }
        }
    }
}

/// Retrieve files from the host by path.
pub fn task() -> Task {
    Task {
        name: "get-file",
        description: "retrieve files from host",
        minimum_arguments: 1,
        consensus_requirement: 1,
        supported_platforms: &[],
        action: Box::new(GetFile),
    }
}

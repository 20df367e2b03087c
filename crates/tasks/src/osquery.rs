// Path: crates/tasks/src/osquery.rs
//! osquery table collection task.
//!
//! Dumps every table the local osquery instance exposes, one
//! `<table>/results.json` per table. Queries go through `osqueryi` pointed
//! at the configured extension socket.

use async_trait::async_trait;

use crate::{ArtifactWriter, Task, TaskAction, TaskContext};

struct CollectOsquery;

async fn run_query(socket: &str, query: &str) -> Result<Vec<serde_json::Value>, String> {
    let output = tokio::process::Command::new("osqueryi")
        .args(["--connect", socket, "--json", query])
        .output()
        .await
        .map_err(|e| format!("error invoking osqueryi: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "query returned non-zero response ({}): {}",
            output.status,
            stderr.trim()
        ));
    }

    serde_json::from_slice(&output.stdout).map_err(|e| format!("unparseable osquery output: {e}"))
}

async fn table_names(socket: &str) -> Result<Vec<String>, String> {
    let rows = run_query(
        socket,
        r#"SELECT name FROM sqlite_temp_master WHERE type="table";"#,
    )
    .await?;

    Ok(rows
        .iter()
        .filter_map(|row| row.get("name").and_then(|name| name.as_str()))
        .map(str::to_string)
        .collect())
}

#[async_trait]
impl TaskAction for CollectOsquery {
    async fn run(&self, ctx: &TaskContext<'_>, _args: &[String], writer: &mut ArtifactWriter) {
        let socket = ctx.host.osquery_socket();

        let tables = match table_names(socket).await {
            Ok(tables) => tables,
            Err(e) => {
                tracing::error!(error = %e, "error listing osquery tables");
                writer.error(&format!("error listing osquery tables: {e}"));
                return;
            }
        };

        for table in tables {
            let query = format!("SELECT * FROM {table};");
            let rows = match run_query(socket, &query).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!(query = %query, error = %e, "error running query against osquery");
                    writer.error(&format!("error running query ({query}): {e}"));
                    continue;
                }
            };
            match serde_json::to_vec_pretty(&rows) {
                Ok(data) => writer.write(&format!("{table}/results.json"), &data).await,
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize osquery result");
                    writer.error(&format!("failed to serialize result for {table}: {e}"));
                }
            }
        }
    }
}

/// Collect all data from all tables in osquery.
pub fn task() -> Task {
    Task {
        name: "osquery-collect",
        description: "collect all data from all tables in osquery",
        minimum_arguments: 0,
        consensus_requirement: 1,
        supported_platforms: &[],
        action: Box::new(CollectOsquery),
    }
}

// Path: crates/engine/src/cleanup.rs
//! Local artifact removal and post-report host actions.
//!
//! Cleanup is final: the report directory and both zip forms leave the
//! disk, then the investigation's kill flags are honored. Host shutdown is
//! last because it does not return.

use dexter_types::Investigation;

use crate::context::Daemon;

async fn remove_report_artifacts(investigation: &Investigation) {
    if let Err(e) = tokio::fs::remove_dir_all(investigation.report_directory()).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::error!(error = %e, "error removing report directory");
        }
    }
    for path in [
        investigation.report_zip(),
        investigation.report_zip_encrypted(),
    ] {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::error!(error = %e, file = %path.display(), "error removing report zip");
            }
        }
    }
}

/// Remove local artifacts and apply the investigation's kill flags.
pub async fn cleanup(daemon: &Daemon, investigation: &Investigation) {
    remove_report_artifacts(investigation).await;

    if investigation.kill_containers {
        match daemon.host_control.kill_non_agent_containers().await {
            Ok(killed) => {
                tracing::info!(count = killed, "killed containers in scope");
            }
            Err(e) => {
                tracing::error!(error = %e, "unable to list containers to kill");
            }
        }
    }

    tracing::info!(investigation = %investigation.id, "investigation complete");

    if investigation.kill_host {
        if let Err(e) = daemon.host_control.shutdown_host().await {
            tracing::error!(error = %e, "unable to shut down host");
        }
    }
}

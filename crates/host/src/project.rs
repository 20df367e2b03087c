// Path: crates/host/src/project.rs
//! Project-name resolution.
//!
//! Fleets that tag hosts with a project or service name configure where the
//! tag lives; project-name scope facts compare against it. An unconfigured
//! source is not an error, it just means those facts never match.

use dexter_types::ProjectNameSource;

use crate::HostError;

/// Resolve the host's project name from its configured source.
pub async fn resolve(source: Option<&ProjectNameSource>) -> Result<String, HostError> {
    match source {
        None => {
            tracing::warn!("no project name configured, project name facts will not work");
            Ok(String::new())
        }
        Some(ProjectNameSource::File(path)) => tokio::fs::read_to_string(path)
            .await
            .map(|contents| contents.trim_end_matches('\n').to_string())
            .map_err(|e| HostError::ProjectName(format!("{}: {e}", path.display()))),
        Some(ProjectNameSource::Envar(var)) => Ok(std::env::var(var).unwrap_or_default()),
    }
}

// Path: crates/api/src/host.rs
//! Host-control side effects.
//!
//! Killing containers and shutting the host down are the two destructive
//! actions an investigation can request after a successful report. They sit
//! behind a trait so the engine's cleanup path can be exercised in tests
//! without touching the machine running them.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from host-control side effects.
#[derive(Debug, Error)]
pub enum HostControlError {
    /// The docker daemon could not be reached or answered with an error.
    #[error("docker error: {0}")]
    Docker(String),
    /// Spawning or waiting on an external command failed.
    #[error("command error: {0}")]
    Command(String),
    /// The operation is not available on this platform.
    #[error("unsupported on this platform")]
    Unsupported,
}

/// Destructive post-report actions, platform-gated behind implementations.
#[async_trait]
pub trait HostControl: Send + Sync {
    /// Kill every running container that is not part of the agent itself.
    /// Returns the number of containers signalled.
    async fn kill_non_agent_containers(&self) -> Result<usize, HostControlError>;

    /// Power the host off. On success this call does not return control to
    /// the investigation pipeline; the process exits.
    async fn shutdown_host(&self) -> Result<(), HostControlError>;
}

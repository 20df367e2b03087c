// Path: crates/host/src/control.rs
//! Unix host-control implementation.
//!
//! `kill_host` on an investigation powers the machine off through
//! `/sbin/shutdown`; `kill_containers` signals everything that is not part
//! of the agent. Terminal echo restoration lives here too: a Ctrl-C at a
//! hidden password prompt leaves the terminal with echo off unless someone
//! runs `stty echo` on the way out.

use async_trait::async_trait;

use dexter_api::{HostControl, HostControlError};

use crate::docker::DockerHandle;

/// Image-name substring identifying the agent's own containers, which are
/// never killed.
pub const AGENT_IMAGE_SENTINEL: &str = "dexter";

/// Host control backed by docker and the platform shutdown command.
pub struct UnixHostControl {
    docker: DockerHandle,
}

impl UnixHostControl {
    /// Build host control over its own docker connection.
    pub fn new() -> Self {
        Self {
            docker: DockerHandle::new(),
        }
    }
}

impl Default for UnixHostControl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostControl for UnixHostControl {
    async fn kill_non_agent_containers(&self) -> Result<usize, HostControlError> {
        self.docker
            .kill_containers_except(AGENT_IMAGE_SENTINEL)
            .await
            .map_err(|e| HostControlError::Docker(e.to_string()))
    }

    #[cfg(unix)]
    async fn shutdown_host(&self) -> Result<(), HostControlError> {
        tracing::info!("dexter shutting down host");
        let status = tokio::process::Command::new("/sbin/shutdown")
            .args(["-h", "now"])
            .status()
            .await
            .map_err(|e| HostControlError::Command(e.to_string()))?;
        if !status.success() {
            return Err(HostControlError::Command(format!(
                "shutdown exited with {status}"
            )));
        }
        std::process::exit(0);
    }

    #[cfg(not(unix))]
    async fn shutdown_host(&self) -> Result<(), HostControlError> {
        Err(HostControlError::Unsupported)
    }
}

/// Re-enable terminal echo after an interrupted hidden prompt.
#[cfg(unix)]
pub fn restore_terminal_echo() {
    let _ = std::process::Command::new("/bin/stty")
        .arg("echo")
        .stdin(std::process::Stdio::inherit())
        .status();
}

/// Re-enable terminal echo after an interrupted hidden prompt.
#[cfg(not(unix))]
pub fn restore_terminal_echo() {}

// Path: crates/host/src/lib.rs
//! # Dexter Host Crate Lints
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

//! # Dexter Host Environment
//!
//! Everything the daemon observes about or does to the machine it runs on:
//! hostname, platform, local users, the project-name hint, docker, osquery,
//! and the destructive host-control actions. All of it hangs off one
//! [`HostEnv`] value threaded through the pipeline; tests build a stubbed
//! `HostEnv` instead of mutating process-global state.

/// Unix host-control implementation (container kill, shutdown, stty).
pub mod control;
/// Lazily connected docker client.
pub mod docker;
/// Project-name resolution for scope facts.
pub mod project;
/// Local user enumeration.
pub mod users;

use std::path::PathBuf;

use thiserror::Error;

use dexter_types::{Config, ProjectNameSource};
use docker::DockerHandle;

/// Platforms considered unix-like, as `std::env::consts::OS` values.
pub const UNIX_LIKE: &[&str] = &[
    "linux", "macos", "freebsd", "netbsd", "openbsd", "dragonfly", "solaris", "illumos",
    "android", "ios",
];

/// Errors observing or acting on the host.
#[derive(Debug, Error)]
pub enum HostError {
    /// The hostname could not be read or was not valid UTF-8.
    #[error("unable to read hostname: {0}")]
    Hostname(String),
    /// Local I/O failed.
    #[error("io error: {0}")]
    Io(String),
    /// The docker daemon could not be reached or answered with an error.
    #[error("docker error: {0}")]
    Docker(String),
    /// The project-name source is configured but unreadable.
    #[error("unable to read project name: {0}")]
    ProjectName(String),
}

/// The daemon's window onto the machine it runs on.
///
/// Every observation has an override slot so tests (and the example
/// plugins' unit tests in particular) can pin host facts without touching
/// the machine running the suite.
pub struct HostEnv {
    osquery_socket: String,
    project_name_source: Option<ProjectNameSource>,
    docker: DockerHandle,
    hostname_override: Option<String>,
    users_override: Option<Vec<String>>,
    docker_images_override: Option<Vec<String>>,
    project_name_override: Option<String>,
    passwd_path: PathBuf,
}

impl HostEnv {
    /// Build the production host environment from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            osquery_socket: config.osquery_socket.clone(),
            project_name_source: config.project_name.clone(),
            docker: DockerHandle::new(),
            hostname_override: None,
            users_override: None,
            docker_images_override: None,
            project_name_override: None,
            passwd_path: PathBuf::from("/etc/passwd"),
        }
    }

    /// A fully inert environment for tests; stub in what the test needs.
    pub fn stub() -> Self {
        Self {
            osquery_socket: String::new(),
            project_name_source: None,
            docker: DockerHandle::new(),
            hostname_override: None,
            users_override: None,
            docker_images_override: None,
            project_name_override: None,
            passwd_path: PathBuf::from("/etc/passwd"),
        }
    }

    /// Pin the hostname.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname_override = Some(hostname.into());
        self
    }

    /// Pin the local user list.
    pub fn with_users(mut self, users: Vec<String>) -> Self {
        self.users_override = Some(users);
        self
    }

    /// Pin the running docker image list.
    pub fn with_docker_images(mut self, images: Vec<String>) -> Self {
        self.docker_images_override = Some(images);
        self
    }

    /// Pin the project name.
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name_override = Some(name.into());
        self
    }

    /// The platform this process runs on (`std::env::consts::OS`).
    pub fn platform(&self) -> &'static str {
        std::env::consts::OS
    }

    /// The host's name, as reports identify it on the store.
    pub fn hostname(&self) -> Result<String, HostError> {
        if let Some(name) = &self.hostname_override {
            return Ok(name.clone());
        }
        hostname::get()
            .map_err(|e| HostError::Hostname(e.to_string()))?
            .into_string()
            .map_err(|raw| HostError::Hostname(format!("non-utf8 hostname: {raw:?}")))
    }

    /// Names of local users.
    pub async fn local_users(&self) -> Result<Vec<String>, HostError> {
        if let Some(users) = &self.users_override {
            return Ok(users.clone());
        }
        users::read_passwd_names(&self.passwd_path).await
    }

    /// The host's project name, for scoping in a production environment.
    /// Unconfigured hosts return an empty string with a logged warning so
    /// project-name facts simply never match.
    pub async fn project_name(&self) -> Result<String, HostError> {
        if let Some(name) = &self.project_name_override {
            return Ok(name.clone());
        }
        project::resolve(self.project_name_source.as_ref()).await
    }

    /// Images of all currently running docker containers.
    pub async fn running_docker_images(&self) -> Result<Vec<String>, HostError> {
        if let Some(images) = &self.docker_images_override {
            return Ok(images.clone());
        }
        self.docker.running_images().await
    }

    /// The docker client handle, for tasks that go deeper than image names.
    pub fn docker(&self) -> &DockerHandle {
        &self.docker
    }

    /// Path of the osquery extension socket.
    pub fn osquery_socket(&self) -> &str {
        &self.osquery_socket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_is_current_os() {
        let env = HostEnv::stub();
        assert_eq!(env.platform(), std::env::consts::OS);
    }

    #[test]
    fn stubbed_hostname_wins() {
        let env = HostEnv::stub().with_hostname("h1");
        assert_eq!(env.hostname().unwrap(), "h1");
    }

    #[tokio::test]
    async fn stubbed_users_win() {
        let env = HostEnv::stub().with_users(vec!["root".to_string(), "foo".to_string()]);
        assert_eq!(
            env.local_users().await.unwrap(),
            vec!["root".to_string(), "foo".to_string()]
        );
    }

    #[tokio::test]
    async fn stubbed_images_win() {
        let env = HostEnv::stub().with_docker_images(vec!["ubuntu".to_string()]);
        assert_eq!(
            env.running_docker_images().await.unwrap(),
            vec!["ubuntu".to_string()]
        );
    }

    #[tokio::test]
    async fn unconfigured_project_name_is_empty() {
        let env = HostEnv::stub();
        assert_eq!(env.project_name().await.unwrap(), "");
    }
}

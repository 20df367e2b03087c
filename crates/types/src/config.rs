// Path: crates/types/src/config.rs
//! Environment-driven configuration.
//!
//! Every tunable is read once at startup into a [`Config`] value that is
//! threaded through the daemon and operator pipelines. Nothing below this
//! layer touches the environment, so tests construct their own `Config`
//! instead of mutating process state.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

const BUCKET_ENVAR: &str = "DEXTER_AWS_S3_BUCKET";
const POLL_INTERVAL_ENVAR: &str = "DEXTER_POLL_INTERVAL_SECONDS";
const OSQUERY_SOCKET_ENVAR: &str = "DEXTER_OSQUERY_SOCKET";
const PROJECT_NAME_ENVAR: &str = "DEXTER_PROJECT_NAME_CONFIG";
const HOME_OVERRIDE_ENVAR: &str = "DEXTER_HOME";

const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;
const DEFAULT_OSQUERY_SOCKET: &str = "/var/osquery/osquery.em";

/// Where the host's project name comes from, for project-name scope facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectNameSource {
    /// Read the named file; its contents are the project name.
    File(PathBuf),
    /// Read the named environment variable at evaluation time.
    Envar(String),
}

impl ProjectNameSource {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        if let Some(path) = value.strip_prefix("file://") {
            return Ok(Self::File(PathBuf::from(path)));
        }
        if let Some(var) = value.strip_prefix("envar://") {
            return Ok(Self::Envar(var.to_string()));
        }
        Err(ConfigError::InvalidValue {
            variable: PROJECT_NAME_ENVAR,
            value: value.to_string(),
        })
    }
}

/// Resolved configuration for one Dexter process.
#[derive(Debug, Clone)]
pub struct Config {
    /// S3 bucket backing the object store, if configured.
    pub bucket: Option<String>,
    /// Local directory backing the object store instead of a bucket.
    /// Set by the `--demo` flag; wins over `bucket` when present.
    pub demo_path: Option<PathBuf>,
    /// How long the daemon sleeps between store listings.
    pub poll_interval: Duration,
    /// Path of the osquery extension socket.
    pub osquery_socket: String,
    /// Project-name source for scoping, if configured.
    pub project_name: Option<ProjectNameSource>,
    /// Directory holding the operator's secrets (`investigator.json`,
    /// `key.pem`).
    pub home: PathBuf,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// Missing optional values fall back with a logged warning; only values
    /// that are present but unparseable are errors here. Whether a store
    /// backend is configured at all is checked when one is constructed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bucket = std::env::var(BUCKET_ENVAR).ok().filter(|v| !v.is_empty());

        let poll_interval = match std::env::var(POLL_INTERVAL_ENVAR) {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(seconds) => Duration::from_secs(seconds),
                Err(_) => {
                    tracing::warn!(
                        envar = POLL_INTERVAL_ENVAR,
                        value = %raw,
                        "unable to parse poll interval, using {} seconds",
                        DEFAULT_POLL_INTERVAL_SECONDS
                    );
                    Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS)
                }
            },
            Err(_) => {
                tracing::warn!(
                    envar = POLL_INTERVAL_ENVAR,
                    "poll interval envar not set, using {} seconds",
                    DEFAULT_POLL_INTERVAL_SECONDS
                );
                Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS)
            }
        };

        let osquery_socket = match std::env::var(OSQUERY_SOCKET_ENVAR) {
            Ok(socket) if !socket.is_empty() => socket,
            _ => {
                tracing::warn!(
                    envar = OSQUERY_SOCKET_ENVAR,
                    default = DEFAULT_OSQUERY_SOCKET,
                    "no osquery socket defined in envar, using default"
                );
                DEFAULT_OSQUERY_SOCKET.to_string()
            }
        };

        let project_name = match std::env::var(PROJECT_NAME_ENVAR) {
            Ok(raw) if !raw.is_empty() => Some(ProjectNameSource::parse(&raw)?),
            _ => {
                tracing::warn!(
                    envar = PROJECT_NAME_ENVAR,
                    "no project name configured, project name facts will not work"
                );
                None
            }
        };

        let home = match std::env::var(HOME_OVERRIDE_ENVAR) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let home = std::env::var("HOME")
                    .map_err(|e| ConfigError::NoHomeDirectory(e.to_string()))?;
                PathBuf::from(home).join(".dexter")
            }
        };

        Ok(Self {
            bucket,
            demo_path: None,
            poll_interval,
            osquery_socket,
            project_name,
            home,
        })
    }

    /// Route the object store to a local directory for demos and tests.
    pub fn with_demo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.demo_path = Some(path.into());
        self
    }

    /// Full path for the file that stores the operator's private key.
    pub fn key_file(&self) -> PathBuf {
        self.home.join("key.pem")
    }

    /// Full path for the file that stores the local investigator record.
    pub fn investigator_file(&self) -> PathBuf {
        self.home.join("investigator.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            bucket: None,
            demo_path: None,
            poll_interval: Duration::from_secs(10),
            osquery_socket: DEFAULT_OSQUERY_SOCKET.to_string(),
            project_name: None,
            home: PathBuf::from("/home/alice/.dexter"),
        }
    }

    #[test]
    fn secret_paths() {
        let config = base();
        assert_eq!(config.key_file(), PathBuf::from("/home/alice/.dexter/key.pem"));
        assert_eq!(
            config.investigator_file(),
            PathBuf::from("/home/alice/.dexter/investigator.json")
        );
    }

    #[test]
    fn project_name_source_parse() {
        assert_eq!(
            ProjectNameSource::parse("file:///etc/project").unwrap(),
            ProjectNameSource::File(PathBuf::from("/etc/project"))
        );
        assert_eq!(
            ProjectNameSource::parse("envar://PROJECT").unwrap(),
            ProjectNameSource::Envar("PROJECT".to_string())
        );
        assert!(ProjectNameSource::parse("http://nope").is_err());
    }

    #[test]
    fn demo_path_override() {
        let config = base().with_demo_path("/tmp/dexter-demo");
        assert_eq!(config.demo_path, Some(PathBuf::from("/tmp/dexter-demo")));
    }
}

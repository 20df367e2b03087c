// Path: crates/facts/src/project.rs
//! Project-name facts.

use async_trait::async_trait;

use dexter_host::HostEnv;

use crate::{Fact, FactCheck, FactError};

struct ProjectNameIs;
struct ProjectNameContains;

#[async_trait]
impl FactCheck for ProjectNameIs {
    async fn evaluate(&self, host: &HostEnv, args: &[String]) -> Result<bool, FactError> {
        let project = host.project_name().await?;
        Ok(args.iter().any(|arg| &project == arg))
    }
}

#[async_trait]
impl FactCheck for ProjectNameContains {
    async fn evaluate(&self, host: &HostEnv, args: &[String]) -> Result<bool, FactError> {
        let project = host.project_name().await?;
        Ok(args.iter().any(|arg| project.contains(arg.as_str())))
    }
}

/// Check if the host's project name configuration is an exact match to an
/// argument.
pub fn project_name_is() -> Fact {
    Fact {
        name: "project-name-is",
        description:
            "check if the host's project name configuration is an exact match to the argument",
        private: false,
        minimum_arguments: 1,
        supported_platforms: &[],
        default_state: false,
        check: Box::new(ProjectNameIs),
    }
}

/// Check if the host's project name configuration contains an argument as a
/// substring.
pub fn project_name_contains() -> Fact {
    Fact {
        name: "project-name-contains",
        description:
            "check if the host's project name configuration contains the argument as a substring",
        private: false,
        minimum_arguments: 1,
        supported_platforms: &[],
        default_state: false,
        check: Box::new(ProjectNameContains),
    }
}

// Path: crates/facts/src/platform.rs
//! Platform facts.

use async_trait::async_trait;

use dexter_host::HostEnv;

use crate::{Fact, FactCheck, FactError};

struct PlatformIs;

#[async_trait]
impl FactCheck for PlatformIs {
    async fn evaluate(&self, host: &HostEnv, args: &[String]) -> Result<bool, FactError> {
        Ok(args.iter().any(|arg| host.platform() == arg))
    }
}

/// Check if the host's operating system matches an argument.
pub fn platform_is() -> Fact {
    Fact {
        name: "platform-is",
        description: "check if a host's operating system matches a string",
        private: false,
        minimum_arguments: 1,
        supported_platforms: &[],
        default_state: false,
        check: Box::new(PlatformIs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn platform_is_fact() {
        let host = HostEnv::stub();
        let fact = platform_is();

        let current = std::env::consts::OS.to_string();
        assert!(fact.assert(&host, &[current], "salt0000").await);
        assert!(!fact.assert(&host, &["temple-os".to_string()], "salt0000").await);
    }
}

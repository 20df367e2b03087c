// Path: crates/facts/src/hostname.rs
//! Hostname facts.

use async_trait::async_trait;

use dexter_host::HostEnv;

use crate::{Fact, FactCheck, FactError};

struct HostnameIs;
struct HostnameContains;

#[async_trait]
impl FactCheck for HostnameIs {
    async fn evaluate(&self, host: &HostEnv, args: &[String]) -> Result<bool, FactError> {
        let hostname = host.hostname()?;
        Ok(args.iter().any(|arg| &hostname == arg))
    }
}

#[async_trait]
impl FactCheck for HostnameContains {
    async fn evaluate(&self, host: &HostEnv, args: &[String]) -> Result<bool, FactError> {
        let hostname = host.hostname()?;
        Ok(args.iter().any(|arg| hostname.contains(arg.as_str())))
    }
}

/// Check if the host's hostname is an exact match to an argument.
pub fn hostname_is() -> Fact {
    Fact {
        name: "hostname-is",
        description: "check if the host's hostname is an exact match to the argument",
        private: false,
        minimum_arguments: 1,
        supported_platforms: &[],
        default_state: false,
        check: Box::new(HostnameIs),
    }
}

/// Check if the host's hostname contains an argument as a substring.
pub fn hostname_contains() -> Fact {
    Fact {
        name: "hostname-contains",
        description: "check if the host's hostname contains the argument as a substring",
        private: false,
        minimum_arguments: 1,
        supported_platforms: &[],
        default_state: false,
        check: Box::new(HostnameContains),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hostname_is_fact() {
        let host = HostEnv::stub().with_hostname("web-17");
        let fact = hostname_is();

        assert!(!fact.assert(&host, &["".to_string()], "salt0000").await);
        assert!(fact.assert(&host, &["web-17".to_string()], "salt0000").await);
        assert!(
            !fact
                .assert(&host, &["web-17foobar".to_string()], "salt0000")
                .await
        );
    }

    #[tokio::test]
    async fn hostname_contains_fact() {
        let host = HostEnv::stub().with_hostname("web-17");
        let fact = hostname_contains();

        assert!(fact.assert(&host, &["".to_string()], "salt0000").await);
        assert!(fact.assert(&host, &["web".to_string()], "salt0000").await);
        assert!(
            !fact
                .assert(&host, &["web-17foobar".to_string()], "salt0000")
                .await
        );
    }
}

// Path: crates/facts/src/lib.rs
//! # Dexter Facts Crate Lints
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

//! # Dexter Facts
//!
//! Facts are named predicates Dexter uses to check whether a host is in
//! scope for an investigation. An investigation's scope holds only if every
//! listed fact asserts true; any false fact keeps the host out.
//!
//! A *private* fact never sees plaintext arguments: the operator ships the
//! Argon2id digest, the daemon appends the investigation id as salt, and
//! the evaluator re-hashes candidate local values for comparison.

/// Docker image facts.
pub mod docker;
/// Hostname facts.
pub mod hostname;
/// Platform facts.
pub mod platform;
/// Project-name facts.
pub mod project;
/// Local-user facts.
pub mod users;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use dexter_crypto::CryptoError;
use dexter_host::{HostEnv, HostError};

/// Errors inside a fact evaluator. Evaluation never fails outward: an
/// erroring fact falls back to its default state.
#[derive(Debug, Error)]
pub enum FactError {
    /// Observing the host failed.
    #[error(transparent)]
    Host(#[from] HostError),
    /// Hashing a candidate value failed.
    #[error(transparent)]
    Hash(#[from] CryptoError),
}

/// The predicate behind a fact.
#[async_trait]
pub trait FactCheck: Send + Sync {
    /// Evaluate the predicate against this host. For private facts the
    /// arguments arrive salted (`digest || salt`).
    async fn evaluate(&self, host: &HostEnv, args: &[String]) -> Result<bool, FactError>;
}

/// A named predicate Dexter can use to scope an investigation.
pub struct Fact {
    /// Registry name, as it appears in an investigation's scope.
    pub name: &'static str,
    /// Human-readable description for the operator catalog.
    pub description: &'static str,
    /// Whether arguments are Argon2id digests rather than plaintext.
    pub private: bool,
    /// Fewest arguments a selection must provide.
    pub minimum_arguments: usize,
    supported_platforms: &'static [&'static str],
    default_state: bool,
    check: Box<dyn FactCheck>,
}

impl Fact {
    /// Check if this fact indicates this host is in scope.
    ///
    /// Unsupported platforms and evaluator errors both resolve to the
    /// fact's default state, with a logged reason. `salt` is the
    /// investigation id and is appended to each argument of a private fact
    /// before evaluation.
    pub async fn assert(&self, host: &HostEnv, args: &[String], salt: &str) -> bool {
        if !self.supported_platforms.is_empty()
            && !self.supported_platforms.contains(&host.platform())
        {
            tracing::error!(
                fact = self.name,
                platform = host.platform(),
                default_state = self.default_state,
                "fact not supported on platform, returning default state"
            );
            return self.default_state;
        }

        let salted: Vec<String> = if self.private {
            args.iter().map(|arg| format!("{arg}{salt}")).collect()
        } else {
            args.to_vec()
        };

        match self.check.evaluate(host, &salted).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    fact = self.name,
                    platform = host.platform(),
                    default_state = self.default_state,
                    error = %e,
                    "error running fact assert function, returning default state"
                );
                self.default_state
            }
        }
    }
}

/// Compile-time table of every fact this build knows, keyed by name.
pub struct FactRegistry {
    facts: BTreeMap<&'static str, Fact>,
}

impl FactRegistry {
    /// The built-in fact set.
    pub fn builtin() -> Self {
        let mut facts = BTreeMap::new();
        for fact in [
            hostname::hostname_is(),
            hostname::hostname_contains(),
            platform::platform_is(),
            project::project_name_is(),
            project::project_name_contains(),
            users::user_exists(),
            docker::running_docker_image(),
            docker::running_docker_image_substring(),
        ] {
            if facts.insert(fact.name, fact).is_some() {
                tracing::warn!("fact name already defined, overriding");
            }
        }
        Self { facts }
    }

    /// Look up a fact by name.
    pub fn get(&self, name: &str) -> Option<&Fact> {
        self.facts.get(name)
    }

    /// Iterate the catalog in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysErr;

    #[async_trait]
    impl FactCheck for AlwaysErr {
        async fn evaluate(&self, _host: &HostEnv, _args: &[String]) -> Result<bool, FactError> {
            Err(FactError::Host(HostError::Io("boom".to_string())))
        }
    }

    #[tokio::test]
    async fn error_returns_default_state() {
        let fact = Fact {
            name: "always-err",
            description: "",
            private: false,
            minimum_arguments: 0,
            supported_platforms: &[],
            default_state: true,
            check: Box::new(AlwaysErr),
        };
        let host = HostEnv::stub();
        assert!(fact.assert(&host, &[], "a1b2c3d4").await);
    }

    #[tokio::test]
    async fn unsupported_platform_returns_default_state() {
        let fact = Fact {
            name: "martian-only",
            description: "",
            private: false,
            minimum_arguments: 0,
            supported_platforms: &["mars-os"],
            default_state: false,
            check: Box::new(AlwaysErr),
        };
        let host = HostEnv::stub();
        assert!(!fact.assert(&host, &[], "a1b2c3d4").await);
    }

    #[test]
    fn builtin_registry_contents() {
        let registry = FactRegistry::builtin();
        for name in [
            "hostname-is",
            "hostname-contains",
            "platform-is",
            "project-name-is",
            "project-name-contains",
            "user-exists",
            "running-docker-image",
            "running-docker-image-substring",
        ] {
            assert!(registry.get(name).is_some(), "missing fact {name}");
        }
        assert!(registry.get("no-such-fact").is_none());
    }
}

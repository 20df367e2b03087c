// Path: crates/types/src/error.rs
//! Core error types for the Dexter agent.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Reasons an investigation fails validation on a host. Validation failures
/// skip the investigation on this daemon; the blob stays on the store so
/// other daemons (or a later approver upload) may still satisfy it.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The issuer's signature did not verify over the digest.
    #[error("issuer signature invalid")]
    IssuerSignatureInvalid,
    /// No task in the task list resolves to a registered task.
    #[error("unable to load any tasks for investigation")]
    NoKnownTasks,
    /// The scope references a fact this daemon does not know.
    #[error("investigation attempts to check non-existent fact {0}")]
    UnknownFact(String),
    /// A scope fact asserted false; the host is not in scope.
    #[error("host is not in scope, fact {0} does not apply")]
    OutOfScope(String),
    /// Not enough distinct valid approver signatures yet.
    #[error("investigation has not yet reached consensus ({achieved}/{required})")]
    ConsensusNotReached {
        /// Distinct valid approvers present.
        achieved: usize,
        /// Highest consensus requirement among the listed known tasks.
        required: usize,
    },
}

impl ErrorCode for ValidationError {
    fn code(&self) -> &'static str {
        match self {
            Self::IssuerSignatureInvalid => "VALIDATION_ISSUER_SIGNATURE",
            Self::NoKnownTasks => "VALIDATION_NO_KNOWN_TASKS",
            Self::UnknownFact(_) => "VALIDATION_UNKNOWN_FACT",
            Self::OutOfScope(_) => "VALIDATION_OUT_OF_SCOPE",
            Self::ConsensusNotReached { .. } => "VALIDATION_NO_CONSENSUS",
        }
    }
}

/// Fatal initialization problems. These terminate the process with a
/// non-zero exit code; nothing in the pipeline recovers from them.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither a bucket nor a demo directory was configured.
    #[error("object store not configured: set DEXTER_AWS_S3_BUCKET or pass --demo")]
    StoreNotConfigured,
    /// The user's home directory could not be determined.
    #[error("unable to determine home directory: {0}")]
    NoHomeDirectory(String),
    /// A configuration value could not be parsed.
    #[error("invalid value for {variable}: {value}")]
    InvalidValue {
        /// The environment variable at fault.
        variable: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::StoreNotConfigured => "CONFIG_STORE_MISSING",
            Self::NoHomeDirectory(_) => "CONFIG_NO_HOME",
            Self::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
        }
    }
}

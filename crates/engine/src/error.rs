// Path: crates/engine/src/error.rs
//! Local error types for the `dexter-engine` crate.

use thiserror::Error;

use dexter_api::StoreError;
use dexter_crypto::CryptoError;
use dexter_store::ResolveError;
use dexter_types::error::ValidationError;

/// Errors from the investigation lifecycle and operator flows.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The object store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A cryptographic operation failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// An investigation failed validation on this host.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A partial id did not resolve to exactly one investigation.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Local filesystem I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A blob did not parse as the expected JSON document.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Building or opening a report archive failed.
    #[error("zip error: {0}")]
    Zip(String),
    /// No registry record exists for the named investigator.
    #[error("named investigator not found: {0}")]
    UnknownInvestigator(String),
    /// The id resolved but no investigation copy carries it.
    #[error("ID resolved but investigation not found: {0}")]
    UnknownInvestigation(String),
    /// The operator's key file already exists and will not be overwritten.
    #[error("key file already exists: {0}")]
    KeyFileExists(String),
}

// Path: crates/crypto/src/error.rs
//! Local error types for the `dexter-crypto` crate.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
    /// A key could not be parsed or reconstructed from its components.
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// Producing a signature failed.
    #[error("signing failed: {0}")]
    Signing(String),
    /// Wrapping or unwrapping a data-encryption key failed. Unwrap failures
    /// also cover the wrong-recipient case.
    #[error("key wrap failed: {0}")]
    KeyWrap(String),
    /// Authenticated encryption or decryption failed. Decryption failures
    /// also cover tampered ciphertext.
    #[error("bulk cipher failed")]
    BulkCipher,
    /// Argon2id hashing failed.
    #[error("hash failed: {0}")]
    Hash(String),
    /// The encrypted private key could not be opened. Usually a wrong
    /// password; callers re-prompt on this variant.
    #[error("unable to decrypt private key: {0}")]
    KeyDecryption(String),
    /// Serializing or encrypting the private key for storage failed.
    #[error("unable to encode private key: {0}")]
    KeyEncoding(String),
}

// Path: crates/crypto/src/lib.rs
//! # Dexter Crypto Crate Lints
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

//! # Dexter Cryptography
//!
//! The wire-format crypto for the agent: RSA-PSS signatures over the
//! investigation digest, per-recipient hybrid encryption (AES-128-GCM bulk
//! with RSA-OAEP key wrap), Argon2id hashing for privacy-preserving scope
//! facts, and the password-encrypted local private key store.

/// AES-128-GCM bulk encryption for report archives.
pub mod bulk;
/// Crate error type.
pub mod error;
/// Argon2id hashing for private fact arguments.
pub mod hash;
/// Key generation, portable public key records, and the encrypted PEM
/// private key store.
pub mod key_store;
/// RSA-PSS signing and verification over the investigation digest.
pub mod sign;
/// RSA-OAEP wrapping of data-encryption keys.
pub mod wrap;

pub use error::CryptoError;
pub use rsa::{RsaPrivateKey, RsaPublicKey};

// Path: crates/types/src/lib.rs
//! # Dexter Types Crate Lints
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

//! # Dexter Core Types
//!
//! The shared data model for the Dexter forensics agent: investigations and
//! their signatures, investigator records, the canonical signing digest, the
//! wire codec conventions, identifier generation, and environment-driven
//! configuration.

/// Base64 byte fields and canonical map serialization for the signing digest.
pub mod codec;
/// Environment-driven daemon and operator configuration.
pub mod config;
/// Core error taxonomy with stable string codes.
pub mod error;
/// Short investigation identifier generation.
pub mod id;
/// The signed investigation document and its digest.
pub mod investigation;
/// Investigator records and their portable public keys.
pub mod investigator;

pub use config::{Config, ProjectNameSource};
pub use investigation::{DecryptionPayload, Investigation, Signature};
pub use investigator::{Investigator, PublicKeyRecord};

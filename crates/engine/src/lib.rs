// Path: crates/engine/src/lib.rs
//! # Dexter Engine Crate Lints
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

//! # Dexter Engine
//!
//! The investigation lifecycle. The daemon side polls the store, validates
//! each new investigation (issuer signature, known tasks, scope facts,
//! consensus), runs the tasks, packages and encrypts the report once per
//! recipient, and cleans up. The operator side reuses the same pieces to
//! create, approve, list, and retrieve.

/// Local artifact removal and post-report host actions.
pub mod cleanup;
/// The daemon context and its processing loop.
pub mod context;
/// Crate error type.
pub mod error;
/// Validation, consensus arithmetic, and task execution.
pub mod lifecycle;
/// Report packaging: zip, hybrid encryption, upload, retrieval.
pub mod package;
/// The store polling loop and its observed-filename set.
pub mod poller;
/// Reconciliation of per-uploader investigation copies.
pub mod reconcile;
/// Store-backed investigator registry.
pub mod registry;
/// The operator's local key vault.
pub mod vault;

pub use context::Daemon;
pub use error::EngineError;
pub use poller::Poller;
pub use registry::InvestigatorRegistry;
pub use vault::KeyVault;

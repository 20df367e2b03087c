// Path: crates/store/src/lib.rs
//! # Dexter Store Crate Lints
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

//! # Dexter Object Store
//!
//! Backends for the [`dexter_api::ObjectStore`] contract plus the blob-name
//! layout shared by every component: an S3 backend for production fleets
//! and a local-directory backend for demos and tests.

/// Blob key layout: prefixes, report/investigation name build and parse,
/// and the `_` archive marker.
pub mod layout;
/// Local-directory backend.
pub mod local;
/// Short-id resolution across investigations and reports.
pub mod resolver;
/// S3 backend.
pub mod s3;

pub use local::LocalDirStore;
pub use resolver::{resolve_short_id, ResolveError};
pub use s3::S3Store;

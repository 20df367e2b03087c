// Path: crates/api/src/lib.rs
//! # Dexter API Crate Lints
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

//! # Dexter API
//!
//! Stable trait contracts between the Dexter engine and its pluggable
//! collaborators: the object store backing the fleet, and the host-control
//! side effects applied after a successful report.

/// Host-control side effects (container kill, host shutdown).
pub mod host;
/// The flat namespaced blob store shared by daemons and operators.
pub mod store;

pub use host::{HostControl, HostControlError};
pub use store::{ObjectStore, StoreError};

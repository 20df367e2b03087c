// Path: crates/telemetry/src/lib.rs
//! # Dexter Telemetry
//!
//! `tracing` subscriber setup for the two faces of the agent: flattened
//! JSON on stderr for fleet daemons, compact human output for operator
//! commands. Both honor `RUST_LOG`, defaulting to `info`.

pub mod init;

pub use init::{init, LogStyle};

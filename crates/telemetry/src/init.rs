// Path: crates/telemetry/src/init.rs
//! Subscriber construction.
//!
//! One binary, two audiences. Fleet daemons log machine-first: JSON events
//! on stderr with the event fields flattened to the top level, so a log
//! pipeline can index `investigation`, `recipient`, and friends without
//! unwrapping a nested `fields` object. Operator commands log human-first:
//! compact lines with no timestamps or targets, quiet enough to sit next
//! to interactive prompts and table output.

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Which face of the agent is logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    /// A fleet daemon, feeding a log pipeline.
    Daemon,
    /// An interactive operator command.
    Operator,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber for the chosen style. `log` records from
/// dependencies are bridged into `tracing` first so store and docker
/// client output lands in the same stream.
pub fn init(style: LogStyle) -> Result<(), anyhow::Error> {
    tracing_log::LogTracer::init()?;
    match style {
        LogStyle::Daemon => {
            let layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(std::io::stderr);
            let subscriber = Registry::default().with(env_filter()).with(layer);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogStyle::Operator => {
            let layer = fmt::layer()
                .compact()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr);
            let subscriber = Registry::default().with(env_filter()).with(layer);
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

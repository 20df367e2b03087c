// Path: crates/cli/src/main.rs
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

//! # Dexter CLI
//!
//! One binary for both sides of the system: `dexter daemon` on hosts that
//! receive investigations, and the `investigation` / `investigator` /
//! `report` command suites for operators.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use dexter_api::ObjectStore;
use dexter_store::{LocalDirStore, S3Store};
use dexter_types::error::ConfigError;
use dexter_types::Config;

mod commands;
mod util;

use commands::{daemon, investigation, investigator, report};

#[derive(Parser, Debug)]
#[clap(
    name = "dexter",
    version,
    about = "Your friendly forensics expert",
    long_about = "Dexter facilitates the secure execution and reporting of \
forensic tasks on remote hosts. This binary runs the Dexter daemon on fleet \
hosts and provides the operator command line for investigators."
)]
struct Cli {
    /// Run from a local path for demo purposes, not a bucket.
    #[clap(long, global = true, value_name = "PATH")]
    demo: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch the Dexter daemon.
    Daemon,

    /// Manage investigations.
    Investigation {
        #[clap(subcommand)]
        command: investigation::InvestigationCommands,
    },

    /// Manage investigators.
    Investigator {
        #[clap(subcommand)]
        command: investigator::InvestigatorCommands,
    },

    /// Manage reports.
    Report {
        #[clap(subcommand)]
        command: report::ReportCommands,
    },
}

/// Build the object store the rest of the process talks to. The demo path
/// wins over the bucket; neither configured is a fatal startup error.
async fn open_store(config: &Config) -> Result<Arc<dyn ObjectStore>> {
    if let Some(path) = &config.demo_path {
        return Ok(Arc::new(LocalDirStore::open(path.clone()).await?));
    }
    if let Some(bucket) = &config.bucket {
        return Ok(Arc::new(S3Store::connect(bucket.clone()).await));
    }
    Err(ConfigError::StoreNotConfigured.into())
}

/// A Ctrl-C at a hidden password prompt leaves the terminal with echo off;
/// restore it on the way out for the best user experience.
fn handle_password_interrupts() {
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            dexter_host::control::restore_terminal_echo();
            std::process::exit(0);
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let style = if matches!(cli.command, Commands::Daemon) {
        dexter_telemetry::LogStyle::Daemon
    } else {
        dexter_telemetry::LogStyle::Operator
    };
    dexter_telemetry::init(style)?;

    handle_password_interrupts();

    let mut config = Config::from_env()?;
    if let Some(path) = cli.demo {
        config = config.with_demo_path(path);
    }
    let store = open_store(&config).await?;

    match cli.command {
        Commands::Daemon => daemon::run(config, store).await,
        Commands::Investigation { command } => {
            investigation::run(command, &config, store).await
        }
        Commands::Investigator { command } => {
            investigator::run(command, &config, store).await
        }
        Commands::Report { command } => report::run(command, &config, store).await,
    }
}

// Path: crates/cli/src/commands/investigator.rs
//! Investigator management: create the local identity, revoke others.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;
use zeroize::Zeroizing;

use dexter_api::ObjectStore;
use dexter_engine::{InvestigatorRegistry, KeyVault};
use dexter_store::layout;
use dexter_types::Config;

use crate::util;

#[derive(Subcommand, Debug)]
pub enum InvestigatorCommands {
    /// Create a new investigator identity on this machine and publish it.
    Create {
        /// Unique short display name.
        name: String,
    },
    /// Revoke investigators: delete their records and their reports.
    Revoke {
        /// Names to revoke.
        #[clap(required = true)]
        names: Vec<String>,
    },
}

pub async fn run(
    command: InvestigatorCommands,
    config: &Config,
    store: Arc<dyn ObjectStore>,
) -> Result<()> {
    let registry = InvestigatorRegistry::new(store.clone());
    match command {
        InvestigatorCommands::Create { name } => create(&name, config, &registry).await,
        InvestigatorCommands::Revoke { names } => revoke(&names, store, &registry).await,
    }
}

async fn create(name: &str, config: &Config, registry: &InvestigatorRegistry) -> Result<()> {
    println!("Initializing new investigator \"{name}\" on local system...");
    let password = Zeroizing::new(util::collect_new_password());

    println!("Generating key, this can take a moment...");
    let (record, key_pem) = KeyVault::create_investigator(name, &password)
        .context("unable to generate investigator key")?;

    let vault = KeyVault::new(config);
    vault
        .persist(&record, &key_pem)
        .context("unable to write local investigator files")?;

    registry
        .publish(&record)
        .await
        .context("error uploading investigator")?;
    println!("Investigator setup complete, investigator is live");
    Ok(())
}

async fn revoke(
    names: &[String],
    store: Arc<dyn ObjectStore>,
    registry: &InvestigatorRegistry,
) -> Result<()> {
    for name in names {
        println!("Revoking investigator \"{name}\"");
        match registry.revoke(name).await {
            Ok(()) => println!("Investigator revoked"),
            Err(e) => eprintln!("error revoking investigator: {e}"),
        }

        println!("Deleting all old reports for {name}");
        let files = store
            .list(layout::REPORTS_PREFIX)
            .await
            .context("error listing reports")?;
        for file in files {
            let recipient = layout::ReportLocator::parse(&file).map(|locator| locator.recipient);
            if recipient.as_deref() == Some(name.as_str()) || file.contains(name.as_str()) {
                if let Err(e) = store.delete(&file).await {
                    eprintln!("unable to delete {file}: {e}");
                }
            }
        }
    }
    Ok(())
}

// Path: crates/cli/src/commands/report.rs
//! Report management: list, retrieve, archive, prune.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use dexter_api::ObjectStore;
use dexter_engine::{package, reconcile, InvestigatorRegistry, KeyVault};
use dexter_facts::FactRegistry;
use dexter_store::{layout, resolve_short_id};
use dexter_types::Config;

use crate::util;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Print a list of dexter reports that are available for download.
    List {
        /// Show archived reports.
        #[clap(long)]
        archived: bool,
    },
    /// Download a report and decrypt it into a local directory.
    Retrieve {
        /// Full or partial investigation id.
        id: String,
    },
    /// Mark all reports archived, hiding them from list output while
    /// preserving them on the store.
    Archive,
    /// Delete all report blobs from the store.
    Prune,
}

pub async fn run(
    command: ReportCommands,
    config: &Config,
    store: Arc<dyn ObjectStore>,
) -> Result<()> {
    let registry = InvestigatorRegistry::new(store.clone());
    match command {
        ReportCommands::List { archived } => list(store.as_ref(), &registry, archived).await,
        ReportCommands::Retrieve { id } => retrieve(&id, config, store.as_ref()).await,
        ReportCommands::Archive => archive(store.as_ref()).await,
        ReportCommands::Prune => prune(store.as_ref()).await,
    }
}

async fn list(
    store: &dyn ObjectStore,
    registry: &InvestigatorRegistry,
    archived: bool,
) -> Result<()> {
    let facts = FactRegistry::builtin();
    let locators = package::report_files(store, archived).await?;

    // Group the blob pairs into one row per investigation.
    let mut hosts: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut recipients: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for locator in &locators {
        let host_list = hosts.entry(locator.id.clone()).or_default();
        if !host_list.contains(&locator.hostname) {
            host_list.push(locator.hostname.clone());
        }
        let recipient_list = recipients.entry(locator.id.clone()).or_default();
        if !recipient_list.contains(&locator.recipient) {
            recipient_list.push(locator.recipient.clone());
        }
    }

    let investigations = reconcile::current_investigations(store, registry).await?;

    let mut rows = Vec::new();
    for (id, host_list) in &hosts {
        let investigation = investigations
            .iter()
            .find(|investigation| &investigation.id == id);
        let (issuer, tasks, scope) = match investigation {
            Some(investigation) => (
                investigation.issuer.name.clone(),
                util::map_strings(&investigation.task_list, |_| false).join(", "),
                util::map_strings(&investigation.scope, |name| {
                    facts.get(name).map(|fact| fact.private).unwrap_or(false)
                })
                .join(", "),
            ),
            // The investigation was probably pruned; the report remains.
            None => ("?".to_string(), "?".to_string(), "?".to_string()),
        };
        rows.push(vec![
            id.clone(),
            issuer,
            tasks,
            scope,
            recipients.get(id).cloned().unwrap_or_default().join(", "),
            host_list.len().to_string(),
        ]);
    }
    util::render_table(
        &[
            "Investigation",
            "Issuer",
            "Tasks",
            "Scope",
            "Recipients",
            "Hosts Uploaded",
        ],
        &rows,
    );
    Ok(())
}

async fn retrieve(partial: &str, config: &Config, store: &dyn ObjectStore) -> Result<()> {
    let full = resolve_short_id(store, partial).await?;
    let vault = KeyVault::new(config);
    let local_name = vault.local_name()?;

    let locators: Vec<_> = package::report_files(store, false)
        .await?
        .into_iter()
        .filter(|locator| locator.id == full && locator.recipient == local_name)
        .collect();
    if locators.is_empty() {
        bail!("no reports under {full} are addressed to {local_name}");
    }

    let key = vault.load_key(&util::collect_password)?;
    let dest = std::env::current_dir()?;
    for locator in &locators {
        let out_dir = package::retrieve(store, locator, &key, &dest)
            .await
            .with_context(|| format!("unable to retrieve report from {}", locator.hostname))?;
        println!("Decrypted report into {}", out_dir.display());
    }
    Ok(())
}

async fn archive(store: &dyn ObjectStore) -> Result<()> {
    let files = store
        .list(layout::REPORTS_PREFIX)
        .await
        .context("unable to list reports")?;
    for file in files {
        if layout::is_archived(&file) {
            continue;
        }
        store
            .move_object(&file, &layout::archived_key(&file))
            .await
            .context("error moving file for archive")?;
    }
    Ok(())
}

async fn prune(store: &dyn ObjectStore) -> Result<()> {
    let files = store
        .list(layout::REPORTS_PREFIX)
        .await
        .context("unable to list reports")?;
    for file in files {
        if let Err(e) = store.delete(&file).await {
            eprintln!("unable to delete {file}: {e}");
        }
    }
    Ok(())
}

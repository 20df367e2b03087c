// Path: crates/cli/src/commands/daemon.rs
//! The daemon entrypoint: start the engine on a host that will be
//! receiving investigations to run.

use std::sync::Arc;

use anyhow::{bail, Result};

use dexter_api::ObjectStore;
use dexter_engine::{Daemon, InvestigatorRegistry};
use dexter_host::control::UnixHostControl;
use dexter_host::HostEnv;
use dexter_types::Config;

pub async fn run(config: Config, store: Arc<dyn ObjectStore>) -> Result<()> {
    tracing::info!("starting dexter daemon");

    // A daemon with nobody to encrypt to can never publish a report.
    if InvestigatorRegistry::new(store.clone()).all().await?.is_empty() {
        bail!("no investigators loaded");
    }

    let host = HostEnv::new(&config);
    let host_control = Arc::new(UnixHostControl::new());
    let daemon = Daemon::new(config, store, host, host_control);
    daemon.start().await?;
    Ok(())
}

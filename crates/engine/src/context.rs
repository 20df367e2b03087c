// Path: crates/engine/src/context.rs
//! The daemon context and its processing loop.
//!
//! One `Daemon` value owns everything the pipeline needs: configuration,
//! the store handle, the investigator registry, both plugin registries,
//! the host environment, and host control. Tests assemble their own with
//! a local store and a stubbed host instead of mutating process globals.

use std::sync::Arc;

use dexter_api::{HostControl, ObjectStore};
use dexter_facts::FactRegistry;
use dexter_host::HostEnv;
use dexter_tasks::TaskRegistry;
use dexter_types::Config;

use crate::error::EngineError;
use crate::poller::{Poller, LIST_RETRY_BACKOFF};
use crate::registry::InvestigatorRegistry;
use crate::{cleanup, lifecycle, package};

/// Everything a running daemon carries.
pub struct Daemon {
    /// Resolved environment configuration.
    pub config: Config,
    /// The shared object store.
    pub store: Arc<dyn ObjectStore>,
    /// Investigator records, read from the store.
    pub registry: InvestigatorRegistry,
    /// Facts this build can evaluate.
    pub facts: FactRegistry,
    /// Tasks this build can run.
    pub tasks: TaskRegistry,
    /// The machine under investigation.
    pub host: HostEnv,
    /// Destructive post-report actions.
    pub host_control: Arc<dyn HostControl>,
}

impl Daemon {
    /// Assemble a daemon with the built-in plugin registries.
    pub fn new(
        config: Config,
        store: Arc<dyn ObjectStore>,
        host: HostEnv,
        host_control: Arc<dyn HostControl>,
    ) -> Self {
        let registry = InvestigatorRegistry::new(store.clone());
        Self {
            config,
            store,
            registry,
            facts: FactRegistry::builtin(),
            tasks: TaskRegistry::builtin(),
            host,
            host_control,
        }
    }

    /// Poll for investigations, validate them, and run the tasks if in
    /// scope. Runs until the process exits; a listing failure backs off
    /// and retries rather than killing the daemon.
    pub async fn start(&self) -> Result<(), EngineError> {
        let mut poller = Poller::new(self.store.clone());
        poller.seed().await?;

        loop {
            match poller.poll_once().await {
                Ok(batch) => {
                    for investigation in batch {
                        self.process(investigation).await;
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "error listing investigation objects in store");
                    tokio::time::sleep(LIST_RETRY_BACKOFF).await;
                }
            }
        }
    }

    /// Take one investigation through validate, run, report, cleanup.
    /// Validation failures skip it with a log line; the blob stays on the
    /// store for other daemons or later approvals.
    pub async fn process(&self, investigation: dexter_types::Investigation) {
        if let Err(e) = lifecycle::validate(self, &investigation).await {
            tracing::error!(investigation = %investigation.id, error = %e, "skipping investigation");
            return;
        }

        if let Err(e) = lifecycle::run(self, &investigation).await {
            tracing::error!(investigation = %investigation.id, error = %e, "unable to run investigation");
            return;
        }
        if let Err(e) = package::report(self, &investigation).await {
            tracing::error!(investigation = %investigation.id, error = %e, "unable to report investigation");
        }
        cleanup::cleanup(self, &investigation).await;
    }
}

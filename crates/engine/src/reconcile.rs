// Path: crates/engine/src/reconcile.rs
//! Reconciliation of per-uploader investigation copies.
//!
//! Every uploader (issuer or approver) writes their own
//! `investigations/<id>.<name>` blob holding their accumulated view. With
//! no write coordination, the consistent view is built per id by keeping
//! the copy with the most approvers and dropping any copy carrying an
//! invalid signature. Richest valid evidence wins.

use std::collections::BTreeMap;

use dexter_api::ObjectStore;
use dexter_store::{layout, resolve_short_id};
use dexter_types::Investigation;

use crate::error::EngineError;
use crate::lifecycle;
use crate::registry::InvestigatorRegistry;

async fn investigations(
    store: &dyn ObjectStore,
    registry: &InvestigatorRegistry,
    include_archived: bool,
) -> Result<Vec<Investigation>, EngineError> {
    let mut known: BTreeMap<String, Investigation> = BTreeMap::new();

    for key in store.list(layout::INVESTIGATIONS_PREFIX).await? {
        if !include_archived && layout::is_archived(&key) {
            continue;
        }
        let data = match store.get(&key).await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "unable to fetch investigation copy");
                continue;
            }
        };
        let investigation: Investigation = match serde_json::from_slice(&data) {
            Ok(investigation) => investigation,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "unable to unmarshal investigation json");
                continue;
            }
        };
        if !lifecycle::all_signatures_valid(registry, &investigation).await {
            tracing::error!(key = %key, "investigation contains invalid signatures");
            continue;
        }

        match known.get(&investigation.id) {
            Some(existing) if existing.approvers.len() >= investigation.approvers.len() => {}
            _ => {
                known.insert(investigation.id.clone(), investigation);
            }
        }
    }

    Ok(known.into_values().collect())
}

/// The current (non-archived) investigations, one richest copy per id.
pub async fn current_investigations(
    store: &dyn ObjectStore,
    registry: &InvestigatorRegistry,
) -> Result<Vec<Investigation>, EngineError> {
    investigations(store, registry, false).await
}

/// Every investigation including archived ones, one richest copy per id.
pub async fn all_investigations(
    store: &dyn ObjectStore,
    registry: &InvestigatorRegistry,
) -> Result<Vec<Investigation>, EngineError> {
    investigations(store, registry, true).await
}

/// Look up an investigation by full or partial id.
pub async fn investigation_by_id(
    store: &dyn ObjectStore,
    registry: &InvestigatorRegistry,
    partial: &str,
) -> Result<Investigation, EngineError> {
    let full = resolve_short_id(store, partial).await?;
    current_investigations(store, registry)
        .await?
        .into_iter()
        .find(|investigation| investigation.id == full)
        .ok_or(EngineError::UnknownInvestigation(full))
}

/// Look up an investigation in an already-reconciled list.
pub async fn investigation_by_id_with_cache(
    store: &dyn ObjectStore,
    cache: &[Investigation],
    partial: &str,
) -> Result<Investigation, EngineError> {
    let full = resolve_short_id(store, partial).await?;
    cache
        .iter()
        .find(|investigation| investigation.id == full)
        .cloned()
        .ok_or(EngineError::UnknownInvestigation(full))
}

// Path: crates/engine/src/registry.rs
//! Store-backed investigator registry.
//!
//! Investigator records live under `investigators/` on the shared store;
//! publishing a record is what makes an investigator real to the fleet.
//! Revocation is deleting the record, or overwriting it with an empty blob
//! (the emergency task does the latter); both make the name unresolvable.

use std::sync::Arc;

use dexter_api::ObjectStore;
use dexter_crypto::{key_store, RsaPublicKey};
use dexter_store::layout;
use dexter_types::Investigator;

use crate::error::EngineError;

/// Lookup and publication of investigator records.
#[derive(Clone)]
pub struct InvestigatorRegistry {
    store: Arc<dyn ObjectStore>,
}

impl InvestigatorRegistry {
    /// A registry reading from `store`.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Every investigator with a parseable record, in listing order.
    pub async fn all(&self) -> Result<Vec<Investigator>, EngineError> {
        let mut investigators = Vec::new();
        for key in self.store.list(layout::INVESTIGATORS_PREFIX).await? {
            let data = match self.store.get(&key).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::error!(name = %key, error = %e, "unable to read investigator record");
                    continue;
                }
            };
            match Investigator::from_json(&data) {
                Ok(investigator) => investigators.push(investigator),
                Err(e) => {
                    // Empty blobs are revoked records; anything else is rot.
                    if !data.is_empty() {
                        tracing::error!(name = %key, error = %e, "error parsing investigator record");
                    }
                }
            }
        }
        Ok(investigators)
    }

    /// Every registered investigator name.
    pub async fn names(&self) -> Result<Vec<String>, EngineError> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .map(|investigator| investigator.name)
            .collect())
    }

    /// Fetch and parse the named investigator's public key.
    pub async fn get_public_key(&self, name: &str) -> Result<RsaPublicKey, EngineError> {
        let key = layout::investigator_key(name);
        let data = self.store.get(&key).await.map_err(|e| {
            if e.is_not_found() {
                EngineError::UnknownInvestigator(name.to_string())
            } else {
                EngineError::Store(e)
            }
        })?;
        let record = Investigator::from_json(&data)
            .map_err(|_| EngineError::UnknownInvestigator(name.to_string()))?;
        Ok(key_store::public_key_from_record(&record.public_key)?)
    }

    /// Publish a record, making the investigator visible to the fleet.
    pub async fn publish(&self, investigator: &Investigator) -> Result<(), EngineError> {
        let data = investigator.to_json()?;
        self.store
            .put(&layout::investigator_key(&investigator.name), &data)
            .await?;
        Ok(())
    }

    /// Delete the named investigator's record outright.
    pub async fn revoke(&self, name: &str) -> Result<(), EngineError> {
        self.store.delete(&layout::investigator_key(name)).await?;
        Ok(())
    }
}

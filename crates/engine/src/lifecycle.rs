// Path: crates/engine/src/lifecycle.rs
//! Validation, consensus arithmetic, and task execution.
//!
//! Validation is a strict conjunction: issuer signature, at least one known
//! task, every scope fact true on this host, and enough distinct valid
//! approver signatures for the most demanding task. Anything less skips the
//! investigation here without touching the blob, because another daemon, or
//! the same daemon after another approver uploads, may still satisfy it.

use dexter_tasks::{TaskContext, TaskRegistry};
use dexter_types::error::ValidationError;
use dexter_types::{Investigation, Signature};

use crate::context::Daemon;
use crate::registry::InvestigatorRegistry;

/// Verify one signature over the investigation digest. Unknown signers and
/// registry failures are invalid signatures, not errors.
pub async fn signature_valid(
    registry: &InvestigatorRegistry,
    investigation: &Investigation,
    signature: &Signature,
) -> bool {
    let public_key = match registry.get_public_key(&signature.name).await {
        Ok(key) => key,
        Err(_) => return false,
    };
    dexter_crypto::sign::verify_digest(&public_key, &investigation.digest(), &signature.data)
}

/// True when the issuer and every listed approver verify. Reconciliation
/// drops copies failing this check before they are ever considered.
pub async fn all_signatures_valid(
    registry: &InvestigatorRegistry,
    investigation: &Investigation,
) -> bool {
    if !signature_valid(registry, investigation, &investigation.issuer).await {
        return false;
    }
    for approver in &investigation.approvers {
        if !signature_valid(registry, investigation, approver).await {
            return false;
        }
    }
    true
}

/// The number of approver signatures from a unique set of investigators
/// (excluding the issuer) that verify. This is the achieved consensus.
pub async fn valid_unique_approvers(
    registry: &InvestigatorRegistry,
    investigation: &Investigation,
) -> usize {
    let mut achieved = 0;
    for signature in investigation.unique_approvers() {
        if signature_valid(registry, investigation, signature).await {
            achieved += 1;
        } else {
            tracing::error!(
                name = %signature.name,
                investigation = %investigation.id,
                "approver signature invalid"
            );
        }
    }
    achieved
}

/// Each task carries its own consensus requirement; the highest among the
/// known tasks governs the whole investigation. Unknown task names are
/// logged and contribute nothing (an investigation with only unknown tasks
/// already fails validation). Never below one.
pub fn minimum_consensus(tasks: &TaskRegistry, investigation: &Investigation) -> usize {
    let mut required = 1;
    for task_name in investigation.task_list.keys() {
        match tasks.get(task_name) {
            Some(task) => required = required.max(task.consensus_requirement),
            None => {
                tracing::error!(task_name = %task_name, "named task not found");
            }
        }
    }
    required
}

fn count_known_tasks(tasks: &TaskRegistry, investigation: &Investigation) -> usize {
    investigation
        .task_list
        .keys()
        .filter(|name| tasks.get(name).is_some())
        .count()
}

/// Decide whether this daemon will run the investigation.
pub async fn validate(daemon: &Daemon, investigation: &Investigation) -> Result<(), ValidationError> {
    // Verify the issuer has a valid signature.
    if !signature_valid(&daemon.registry, investigation, &investigation.issuer).await {
        return Err(ValidationError::IssuerSignatureInvalid);
    }

    // At least one task must resolve against this build's registry.
    if count_known_tasks(&daemon.tasks, investigation) == 0 {
        return Err(ValidationError::NoKnownTasks);
    }

    // Determine if the facts defined in the scope apply to this host. The
    // investigation id doubles as the salt for private facts.
    for (fact_name, args) in &investigation.scope {
        let Some(fact) = daemon.facts.get(fact_name) else {
            return Err(ValidationError::UnknownFact(fact_name.clone()));
        };
        if !fact.assert(&daemon.host, args, &investigation.id).await {
            return Err(ValidationError::OutOfScope(fact_name.clone()));
        }
    }

    // Verify this action has been approved with enough consensus.
    let achieved = valid_unique_approvers(&daemon.registry, investigation).await;
    let required = minimum_consensus(&daemon.tasks, investigation);
    if achieved < required {
        return Err(ValidationError::ConsensusNotReached { achieved, required });
    }

    Ok(())
}

/// Run every known task in the list, sequentially, each into its own
/// subdirectory of the report directory. Unknown names are logged and
/// skipped; task failures are recorded in their own `errors.txt` and never
/// abort the investigation.
pub async fn run(daemon: &Daemon, investigation: &Investigation) -> Result<(), std::io::Error> {
    let report_dir = investigation.report_directory();
    tokio::fs::create_dir_all(&report_dir).await.map_err(|e| {
        tracing::error!(
            error = %e,
            path = %report_dir.display(),
            "unable to create report directory"
        );
        e
    })?;

    tracing::info!(investigation = %investigation.id, "running investigation");
    let ctx = TaskContext {
        host: &daemon.host,
        store: daemon.store.as_ref(),
    };
    for (task_name, args) in &investigation.task_list {
        match daemon.tasks.get(task_name) {
            Some(task) => task.run(&ctx, &report_dir, args).await,
            None => {
                tracing::error!(name = %task_name, "task name is not a known task");
            }
        }
    }
    tracing::info!(
        investigation = %investigation.id,
        "finished {} tasks",
        investigation.task_list.len()
    );
    Ok(())
}

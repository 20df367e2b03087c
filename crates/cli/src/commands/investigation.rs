// Path: crates/cli/src/commands/investigation.rs
//! Investigation management: create, list, approve, archive, prune.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use dexter_api::ObjectStore;
use dexter_crypto::{hash, sign};
use dexter_engine::{lifecycle, reconcile, InvestigatorRegistry, KeyVault};
use dexter_facts::FactRegistry;
use dexter_store::layout;
use dexter_tasks::TaskRegistry;
use dexter_types::{id, Config, Investigation, Signature};

use crate::util;

#[derive(Subcommand, Debug)]
pub enum InvestigationCommands {
    /// Create a new dexter investigation and upload it for approval.
    Create,
    /// Print a list of all dexter investigations.
    List {
        /// Show archived investigations.
        #[clap(long)]
        archived: bool,
    },
    /// Print the details of an investigation and countersign it.
    Approve {
        /// Full or partial investigation id.
        id: String,
    },
    /// Mark all investigations archived, hiding them from list output
    /// while preserving them on the store.
    Archive,
    /// Download all investigation blobs into a local archive directory,
    /// then delete them from the store.
    Prune,
}

pub async fn run(
    command: InvestigationCommands,
    config: &Config,
    store: Arc<dyn ObjectStore>,
) -> Result<()> {
    let registry = InvestigatorRegistry::new(store.clone());
    match command {
        InvestigationCommands::Create => create(config, store.as_ref(), &registry).await,
        InvestigationCommands::List { archived } => {
            list(store.as_ref(), &registry, archived).await
        }
        InvestigationCommands::Approve { id } => {
            approve(&id, config, store.as_ref(), &registry).await
        }
        InvestigationCommands::Archive => archive(store.as_ref()).await,
        InvestigationCommands::Prune => prune(store.as_ref()).await,
    }
}

type Selection = BTreeMap<String, Vec<String>>;

/// Numbered selection slots. Freed numbers are reused so the numbers shown
/// by `ls` stay stable while the operator edits the set.
type Slots = BTreeMap<usize, (String, Vec<String>)>;

fn find_slot(slots: &Slots) -> usize {
    let mut candidate = 0;
    while slots.contains_key(&candidate) {
        candidate += 1;
    }
    candidate
}

fn dedup_fail(slots: &Slots, name: &str, args: &[String]) -> bool {
    slots
        .values()
        .any(|(known, known_args)| known == name && known_args == args)
}

fn unorder(slots: Slots) -> Selection {
    slots.into_values().collect()
}

fn remove_by_number(slots: &mut Slots, args: &[String]) {
    for raw in args {
        let Ok(number) = raw.parse::<usize>() else {
            eprintln!("bad selection, not a number");
            continue;
        };
        match slots.remove(&number) {
            Some((name, args)) => {
                eprintln!(
                    "DELETED: {}",
                    util::string_with_args(&name, &args, false)
                );
            }
            None => eprintln!("bad selection, entry doesn't exist"),
        }
    }
}

fn print_selection_help(kind: &str) {
    eprintln!();
    eprintln!("Dexter {kind} selection:");
    eprintln!();
    eprintln!("Type a {kind} name, then whitespace-separated arguments if needed:");
    eprintln!();
    eprintln!("\t{kind} [done] > my-{kind} arg1 arg2 arg3");
    eprintln!();
    eprintln!("'ls' shows everything added so far");
    eprintln!("'rm <n>' removes an entry by number");
    eprintln!("An empty line finishes {kind} selection");
    eprintln!("'exit' cancels this investigation");
}

fn collect_tasks(tasks: &TaskRegistry) -> Selection {
    eprintln!("Select tasks to run in this investigation, for more information try 'help'");
    let mut slots: Slots = BTreeMap::new();
    loop {
        let input = util::split_arguments(&util::read_line_allow_empty("task [done]"));
        let Some(name) = input.first() else {
            if slots.is_empty() {
                eprintln!("please select at least one task");
                continue;
            }
            return unorder(slots);
        };
        let args: Vec<String> = input.iter().skip(1).cloned().collect();

        match name.as_str() {
            "exit" => std::process::exit(0),
            "help" => {
                print_selection_help("task");
                for task in tasks.iter() {
                    eprintln!("  {}\t{}", task.name, task.description);
                }
            }
            "ls" => {
                for (number, (name, args)) in &slots {
                    eprintln!(
                        "[{number}]: {}",
                        util::string_with_args(name, args, false)
                    );
                }
            }
            "rm" => remove_by_number(&mut slots, &args),
            name => {
                let Some(task) = tasks.get(name) else {
                    eprintln!("unknown task: {name}");
                    continue;
                };
                if args.len() < task.minimum_arguments {
                    eprintln!(
                        "not enough arguments, required: {}, provided: {}",
                        task.minimum_arguments,
                        args.len()
                    );
                    continue;
                }
                if dedup_fail(&slots, name, &args) {
                    eprintln!("identical task and arguments already added");
                    continue;
                }
                eprintln!("ADDED: {}", util::string_with_args(name, &args, false));
                slots.insert(find_slot(&slots), (name.to_string(), args));
            }
        }
    }
}

fn collect_facts(facts: &FactRegistry, salt: &str) -> Result<Selection> {
    eprintln!("Select facts to scope this investigation, for more information try 'help'");
    let mut slots: Slots = BTreeMap::new();
    loop {
        let input = util::split_arguments(&util::read_line_allow_empty("fact [done]"));
        let Some(name) = input.first() else {
            return Ok(unorder(slots));
        };
        let args: Vec<String> = input.iter().skip(1).cloned().collect();

        match name.as_str() {
            "exit" => std::process::exit(0),
            "help" => {
                print_selection_help("fact");
                for fact in facts.iter() {
                    eprintln!("  {}\t{}", fact.name, fact.description);
                }
            }
            "ls" => {
                for (number, (name, args)) in &slots {
                    let private = facts.get(name).map(|fact| fact.private).unwrap_or(false);
                    eprintln!(
                        "[{number}]: {}",
                        util::string_with_args(name, args, private)
                    );
                }
            }
            "rm" => remove_by_number(&mut slots, &args),
            name => {
                let Some(fact) = facts.get(name) else {
                    eprintln!("unknown fact: {name}");
                    continue;
                };
                if args.len() < fact.minimum_arguments {
                    eprintln!(
                        "not enough arguments, required: {}, provided: {}",
                        fact.minimum_arguments,
                        args.len()
                    );
                    continue;
                }
                // Private fact arguments never travel in plaintext; they
                // are hashed right here with the fresh investigation id.
                let wire_args = if fact.private {
                    let mut hashed = Vec::with_capacity(args.len());
                    for arg in &args {
                        hashed.push(hash::hash_value(arg, salt)?);
                    }
                    hashed
                } else {
                    args.clone()
                };
                if dedup_fail(&slots, name, &wire_args) {
                    eprintln!("identical fact and arguments already added");
                    continue;
                }
                eprintln!(
                    "ADDED: {}",
                    util::string_with_args(name, &wire_args, fact.private)
                );
                slots.insert(find_slot(&slots), (name.to_string(), wire_args));
            }
        }
    }
}

async fn upload(
    store: &dyn ObjectStore,
    investigation: &Investigation,
    uploader: &str,
) -> Result<()> {
    let data = serde_json::to_vec_pretty(investigation)?;
    store
        .put(&layout::investigation_key(&investigation.id, uploader), &data)
        .await
        .context("error uploading investigation")?;
    Ok(())
}

async fn create(
    config: &Config,
    store: &dyn ObjectStore,
    registry: &InvestigatorRegistry,
) -> Result<()> {
    let tasks = TaskRegistry::builtin();
    let facts = FactRegistry::builtin();
    let vault = KeyVault::new(config);
    let local_name = vault
        .local_name()
        .context("no local investigator; run `dexter investigator create` first")?;

    let names = registry.names().await?;
    if names.is_empty() {
        bail!("no investigators are published; nobody could read the report");
    }

    let investigation_id = id::new_short_id();
    let task_list = collect_tasks(&tasks);
    let scope = collect_facts(&facts, &investigation_id)?;
    let kill_containers =
        util::ask_yes_no("Terminate containers in scope after tasks complete?", false);
    let kill_host = util::ask_yes_no("Terminate hosts in scope after tasks complete?", false);
    let recipient_names = util::select_from_list(
        &names,
        "Which investigators should be able to access this report?",
        true,
        true,
    );

    let mut investigation = Investigation {
        id: investigation_id,
        task_list,
        scope,
        kill_containers,
        kill_host,
        issuer: Signature::unsigned(&local_name),
        approvers: vec![],
        recipient_names,
    };

    eprintln!("The investigation will now be signed...");
    let key = vault.load_key(&util::collect_password)?;
    investigation.issuer.data = sign::sign_digest(&key, &investigation.digest())?;

    upload(store, &investigation, &local_name).await?;
    println!("Investigation uploaded: {}", investigation.id);
    Ok(())
}

fn scope_strings(facts: &FactRegistry, investigation: &Investigation) -> Vec<String> {
    util::map_strings(&investigation.scope, |name| {
        facts.get(name).map(|fact| fact.private).unwrap_or(false)
    })
}

async fn list(
    store: &dyn ObjectStore,
    registry: &InvestigatorRegistry,
    archived: bool,
) -> Result<()> {
    let tasks = TaskRegistry::builtin();
    let facts = FactRegistry::builtin();

    let investigations = if archived {
        reconcile::all_investigations(store, registry).await?
    } else {
        reconcile::current_investigations(store, registry).await?
    };

    let mut rows = Vec::new();
    for investigation in &investigations {
        let achieved = lifecycle::valid_unique_approvers(registry, investigation).await;
        let required = lifecycle::minimum_consensus(&tasks, investigation);
        rows.push(vec![
            investigation.id.clone(),
            investigation.issuer.name.clone(),
            util::map_strings(&investigation.task_list, |_| false).join(", "),
            scope_strings(&facts, investigation).join(", "),
            format!("{achieved}/{required}"),
            investigation.approver_names().join(", "),
        ]);
    }
    util::render_table(
        &[
            "Investigation",
            "Issuer",
            "Tasks",
            "Scope",
            "Consensus",
            "Reviewed By",
        ],
        &rows,
    );
    Ok(())
}

async fn approve(
    partial: &str,
    config: &Config,
    store: &dyn ObjectStore,
    registry: &InvestigatorRegistry,
) -> Result<()> {
    let facts = FactRegistry::builtin();
    let mut investigation = reconcile::investigation_by_id(store, registry, partial)
        .await
        .context("error looking up investigation")?;

    println!("Provide your password to approve the following investigation:");
    util::render_table(
        &["Field", "Value"],
        &[
            vec!["ID".to_string(), investigation.id.clone()],
            vec!["Issued By".to_string(), investigation.issuer.name.clone()],
            vec![
                "Tasks".to_string(),
                util::map_strings(&investigation.task_list, |_| false).join(", "),
            ],
            vec![
                "Scope".to_string(),
                scope_strings(&facts, &investigation).join(", "),
            ],
            vec![
                "Kill Containers?".to_string(),
                investigation.kill_containers.to_string(),
            ],
            vec!["Kill Host?".to_string(), investigation.kill_host.to_string()],
            vec![
                "Recipients".to_string(),
                investigation.recipient_names.join(", "),
            ],
            vec![
                "Approvers".to_string(),
                investigation.approver_names().join(", "),
            ],
        ],
    );

    let vault = KeyVault::new(config);
    let local_name = vault.local_name()?;
    let key = vault.load_key(&util::collect_password)?;
    let data = sign::sign_digest(&key, &investigation.digest())?;
    investigation.approvers.push(Signature {
        name: local_name.clone(),
        data,
    });

    upload(store, &investigation, &local_name)
        .await
        .context("failed to upload approval")?;
    println!("Investigation approved");
    Ok(())
}

async fn archive(store: &dyn ObjectStore) -> Result<()> {
    let filenames = store
        .list(layout::INVESTIGATIONS_PREFIX)
        .await
        .context("unable to list investigations")?;
    for filename in filenames {
        if layout::is_archived(&filename) {
            continue;
        }
        store
            .move_object(&filename, &layout::archived_key(&filename))
            .await
            .context("error moving file for archive")?;
    }
    Ok(())
}

async fn prune(store: &dyn ObjectStore) -> Result<()> {
    let filenames = store
        .list(layout::INVESTIGATIONS_PREFIX)
        .await
        .context("unable to list investigations")?;

    let archive_dir = std::path::Path::new("InvestigationArchive");
    std::fs::create_dir_all(archive_dir)
        .context("unable to create directory for investigation archive")?;

    for filename in filenames {
        let data = match store.get(&filename).await {
            Ok(data) => data,
            Err(e) => {
                eprintln!("unable to download {filename}: {e}");
                continue;
            }
        };
        let local = archive_dir.join(layout::basename(&filename));
        if let Err(e) = std::fs::write(&local, data) {
            eprintln!("unable to write {}: {e}", local.display());
            continue;
        }
        if let Err(e) = store.delete(&filename).await {
            eprintln!("unable to delete {filename}: {e}");
        }
    }
    Ok(())
}

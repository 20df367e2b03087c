// Path: crates/tasks/src/docker_diff.rs
//! Per-container filesystem diff collection.
//!
//! For every running container this records a `manifest.json` of the
//! daemon-reported change set and extracts the evidence for each entry:
//!
//! - `added<path>` — content of a file the container created
//! - `modified<path>` and `modified<path>.original` — the live content
//!   next to the pre-modification copy
//! - `removed<path>` — the deleted file's content
//!
//! Original and removed content no longer exists in the live container, so
//! it is recovered from a second container created (never started) from
//! the same image, then torn down. Directories are excluded from the
//! change set, as every directory in the path of a changed file will
//! appear changed.

use std::io::Read;

use async_trait::async_trait;
use serde::Serialize;

use dexter_host::docker::{ContainerInfo, DockerHandle};

use crate::{ArtifactWriter, Task, TaskAction, TaskContext};

// Docker change kinds.
const KIND_MODIFIED: i64 = 0;
const KIND_ADDED: i64 = 1;
const KIND_REMOVED: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeKind {
    Modified,
    Added,
    Removed,
}

impl ChangeKind {
    fn from_kind(kind: i64) -> Option<Self> {
        match kind {
            KIND_MODIFIED => Some(Self::Modified),
            KIND_ADDED => Some(Self::Added),
            KIND_REMOVED => Some(Self::Removed),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Modified => "Modified",
            Self::Added => "Added",
            Self::Removed => "Removed",
        }
    }
}

/// One confirmed change, with the live file content already in hand for
/// added and modified entries.
struct Change {
    kind: ChangeKind,
    path: String,
    live: Option<Vec<u8>>,
}

#[derive(Serialize)]
struct ContainerRecord<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Image")]
    image: &'a str,
}

#[derive(Serialize)]
struct ChangeRecord<'a> {
    #[serde(rename = "ChangeType")]
    change_type: &'static str,
    #[serde(rename = "Path")]
    path: &'a str,
}

#[derive(Serialize)]
struct ChangeManifest<'a> {
    #[serde(rename = "Container")]
    container: ContainerRecord<'a>,
    #[serde(rename = "Changes")]
    changes: Vec<ChangeRecord<'a>>,
}

struct ContainerFilesystemDiff;

/// Pull one file out of a container. The docker API hands back a tar
/// archive; the first regular-file entry is the requested content. An
/// archive with no regular file means the path is a directory.
async fn extract_file(
    docker: &DockerHandle,
    container_id: &str,
    path: &str,
) -> Result<Option<Vec<u8>>, String> {
    let tarball = docker
        .download_path(container_id, path)
        .await
        .map_err(|e| format!("unable to pull {path} out of container: {e}"))?;

    let mut archive = tar::Archive::new(std::io::Cursor::new(tarball));
    let entries = archive
        .entries()
        .map_err(|e| format!("error reading archive for {path}: {e}"))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| format!("error reading archive for {path}: {e}"))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| format!("error copying {path} from container: {e}"))?;
        return Ok(Some(data));
    }
    Ok(None)
}

/// Classify the raw change list, dropping directories and capturing live
/// content for added and modified entries while the container is at hand.
async fn confirm_changes(
    docker: &DockerHandle,
    writer: &mut ArtifactWriter,
    container_id: &str,
    raw: &[serde_json::Value],
) -> Vec<Change> {
    let mut changes = Vec::new();
    for value in raw {
        let Some(kind) = value
            .get("Kind")
            .and_then(serde_json::Value::as_i64)
            .and_then(ChangeKind::from_kind)
        else {
            continue;
        };
        let Some(path) = value.get("Path").and_then(serde_json::Value::as_str) else {
            continue;
        };

        if kind == ChangeKind::Removed {
            // Nothing left to stat or fetch in the live container.
            changes.push(Change {
                kind,
                path: path.to_string(),
                live: None,
            });
            continue;
        }

        match extract_file(docker, container_id, path).await {
            Ok(Some(data)) => changes.push(Change {
                kind,
                path: path.to_string(),
                live: Some(data),
            }),
            // A directory; its children carry the actual evidence.
            Ok(None) => {}
            Err(e) => {
                tracing::error!(container_id = %container_id, path = %path, error = %e, "error extracting file from container");
                writer.error(&format!("error extracting file ({container_id} {path}): {e}"));
            }
        }
    }
    changes
}

/// Recover a file as it exists in the container's image, via the pristine
/// container, and write it under `label`.
async fn write_from_pristine(
    docker: &DockerHandle,
    writer: &mut ArtifactWriter,
    pristine: Option<&str>,
    live_container: &str,
    path: &str,
    label: String,
) {
    let Some(pristine) = pristine else {
        // Creation already failed and was recorded; nothing to fetch from.
        return;
    };
    match extract_file(docker, pristine, path).await {
        Ok(Some(data)) => writer.write(&label, &data).await,
        Ok(None) => {}
        Err(e) => {
            tracing::error!(container_id = %live_container, path = %path, error = %e, "error extracting original file from container");
            writer.error(&format!(
                "error extracting original file ({live_container} {path}): {e}"
            ));
        }
    }
}

async fn collect_container(
    ctx: &TaskContext<'_>,
    writer: &mut ArtifactWriter,
    container: &ContainerInfo,
) -> Result<(), String> {
    let docker = ctx.host.docker();
    let raw = docker
        .container_changes(&container.id)
        .await
        .map_err(|e| format!("error listing changes: {e}"))?;

    let changes = confirm_changes(docker, writer, &container.id, &raw).await;

    // Write a high-level manifest of the changes.
    let manifest = ChangeManifest {
        container: ContainerRecord {
            id: &container.id,
            image: &container.image,
        },
        changes: changes
            .iter()
            .map(|change| ChangeRecord {
                change_type: change.kind.name(),
                path: &change.path,
            })
            .collect(),
    };
    let manifest_json = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| format!("error creating container diff manifest: {e}"))?;
    writer
        .write(&format!("{}/manifest.json", container.id), &manifest_json)
        .await;

    // Removed files and pre-modification content only exist in the image;
    // bring up an unstarted container from it when any entry needs one.
    let needs_original = changes
        .iter()
        .any(|change| matches!(change.kind, ChangeKind::Modified | ChangeKind::Removed));
    let pristine = if needs_original {
        match docker.create_pristine_container(&container.image).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(image = %container.image, error = %e, "error creating container from original image");
                writer.error(&format!(
                    "error creating container from original image ({}): {e}",
                    container.image
                ));
                None
            }
        }
    } else {
        None
    };

    for change in &changes {
        match change.kind {
            ChangeKind::Added => {
                if let Some(data) = &change.live {
                    writer
                        .write(&format!("{}/added{}", container.id, change.path), data)
                        .await;
                }
            }
            ChangeKind::Modified => {
                if let Some(data) = &change.live {
                    writer
                        .write(&format!("{}/modified{}", container.id, change.path), data)
                        .await;
                }
                write_from_pristine(
                    docker,
                    writer,
                    pristine.as_deref(),
                    &container.id,
                    &change.path,
                    format!("{}/modified{}.original", container.id, change.path),
                )
                .await;
            }
            ChangeKind::Removed => {
                write_from_pristine(
                    docker,
                    writer,
                    pristine.as_deref(),
                    &container.id,
                    &change.path,
                    format!("{}/removed{}", container.id, change.path),
                )
                .await;
            }
        }
    }

    if let Some(pristine) = pristine {
        if let Err(e) = docker.remove_container(&pristine).await {
            tracing::error!(container_id = %pristine, error = %e, "unable to remove pristine container");
            writer.error(&format!("unable to remove pristine container: {e}"));
        }
    }
    Ok(())
}

#[async_trait]
impl TaskAction for ContainerFilesystemDiff {
    async fn run(&self, ctx: &TaskContext<'_>, _args: &[String], writer: &mut ArtifactWriter) {
        let containers = match ctx.host.docker().running_containers().await {
            Ok(containers) => containers,
            Err(e) => {
                tracing::error!(error = %e, "unable to list containers for task");
                writer.error(&format!("unable to list containers for task: {e}"));
                return;
            }
        };

        for container in containers {
            if let Err(e) = collect_container(ctx, writer, &container).await {
                tracing::error!(
                    container_id = %container.id,
                    error = %e,
                    "error creating container diff"
                );
                writer.error(&format!(
                    "error creating container diff for {}: {e}",
                    container.id
                ));
            }
        }
    }
}

/// Collect artifacts and a report on all changes to docker container
/// filesystems.
pub fn task() -> Task {
    Task {
        name: "docker-filesystem-diff",
        description:
            "collect artifacts and a report on all changes to docker container filesystems",
        minimum_arguments: 0,
        consensus_requirement: 1,
        supported_platforms: &[],
        action: Box::new(ContainerFilesystemDiff),
    }
}

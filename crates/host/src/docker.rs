// Path: crates/host/src/docker.rs
//! Lazily connected docker client.
//!
//! One connection per [`DockerHandle`], made on first use and reused for
//! the life of the process. Scope facts only need image names; tasks also
//! pull filesystem change sets and file contents out of containers.

use bollard::models::{ContainerCreateBody, HealthConfig};
use bollard::query_parameters::{
    CreateContainerOptions, DownloadFromContainerOptionsBuilder, KillContainerOptionsBuilder,
    ListContainersOptionsBuilder, RemoveContainerOptionsBuilder,
};
use bollard::Docker;
use futures_util::StreamExt;
use tokio::sync::OnceCell;

use crate::HostError;

/// A running container, reduced to what the agent cares about.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    /// Container id.
    pub id: String,
    /// Image the container was started from.
    pub image: String,
}

/// Cached connection to the local docker daemon.
pub struct DockerHandle {
    client: OnceCell<Docker>,
}

impl DockerHandle {
    /// A handle that will connect on first use.
    pub fn new() -> Self {
        Self {
            client: OnceCell::new(),
        }
    }

    async fn api(&self) -> Result<&Docker, HostError> {
        self.client
            .get_or_try_init(|| async {
                Docker::connect_with_local_defaults().map_err(|e| {
                    tracing::error!(error = %e, "failed to connect to docker daemon");
                    HostError::Docker(e.to_string())
                })
            })
            .await
    }

    /// All currently running containers.
    pub async fn running_containers(&self) -> Result<Vec<ContainerInfo>, HostError> {
        let api = self.api().await?;
        let options = ListContainersOptionsBuilder::default().build();
        let summaries = api
            .list_containers(Some(options))
            .await
            .map_err(|e| HostError::Docker(e.to_string()))?;

        Ok(summaries
            .into_iter()
            .filter_map(|summary| {
                Some(ContainerInfo {
                    id: summary.id?,
                    image: summary.image.unwrap_or_default(),
                })
            })
            .collect())
    }

    /// Images of all currently running containers.
    pub async fn running_images(&self) -> Result<Vec<String>, HostError> {
        Ok(self
            .running_containers()
            .await?
            .into_iter()
            .map(|container| container.image)
            .collect())
    }

    /// SIGKILL every running container whose image does not contain
    /// `sentinel`. Returns the number of containers signalled; individual
    /// kill failures are logged and skipped.
    pub async fn kill_containers_except(&self, sentinel: &str) -> Result<usize, HostError> {
        let containers = self.running_containers().await?;
        let api = self.api().await?;

        let mut killed = 0;
        for container in containers {
            if container.image.contains(sentinel) {
                continue;
            }
            tracing::info!(container_id = %container.id, "killing container");
            let options = KillContainerOptionsBuilder::default().signal("SIGKILL").build();
            match api.kill_container(&container.id, Some(options)).await {
                Ok(()) => killed += 1,
                Err(e) => {
                    tracing::error!(
                        container_id = %container.id,
                        error = %e,
                        "unable to kill container"
                    );
                }
            }
        }
        Ok(killed)
    }

    /// The container's filesystem change set, as reported by the docker
    /// daemon. Items carry `Path` and `Kind` (0 modified, 1 added,
    /// 2 deleted).
    pub async fn container_changes(
        &self,
        container_id: &str,
    ) -> Result<Vec<serde_json::Value>, HostError> {
        let api = self.api().await?;
        let changes = api
            .container_changes(container_id)
            .await
            .map_err(|e| HostError::Docker(e.to_string()))?
            .unwrap_or_default();

        changes
            .into_iter()
            .map(|change| {
                serde_json::to_value(&change).map_err(|e| HostError::Docker(e.to_string()))
            })
            .collect()
    }

    /// Create (without starting) a container from `image`, giving access
    /// to the image's pristine filesystem. The entrypoint is replaced and
    /// networking disabled so nothing runs even if someone starts it; the
    /// caller removes it with [`remove_container`] when done.
    ///
    /// [`remove_container`]: DockerHandle::remove_container
    pub async fn create_pristine_container(&self, image: &str) -> Result<String, HostError> {
        let api = self.api().await?;
        let config = ContainerCreateBody {
            image: Some(image.to_string()),
            entrypoint: Some(vec!["/bin/sleep".to_string(), "900".to_string()]),
            healthcheck: Some(HealthConfig {
                test: Some(vec!["NONE".to_string()]),
                ..Default::default()
            }),
            network_disabled: Some(true),
            ..Default::default()
        };
        let response = api
            .create_container(None::<CreateContainerOptions>, config)
            .await
            .map_err(|e| HostError::Docker(e.to_string()))?;
        for warning in &response.warnings {
            tracing::warn!(image = %image, warning = %warning, "warning creating pristine container");
        }
        Ok(response.id)
    }

    /// Force-remove a container created by this handle.
    pub async fn remove_container(&self, container_id: &str) -> Result<(), HostError> {
        let api = self.api().await?;
        let options = RemoveContainerOptionsBuilder::default().force(true).build();
        api.remove_container(container_id, Some(options))
            .await
            .map_err(|e| HostError::Docker(e.to_string()))
    }

    /// Download a path out of a container as a tar stream.
    pub async fn download_path(
        &self,
        container_id: &str,
        path: &str,
    ) -> Result<Vec<u8>, HostError> {
        let api = self.api().await?;
        let options = DownloadFromContainerOptionsBuilder::default().path(path).build();
        let mut stream = api.download_from_container(container_id, Some(options));

        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| HostError::Docker(e.to_string()))?;
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }
}

impl Default for DockerHandle {
    fn default() -> Self {
        Self::new()
    }
}

// Path: crates/facts/src/docker.rs
//! Docker image facts.

use async_trait::async_trait;

use dexter_host::HostEnv;

use crate::{Fact, FactCheck, FactError};

struct RunningDockerImage;
struct RunningDockerImageSubstring;

#[async_trait]
impl FactCheck for RunningDockerImage {
    async fn evaluate(&self, host: &HostEnv, args: &[String]) -> Result<bool, FactError> {
        let images = host.running_docker_images().await?;
        Ok(args
            .iter()
            .any(|arg| images.iter().any(|image| image == arg)))
    }
}

#[async_trait]
impl FactCheck for RunningDockerImageSubstring {
    async fn evaluate(&self, host: &HostEnv, args: &[String]) -> Result<bool, FactError> {
        let images = host.running_docker_images().await?;
        Ok(args
            .iter()
            .any(|arg| images.iter().any(|image| image.contains(arg.as_str()))))
    }
}

/// Check if the host is running a docker container based on an image given
/// as an argument.
pub fn running_docker_image() -> Fact {
    Fact {
        name: "running-docker-image",
        description:
            "check if the host is running a docker container based on the image provided as an argument",
        private: false,
        minimum_arguments: 1,
        supported_platforms: &[],
        default_state: false,
        check: Box::new(RunningDockerImage),
    }
}

/// Check if the host is running a docker container whose image contains an
/// argument as a substring.
pub fn running_docker_image_substring() -> Fact {
    Fact {
        name: "running-docker-image-substring",
        description:
            "check if the host is running a docker container whose image contains the argument as a substring",
        private: false,
        minimum_arguments: 1,
        supported_platforms: &[],
        default_state: false,
        check: Box::new(RunningDockerImageSubstring),
    }
}

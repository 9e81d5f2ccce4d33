// Docker Engine facade via bollard

mod stats;

pub use stats::summarize;

use crate::error::DockerError;
use crate::models::{ContainerDetail, DockerInfo, DockerSystemStats};
use bollard::Docker;
use bollard::models::{
    ContainerSummary, EventMessage, ImageSummary, Network, VolumeListResponse,
};
use bollard::query_parameters::{
    DataUsageOptions, EventsOptionsBuilder, InspectContainerOptions, ListContainersOptions,
    ListImagesOptions, ListNetworksOptions, ListVolumesOptions, LogsOptionsBuilder,
    RestartContainerOptionsBuilder, StartContainerOptions, StatsOptions,
    StopContainerOptionsBuilder,
};
use futures_util::{Stream, StreamExt};
use tracing::{instrument, warn};

/// Grace period (seconds) the daemon gives a container before killing it on stop/restart.
pub const STOP_GRACE_SECS: i32 = 10;

/// Default number of log lines when the caller does not pass `tail`.
pub const DEFAULT_LOG_TAIL: &str = "100";

/// Thin wrapper over a bollard client. Cheap to share behind an `Arc`.
pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    /// Builds a client from DOCKER_HOST or the platform default socket. Does not contact the daemon.
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_defaults()?;
        Ok(Self { docker })
    }

    /// Builds a client for an explicit socket path (e.g. tests pointing at a dead socket).
    pub fn connect_with_socket(path: &str) -> anyhow::Result<Self> {
        let docker = Docker::connect_with_socket(path, 5, bollard::API_DEFAULT_VERSION)?;
        Ok(Self { docker })
    }

    /// Downgrades the client API version to what the daemon speaks. Keeps the default when
    /// the daemon cannot be reached, so a stopped daemon does not block startup.
    pub async fn negotiate_version(self) -> Self {
        match self.docker.clone().negotiate_version().await {
            Ok(docker) => Self { docker },
            Err(e) => {
                warn!("Docker API version negotiation failed, using default: {}", e);
                self
            }
        }
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "info"))]
    pub async fn info(&self) -> Result<DockerInfo, DockerError> {
        let system_info = self.docker.info().await?;
        let version = self.docker.version().await?;
        let containers = self.list_containers().await?;
        let images = self.list_images().await?;
        let networks = self.list_networks().await?;
        let volumes = self.list_volumes().await?;
        let disk_usage = self.docker.df(None::<DataUsageOptions>).await?;
        Ok(DockerInfo {
            system_info,
            version,
            containers,
            images,
            networks,
            volumes,
            disk_usage,
        })
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "list_containers"))]
    pub async fn list_containers(&self) -> Result<Vec<ContainerSummary>, DockerError> {
        let options = ListContainersOptions {
            all: true,
            ..Default::default()
        };
        Ok(self.docker.list_containers(Some(options)).await?)
    }

    /// Inspect result, plus a single non-streaming stats sample when the container is running.
    /// A stats failure only drops the sample.
    #[instrument(skip(self), fields(repo = "docker", operation = "container_detail"))]
    pub async fn container_detail(&self, id: &str) -> Result<ContainerDetail, DockerError> {
        let container = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;

        let running = container
            .state
            .as_ref()
            .and_then(|s| s.running)
            .unwrap_or(false);
        let stats = if running {
            let options = StatsOptions {
                stream: false,
                ..Default::default()
            };
            match self.docker.stats(id, Some(options)).next().await {
                Some(Ok(s)) => Some(s),
                Some(Err(e)) => {
                    warn!("Stats sample failed for container {}: {}", id, e);
                    None
                }
                None => None,
            }
        } else {
            None
        };

        Ok(ContainerDetail { container, stats })
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "start_container"))]
    pub async fn start_container(&self, id: &str) -> Result<(), DockerError> {
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await?;
        tracing::info!("Started container {}", id);
        Ok(())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "stop_container"))]
    pub async fn stop_container(&self, id: &str) -> Result<(), DockerError> {
        let options = StopContainerOptionsBuilder::default()
            .t(STOP_GRACE_SECS)
            .build();
        self.docker.stop_container(id, Some(options)).await?;
        tracing::info!("Stopped container {}", id);
        Ok(())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "restart_container"))]
    pub async fn restart_container(&self, id: &str) -> Result<(), DockerError> {
        let options = RestartContainerOptionsBuilder::default()
            .t(STOP_GRACE_SECS)
            .build();
        self.docker.restart_container(id, Some(options)).await?;
        tracing::info!("Restarted container {}", id);
        Ok(())
    }

    /// Last `tail` lines of stdout and stderr, with timestamps, as one text blob.
    #[instrument(skip(self), fields(repo = "docker", operation = "container_logs"))]
    pub async fn container_logs(&self, id: &str, tail: Option<&str>) -> Result<String, DockerError> {
        let options = LogsOptionsBuilder::default()
            .stdout(true)
            .stderr(true)
            .timestamps(true)
            .tail(tail.filter(|t| !t.is_empty()).unwrap_or(DEFAULT_LOG_TAIL))
            .build();

        let mut stream = self.docker.logs(id, Some(options));
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk?.into_bytes());
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "list_images"))]
    pub async fn list_images(&self) -> Result<Vec<ImageSummary>, DockerError> {
        let options = ListImagesOptions {
            all: true,
            ..Default::default()
        };
        Ok(self.docker.list_images(Some(options)).await?)
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "list_networks"))]
    pub async fn list_networks(&self) -> Result<Vec<Network>, DockerError> {
        Ok(self.docker.list_networks(None::<ListNetworksOptions>).await?)
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "list_volumes"))]
    pub async fn list_volumes(&self) -> Result<VolumeListResponse, DockerError> {
        Ok(self.docker.list_volumes(None::<ListVolumesOptions>).await?)
    }

    /// Aggregate counts from four independent list calls (no transactional snapshot).
    #[instrument(skip(self), fields(repo = "docker", operation = "system_stats"))]
    pub async fn system_stats(&self) -> Result<DockerSystemStats, DockerError> {
        let containers = self.list_containers().await?;
        let images = self.list_images().await?;
        let networks = self.list_networks().await?;
        let volumes = self.list_volumes().await?;
        Ok(summarize(&containers, &images, &networks, &volumes))
    }

    /// Opens one daemon event subscription. `since` / `until` are forwarded only when they
    /// parse as integer timestamps. Errors arrive in order with events on the same stream.
    pub fn events(
        &self,
        since: Option<String>,
        until: Option<String>,
    ) -> impl Stream<Item = Result<EventMessage, DockerError>> + Send + '_ {
        let mut builder = EventsOptionsBuilder::default();
        if let Some(since) = since.as_deref().and_then(parse_timestamp) {
            builder = builder.since(&since);
        }
        if let Some(until) = until.as_deref().and_then(parse_timestamp) {
            builder = builder.until(&until);
        }
        self.docker
            .events(Some(builder.build()))
            .map(|r| r.map_err(DockerError::from))
    }
}

/// Normalizes an integer unix timestamp; anything else is dropped.
pub(crate) fn parse_timestamp(raw: &str) -> Option<String> {
    raw.trim().parse::<i64>().ok().map(|t| t.to_string())
}

// Docker container models

use bollard::models::{ContainerInspectResponse, ContainerStatsResponse};
use serde::Serialize;

/// Inspect payload plus a one-shot stats sample when the container is running.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerDetail {
    pub container: ContainerInspectResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ContainerStatsResponse>,
}

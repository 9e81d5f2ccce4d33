// Docker aggregate models: /api/system/stats and /api/info

use bollard::models::{
    ContainerSummary, ImageSummary, Network, SystemDataUsageResponse, SystemInfo, SystemVersion,
    VolumeListResponse,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerCounts {
    pub running: u64,
    pub paused: u64,
    pub stopped: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageTotals {
    pub total: u64,
    /// Sum of image sizes in bytes.
    pub size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Total {
    pub total: u64,
}

/// Counts derived from four independent list calls; not a consistent point-in-time view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerSystemStats {
    pub containers: ContainerCounts,
    pub images: ImageTotals,
    pub networks: Total,
    pub volumes: Total,
}

/// Everything the daemon reports about itself, served by GET /api/info.
#[derive(Debug, Clone, Serialize)]
pub struct DockerInfo {
    pub system_info: SystemInfo,
    pub version: SystemVersion,
    pub containers: Vec<ContainerSummary>,
    pub images: Vec<ImageSummary>,
    pub networks: Vec<Network>,
    pub volumes: VolumeListResponse,
    pub disk_usage: SystemDataUsageResponse,
}

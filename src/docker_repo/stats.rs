// Reduce raw Docker list responses into DockerSystemStats.

use crate::models::{ContainerCounts, DockerSystemStats, ImageTotals, Total};
use bollard::models::{
    ContainerSummary, ContainerSummaryStateEnum, ImageSummary, Network, VolumeListResponse,
};

/// Partition containers by reported state and total up images, networks and volumes.
/// `running` and `paused` get their own bucket; every other state (or none) counts as stopped.
pub fn summarize(
    containers: &[ContainerSummary],
    images: &[ImageSummary],
    networks: &[Network],
    volumes: &VolumeListResponse,
) -> DockerSystemStats {
    let mut counts = ContainerCounts {
        total: containers.len() as u64,
        ..Default::default()
    };
    for c in containers {
        match c.state {
            Some(ContainerSummaryStateEnum::RUNNING) => counts.running += 1,
            Some(ContainerSummaryStateEnum::PAUSED) => counts.paused += 1,
            _ => counts.stopped += 1,
        }
    }

    DockerSystemStats {
        containers: counts,
        images: ImageTotals {
            total: images.len() as u64,
            size: images.iter().map(|i| i.size).sum(),
        },
        networks: Total {
            total: networks.len() as u64,
        },
        volumes: Total {
            total: volumes.volumes.as_ref().map_or(0, |v| v.len()) as u64,
        },
    }
}

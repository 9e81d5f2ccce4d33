// Domain models served by the gateway

mod container;
mod host;
mod service;
mod system;

pub use container::ContainerDetail;
pub use host::HostSnapshot;
pub use service::{ActionStatus, ServiceAction, ServiceDetail, ServiceRecord};
pub use system::{ContainerCounts, DockerInfo, DockerSystemStats, ImageTotals, Total};

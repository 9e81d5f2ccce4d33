// Host snapshot parsed from /proc

use serde::{Deserialize, Serialize};

/// Best-effort host metrics; any field whose source could not be read stays at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub uptime: String,
    pub uptime_seconds: u64,
    #[serde(rename = "load_avg_1")]
    pub load_average_1: f64,
    #[serde(rename = "load_avg_5")]
    pub load_average_5: f64,
    #[serde(rename = "load_avg_15")]
    pub load_average_15: f64,
    pub memory_total: u64,
    pub memory_used: u64,
    pub memory_available: u64,
    pub memory_used_percent: f64,
    pub network_connections: u64,
    pub cpu_cores: usize,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub kernel: String,
}

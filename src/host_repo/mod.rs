// Host metrics from /proc, best effort

mod procfile;

use crate::models::HostSnapshot;
use std::path::{Path, PathBuf};
use sysinfo::System;
use tracing::{debug, instrument};

pub struct HostRepo {
    proc_root: PathBuf,
}

impl Default for HostRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRepo {
    pub fn new() -> Self {
        Self::with_proc_root("/proc")
    }

    /// Reads proc files under `root` instead of /proc (tests use a temp dir).
    pub fn with_proc_root(root: impl AsRef<Path>) -> Self {
        Self {
            proc_root: root.as_ref().to_path_buf(),
        }
    }

    /// Re-reads uptime, loadavg, meminfo, net/tcp and the usable CPU count. A file that cannot
    /// be read leaves its fields at zero; the rest of the snapshot is still filled in.
    #[instrument(skip(self), fields(repo = "host", operation = "snapshot"))]
    pub async fn snapshot(&self) -> anyhow::Result<HostSnapshot> {
        let root = self.proc_root.clone();
        tokio::task::spawn_blocking(move || read_snapshot(&root))
            .await
            .map_err(|e| anyhow::anyhow!("host snapshot task join: {}", e))
    }
}

fn read_snapshot(root: &Path) -> HostSnapshot {
    let mut snap = HostSnapshot {
        cpu_cores: usable_cpus(),
        hostname: System::host_name().unwrap_or_default(),
        os: System::long_os_version().unwrap_or_default(),
        kernel: System::kernel_version().unwrap_or_default(),
        ..Default::default()
    };

    if let Some(secs) = read_proc(root, "uptime").and_then(|c| procfile::parse_uptime(&c)) {
        snap.uptime_seconds = secs;
        snap.uptime = procfile::format_uptime(secs);
    }

    if let Some(content) = read_proc(root, "loadavg") {
        let [one, five, fifteen] = procfile::parse_loadavg(&content);
        snap.load_average_1 = one;
        snap.load_average_5 = five;
        snap.load_average_15 = fifteen;
    }

    if let Some(content) = read_proc(root, "meminfo") {
        let (total, available) = procfile::parse_meminfo(&content);
        snap.memory_total = total;
        snap.memory_available = available;
        snap.memory_used = total.saturating_sub(available);
        if total > 0 {
            snap.memory_used_percent = snap.memory_used as f64 * 100.0 / total as f64;
        }
    }

    if let Some(content) = read_proc(root, "net/tcp") {
        snap.network_connections = procfile::count_tcp_connections(&content);
    }

    snap
}

/// CPUs this process may run on (affinity and cgroup quota aware); zero if unknown.
fn usable_cpus() -> usize {
    match std::thread::available_parallelism() {
        Ok(n) => n.get(),
        Err(e) => {
            debug!("usable CPU count unavailable: {}", e);
            0
        }
    }
}

fn read_proc(root: &Path, name: &str) -> Option<String> {
    let path = root.join(name);
    match std::fs::read_to_string(&path) {
        Ok(s) => Some(s),
        Err(e) => {
            debug!("skipping {}: {}", path.display(), e);
            None
        }
    }
}

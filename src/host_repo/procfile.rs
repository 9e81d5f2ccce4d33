// Parsers for the /proc pseudo-files behind the host snapshot.

/// First token of /proc/uptime, fractional seconds truncated.
pub(crate) fn parse_uptime(content: &str) -> Option<u64> {
    let first = content.trim().split(' ').next()?;
    let secs = first.parse::<f64>().ok()?;
    (secs >= 0.0).then_some(secs as u64)
}

/// 1, 5 and 15 minute load averages. A token that fails to parse stays at zero;
/// fewer than three tokens yields all zeros.
pub(crate) fn parse_loadavg(content: &str) -> [f64; 3] {
    let parts: Vec<&str> = content.trim().split(' ').collect();
    let mut out = [0.0; 3];
    if parts.len() >= 3 {
        for (slot, raw) in out.iter_mut().zip(&parts) {
            if let Ok(v) = raw.parse::<f64>() {
                *slot = v;
            }
        }
    }
    out
}

/// (MemTotal, MemAvailable) in bytes. /proc/meminfo reports kB.
pub(crate) fn parse_meminfo(content: &str) -> (u64, u64) {
    let mut total = 0;
    let mut available = 0;
    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            if let Some(kb) = kb_value(line) {
                total = kb.saturating_mul(1024);
            }
        } else if line.starts_with("MemAvailable:")
            && let Some(kb) = kb_value(line)
        {
            available = kb.saturating_mul(1024);
        }
    }
    (total, available)
}

fn kb_value(line: &str) -> Option<u64> {
    line.split_whitespace().nth(1)?.parse::<u64>().ok()
}

/// Rough count of TCP sockets: every line of /proc/net/tcp minus the header and the
/// empty string after the trailing newline.
pub(crate) fn count_tcp_connections(content: &str) -> u64 {
    content.split('\n').count().saturating_sub(2) as u64
}

/// "3d 4h 5m", "4h 5m" or "5m".
pub(crate) fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

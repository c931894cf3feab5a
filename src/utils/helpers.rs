/// Helper utilities for dockmon

use chrono::{DateTime, Local, Utc};

/// Format a byte count for display.
///
/// Divides by 1024 while the value reaches the threshold, labeling units
/// B, KB, MB, GB, TB. Scaling deliberately stops at TB even when the
/// remaining magnitude would divide further.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format a duration in seconds to a compact human-readable string
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Uptime string for a container started at the given unix timestamp.
/// Returns "N/A" when the start time is unknown or in the future.
pub fn format_uptime(started_at: Option<i64>, now: DateTime<Utc>) -> String {
    match started_at {
        Some(ts) if ts > 0 && ts <= now.timestamp() => {
            format_duration((now.timestamp() - ts) as u64)
        }
        _ => "N/A".to_string(),
    }
}

/// Format timestamp to human-readable string
pub fn format_timestamp(timestamp: i64) -> String {
    let dt = DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap());
    let local: DateTime<Local> = dt.into();
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Truncate string with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

/// Simplified container status derived from the daemon's state string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Running,
    Exited,
    Created,
    Paused,
    Other,
}

impl From<&str> for ContainerStatus {
    fn from(state: &str) -> Self {
        match state.to_lowercase().as_str() {
            "running" => ContainerStatus::Running,
            "exited" => ContainerStatus::Exited,
            "created" => ContainerStatus::Created,
            "paused" => ContainerStatus::Paused,
            _ => ContainerStatus::Other,
        }
    }
}

impl ContainerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ContainerStatus::Running)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContainerStatus::Running => "Running",
            ContainerStatus::Exited => "Exited",
            ContainerStatus::Created => "Created",
            ContainerStatus::Paused => "Paused",
            ContainerStatus::Other => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_boundaries() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_bytes_stops_at_terabytes() {
        // 5 PiB stays expressed in TB
        let five_pib = 5 * 1024u64.pow(5);
        assert_eq!(format_bytes(five_pib), "5120.00 TB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30), "30s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3661), "1h 1m");
        assert_eq!(format_duration(86400), "1d 0h");
    }

    #[test]
    fn test_format_uptime() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(format_uptime(Some(1_700_000_000 - 90), now), "1m 30s");
        assert_eq!(format_uptime(None, now), "N/A");
        // Start time in the future is treated as unknown
        assert_eq!(format_uptime(Some(1_700_000_100), now), "N/A");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a-much-longer-name", 10), "a-much-...");
    }

    #[test]
    fn test_container_status_parsing() {
        assert_eq!(ContainerStatus::from("running"), ContainerStatus::Running);
        assert_eq!(ContainerStatus::from("Exited"), ContainerStatus::Exited);
        assert_eq!(ContainerStatus::from("created"), ContainerStatus::Created);
        assert_eq!(ContainerStatus::from("paused"), ContainerStatus::Paused);
        assert_eq!(ContainerStatus::from("restarting"), ContainerStatus::Other);
        assert_eq!(ContainerStatus::from("dead"), ContainerStatus::Other);
        assert!(ContainerStatus::Running.is_running());
        assert!(!ContainerStatus::Exited.is_running());
    }
}

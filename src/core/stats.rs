/// Stat normalization
///
/// Converts one raw stats snapshot (the daemon's cumulative counters for the
/// current and previous read) into display-ready percentages and byte counts.
/// Pure functions, no I/O; every missing-field fallback for malformed stats
/// payloads lives here rather than at the call sites.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Cumulative rx/tx byte counters for one network interface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Structured capture of the daemon's stats response at one instant.
///
/// The daemon's one-shot stats call already carries the previous read
/// alongside the current one (`precpu_*`), which is what makes rate
/// derivation possible from a single fetch. Fields the daemon may omit
/// depending on cgroup version or container state are optional here.
#[derive(Debug, Clone)]
pub struct RawStatsSnapshot {
    pub cpu_total: u64,
    pub precpu_total: u64,
    /// Per-core usage array; absent under cgroup v2
    pub percpu_usage: Option<Vec<u64>>,
    pub system_cpu: Option<u64>,
    pub presystem_cpu: Option<u64>,
    pub online_cpus: Option<u64>,
    pub memory_usage: Option<u64>,
    pub memory_limit: Option<u64>,
    pub networks: HashMap<String, InterfaceCounters>,
    pub read_at: DateTime<Utc>,
}

/// One normalized utilization sample for a container
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSample {
    pub container_id: String,
    /// 0-100 per core; can exceed 100 on multi-core containers
    pub cpu_percent: f64,
    pub mem_usage_bytes: u64,
    pub mem_limit_bytes: u64,
    pub mem_percent: f64,
    pub networks: HashMap<String, InterfaceCounters>,
    pub read_at: DateTime<Utc>,
}

impl NormalizedSample {
    /// Total rx/tx bytes summed across interfaces
    pub fn network_totals(&self) -> (u64, u64) {
        self.networks.values().fold((0, 0), |(rx, tx), counters| {
            (rx + counters.rx_bytes, tx + counters.tx_bytes)
        })
    }
}

/// Number of CPUs a snapshot reflects: per-core array length when present,
/// else the daemon-reported online count, else 1.
fn resolve_cpu_count(raw: &RawStatsSnapshot) -> u64 {
    raw.percpu_usage
        .as_ref()
        .filter(|cores| !cores.is_empty())
        .map(|cores| cores.len() as u64)
        .or(raw.online_cpus)
        .unwrap_or(1)
}

/// Derive a normalized sample from raw cumulative counters.
///
/// CPU percent is 0.0 unless both the cpu and system deltas are strictly
/// positive. This covers the first read after container start (zeroed
/// previous counters) as well as counter resets, and rules out negative
/// percentages and division by zero. Memory percent degrades to 0.0 when
/// the limit is missing or zero (unlimited containers).
pub fn normalize(container_id: &str, raw: &RawStatsSnapshot) -> NormalizedSample {
    let cpu_count = resolve_cpu_count(raw);

    let cpu_delta = raw.cpu_total as f64 - raw.precpu_total as f64;
    let system_delta =
        raw.system_cpu.unwrap_or(0) as f64 - raw.presystem_cpu.unwrap_or(0) as f64;

    let cpu_percent = if cpu_delta > 0.0 && system_delta > 0.0 {
        (cpu_delta / system_delta) * cpu_count as f64 * 100.0
    } else {
        0.0
    };

    let mem_usage_bytes = raw.memory_usage.unwrap_or(0);
    let mem_limit_bytes = raw.memory_limit.unwrap_or(0);
    let mem_percent = if mem_limit_bytes > 0 {
        (mem_usage_bytes as f64 / mem_limit_bytes as f64) * 100.0
    } else {
        0.0
    };

    NormalizedSample {
        container_id: container_id.to_string(),
        cpu_percent,
        mem_usage_bytes,
        mem_limit_bytes,
        mem_percent,
        networks: raw.networks.clone(),
        read_at: raw.read_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> RawStatsSnapshot {
        RawStatsSnapshot {
            cpu_total: 400,
            precpu_total: 200,
            percpu_usage: None,
            system_cpu: Some(2000),
            presystem_cpu: Some(1000),
            online_cpus: Some(4),
            memory_usage: Some(512 * 1024 * 1024),
            memory_limit: Some(2048 * 1024 * 1024),
            networks: HashMap::new(),
            read_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_cpu_percent_formula() {
        let sample = normalize("abc123", &snapshot());
        // (200 / 1000) * 4 cpus * 100
        assert_eq!(sample.cpu_percent, 80.0);
    }

    #[test]
    fn test_cpu_percent_deterministic() {
        let raw = snapshot();
        assert_eq!(normalize("a", &raw), normalize("a", &raw));
    }

    #[test]
    fn test_cpu_percent_can_exceed_100() {
        let mut raw = snapshot();
        raw.cpu_total = 1000;
        raw.precpu_total = 0;
        let sample = normalize("abc123", &raw);
        assert_eq!(sample.cpu_percent, 400.0);
    }

    #[test]
    fn test_zero_cpu_delta_gives_zero() {
        let mut raw = snapshot();
        raw.cpu_total = raw.precpu_total;
        assert_eq!(normalize("abc123", &raw).cpu_percent, 0.0);
    }

    #[test]
    fn test_negative_deltas_give_zero_not_negative() {
        // Counter reset after daemon restart
        let mut raw = snapshot();
        raw.cpu_total = 100;
        raw.precpu_total = 200;
        assert_eq!(normalize("abc123", &raw).cpu_percent, 0.0);

        let mut raw = snapshot();
        raw.system_cpu = Some(500);
        raw.presystem_cpu = Some(1000);
        assert_eq!(normalize("abc123", &raw).cpu_percent, 0.0);
    }

    #[test]
    fn test_missing_system_cpu_gives_zero() {
        // First sample after container start has no previous counters
        let mut raw = snapshot();
        raw.system_cpu = None;
        raw.presystem_cpu = None;
        assert_eq!(normalize("abc123", &raw).cpu_percent, 0.0);
    }

    #[test]
    fn test_cpu_count_prefers_percpu_array() {
        let mut raw = snapshot();
        raw.percpu_usage = Some(vec![100, 100]);
        raw.online_cpus = Some(8);
        // (200 / 1000) * 2 cpus * 100
        assert_eq!(normalize("abc123", &raw).cpu_percent, 40.0);
    }

    #[test]
    fn test_cpu_count_ignores_empty_percpu_array() {
        let mut raw = snapshot();
        raw.percpu_usage = Some(vec![]);
        raw.online_cpus = Some(4);
        assert_eq!(normalize("abc123", &raw).cpu_percent, 80.0);
    }

    #[test]
    fn test_cpu_count_defaults_to_one() {
        let mut raw = snapshot();
        raw.percpu_usage = None;
        raw.online_cpus = None;
        // (200 / 1000) * 1 cpu * 100
        assert_eq!(normalize("abc123", &raw).cpu_percent, 20.0);
    }

    #[test]
    fn test_memory_percent() {
        let sample = normalize("abc123", &snapshot());
        assert_eq!(sample.mem_percent, 25.0);
        assert_eq!(sample.mem_usage_bytes, 512 * 1024 * 1024);
        assert_eq!(sample.mem_limit_bytes, 2048 * 1024 * 1024);
    }

    #[test]
    fn test_memory_percent_zero_limit() {
        let mut raw = snapshot();
        raw.memory_limit = Some(0);
        assert_eq!(normalize("abc123", &raw).mem_percent, 0.0);

        raw.memory_limit = None;
        let sample = normalize("abc123", &raw);
        assert_eq!(sample.mem_percent, 0.0);
        assert!(sample.mem_percent.is_finite());
    }

    #[test]
    fn test_network_totals() {
        let mut raw = snapshot();
        raw.networks.insert(
            "eth0".to_string(),
            InterfaceCounters { rx_bytes: 100, tx_bytes: 50 },
        );
        raw.networks.insert(
            "eth1".to_string(),
            InterfaceCounters { rx_bytes: 10, tx_bytes: 5 },
        );
        let sample = normalize("abc123", &raw);
        assert_eq!(sample.network_totals(), (110, 55));
    }

    #[test]
    fn test_missing_networks_degrade_to_empty() {
        let sample = normalize("abc123", &snapshot());
        assert!(sample.networks.is_empty());
        assert_eq!(sample.network_totals(), (0, 0));
    }
}

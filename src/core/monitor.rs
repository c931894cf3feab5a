/// Refresh orchestration
///
/// Drives the poll -> normalize -> collect -> store cycle and publishes an
/// immutable view snapshot for the rendering layer. Exactly one cycle runs
/// at a time per monitor; a force refresh that lands mid-cycle waits for the
/// in-flight cycle instead of running alongside it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::core::collector::{collect_stats, StatsSource};
use crate::core::docker::{ClientError, ContainerInfo, DockerClient};
use crate::core::groups::{group_by_project, summarize, ProjectGroup, Summary};
use crate::core::history::HistoryStore;
use crate::core::stats::NormalizedSample;
use crate::utils::format_uptime;

/// Listing capability on top of per-container stats fetching.
#[async_trait]
pub trait RuntimeClient: StatsSource {
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerInfo>, ClientError>;
}

#[async_trait]
impl RuntimeClient for DockerClient {
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerInfo>, ClientError> {
        DockerClient::list_containers(self, include_stopped).await
    }
}

/// Where the orchestrator currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Polling,
    Updating,
}

impl CyclePhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => CyclePhase::Polling,
            2 => CyclePhase::Updating,
            _ => CyclePhase::Idle,
        }
    }
}

/// One container with its per-cycle display fields
#[derive(Debug, Clone)]
pub struct ContainerRow {
    pub info: ContainerInfo,
    pub uptime: String,
    /// Latest sample; None for stopped containers and failed fetches
    pub sample: Option<NormalizedSample>,
}

/// Immutable per-cycle publication consumed by the rendering layer.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub containers: Vec<ContainerRow>,
    pub groups: Vec<ProjectGroup>,
    pub summary: Summary,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Listing failure from the most recent cycle, if any. The rest of the
    /// view then still reflects the last successful cycle.
    pub last_error: Option<String>,
}

pub struct Monitor<C: RuntimeClient> {
    client: C,
    history: Arc<HistoryStore>,
    view: RwLock<DashboardView>,
    cycle_guard: Mutex<()>,
    phase: AtomicU8,
    auto_refresh: AtomicBool,
    max_workers: usize,
}

impl<C: RuntimeClient> Monitor<C> {
    pub fn new(client: C, history: Arc<HistoryStore>, max_workers: usize) -> Self {
        Self {
            client,
            history,
            view: RwLock::new(DashboardView::default()),
            cycle_guard: Mutex::new(()),
            phase: AtomicU8::new(0),
            auto_refresh: AtomicBool::new(true),
            max_workers,
        }
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn phase(&self) -> CyclePhase {
        CyclePhase::from_u8(self.phase.load(Ordering::Relaxed))
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh.load(Ordering::Relaxed)
    }

    pub fn set_auto_refresh(&self, enabled: bool) {
        self.auto_refresh.store(enabled, Ordering::Relaxed);
    }

    pub fn toggle_auto_refresh(&self) -> bool {
        !self.auto_refresh.fetch_xor(true, Ordering::Relaxed)
    }

    /// Latest published view.
    pub async fn view(&self) -> DashboardView {
        self.view.read().await.clone()
    }

    /// Drop all recorded history.
    pub fn clear_history(&self) {
        self.history.clear();
    }

    /// Change the history window; existing series shrink immediately.
    pub fn set_window(&self, window: usize) {
        self.history.set_window(window);
    }

    /// Run one full refresh cycle and publish the resulting view.
    ///
    /// Serialized on the cycle guard: callers racing an in-flight cycle
    /// block here until it finishes, then run their own.
    pub async fn refresh(&self) -> DashboardView {
        let _guard = self.cycle_guard.lock().await;

        self.phase.store(1, Ordering::Relaxed); // Polling
        let result = self.client.list_containers(true).await;

        let view = match result {
            Ok(containers) => {
                let running: Vec<ContainerInfo> = containers
                    .iter()
                    .filter(|c| c.status.is_running())
                    .cloned()
                    .collect();

                let samples = collect_stats(&self.client, &running, self.max_workers).await;

                self.phase.store(2, Ordering::Relaxed); // Updating
                for sample in samples.values() {
                    self.history.append(sample.clone());
                }

                let now = Utc::now();
                let rows = containers
                    .iter()
                    .map(|info| ContainerRow {
                        uptime: if info.status.is_running() {
                            format_uptime(info.created, now)
                        } else {
                            "N/A".to_string()
                        },
                        sample: samples.get(&info.id).cloned(),
                        info: info.clone(),
                    })
                    .collect();

                DashboardView {
                    containers: rows,
                    groups: group_by_project(&containers),
                    summary: summarize(&containers),
                    refreshed_at: Some(now),
                    last_error: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "container listing failed, keeping previous view");
                let mut view = self.view.read().await.clone();
                view.last_error = Some(err.to_string());
                view
            }
        };

        *self.view.write().await = view.clone();
        self.phase.store(0, Ordering::Relaxed); // Idle

        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stats::RawStatsSnapshot;
    use crate::utils::{ContainerStatus, UNKNOWN_PROJECT};
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn container(id: &str, project: &str, status: ContainerStatus) -> ContainerInfo {
        ContainerInfo {
            id: id.to_string(),
            name: format!("svc-{}", id),
            image: "nginx:1.25".to_string(),
            status,
            status_text: status.label().to_string(),
            project: project.to_string(),
            service: format!("svc-{}", id),
            created: Some(1_700_000_000),
        }
    }

    fn snapshot() -> RawStatsSnapshot {
        RawStatsSnapshot {
            cpu_total: 400,
            precpu_total: 200,
            percpu_usage: None,
            system_cpu: Some(2000),
            presystem_cpu: Some(1000),
            online_cpus: Some(1),
            memory_usage: Some(1024),
            memory_limit: Some(4096),
            networks: HashMap::new(),
            read_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    /// Stub runtime with a fixed container list; tracks listing concurrency.
    struct StubRuntime {
        containers: Vec<ContainerInfo>,
        fail_listing: bool,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl StubRuntime {
        fn new(containers: Vec<ContainerInfo>) -> Self {
            Self {
                containers,
                fail_listing: false,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StatsSource for StubRuntime {
        async fn fetch_stats(&self, id: &str) -> Result<RawStatsSnapshot, ClientError> {
            if id.starts_with("bad") {
                return Err(ClientError::StatsUnavailable {
                    id: id.to_string(),
                    reason: "not running".to_string(),
                });
            }
            Ok(snapshot())
        }
    }

    #[async_trait]
    impl RuntimeClient for StubRuntime {
        async fn list_containers(
            &self,
            _include_stopped: bool,
        ) -> Result<Vec<ContainerInfo>, ClientError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_listing {
                return Err(ClientError::StatsUnavailable {
                    id: "-".to_string(),
                    reason: "listing failed".to_string(),
                });
            }
            Ok(self.containers.clone())
        }
    }

    #[tokio::test]
    async fn test_cycle_end_to_end() {
        let runtime = StubRuntime::new(vec![
            container("aaa", "web", ContainerStatus::Running),
            container("bbb", "web", ContainerStatus::Exited),
        ]);
        let monitor = Monitor::new(runtime, Arc::new(HistoryStore::new(30)), 10);

        let view = monitor.refresh().await;

        // Only the running container was collected and recorded
        assert_eq!(monitor.history().get("aaa").len(), 1);
        assert!(monitor.history().get("bbb").is_empty());

        // The project group still holds both containers
        assert_eq!(view.groups.len(), 1);
        assert_eq!(view.groups[0].project, "web");
        assert_eq!(view.groups[0].containers.len(), 2);

        assert_eq!(view.summary.total, 2);
        assert_eq!(view.summary.running, 1);
        assert_eq!(view.summary.active_projects, 1);

        let running_row = view.containers.iter().find(|r| r.info.id == "aaa").unwrap();
        assert!(running_row.sample.is_some());
        let stopped_row = view.containers.iter().find(|r| r.info.id == "bbb").unwrap();
        assert!(stopped_row.sample.is_none());
        assert_eq!(stopped_row.uptime, "N/A");

        assert!(view.refreshed_at.is_some());
        assert!(view.last_error.is_none());
        assert_eq!(monitor.phase(), CyclePhase::Idle);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_history_gap() {
        let runtime = StubRuntime::new(vec![
            container("aaa", "web", ContainerStatus::Running),
            container("bad", "web", ContainerStatus::Running),
        ]);
        let monitor = Monitor::new(runtime, Arc::new(HistoryStore::new(30)), 10);

        monitor.refresh().await;
        monitor.refresh().await;

        // Two cycles recorded for the healthy container, none for the bad one
        assert_eq!(monitor.history().get("aaa").len(), 2);
        assert!(monitor.history().get("bad").is_empty());
    }

    #[tokio::test]
    async fn test_listing_failure_keeps_previous_view() {
        let runtime = StubRuntime::new(vec![container(
            "aaa",
            "web",
            ContainerStatus::Running,
        )]);

        let history = Arc::new(HistoryStore::new(30));
        let monitor = Monitor::new(runtime, Arc::clone(&history), 10);
        let good = monitor.refresh().await;
        assert_eq!(good.summary.total, 1);

        // Rebuild the monitor with a failing runtime but the same state
        let mut failing = StubRuntime::new(vec![]);
        failing.fail_listing = true;
        let monitor2 = Monitor::new(failing, history, 10);
        *monitor2.view.write().await = good.clone();

        let after = monitor2.refresh().await;
        assert_eq!(after.summary.total, 1);
        assert_eq!(after.containers.len(), 1);
        assert!(after.last_error.is_some());
    }

    #[tokio::test]
    async fn test_refresh_is_single_flight() {
        let runtime = StubRuntime::new(vec![container(
            "aaa",
            "web",
            ContainerStatus::Running,
        )]);
        let monitor = Arc::new(Monitor::new(runtime, Arc::new(HistoryStore::new(30)), 10));

        let a = Arc::clone(&monitor);
        let b = Arc::clone(&monitor);
        let c = Arc::clone(&monitor);
        tokio::join!(
            async move { a.refresh().await },
            async move { b.refresh().await },
            async move { c.refresh().await },
        );

        // The listings never overlapped
        assert_eq!(monitor.client.max_in_flight.load(Ordering::SeqCst), 1);
        // All three cycles appended
        assert_eq!(monitor.history().get("aaa").len(), 3);
    }

    #[tokio::test]
    async fn test_auto_refresh_toggle() {
        let runtime = StubRuntime::new(vec![]);
        let monitor = Monitor::new(runtime, Arc::new(HistoryStore::new(30)), 10);

        assert!(monitor.auto_refresh());
        assert!(!monitor.toggle_auto_refresh());
        assert!(!monitor.auto_refresh());
        monitor.set_auto_refresh(true);
        assert!(monitor.auto_refresh());
    }

    #[tokio::test]
    async fn test_clear_and_window_pass_through() {
        let runtime = StubRuntime::new(vec![container(
            "aaa",
            "web",
            ContainerStatus::Running,
        )]);
        let monitor = Monitor::new(runtime, Arc::new(HistoryStore::new(30)), 10);

        monitor.refresh().await;
        assert_eq!(monitor.history().get("aaa").len(), 1);

        monitor.clear_history();
        assert!(monitor.history().get("aaa").is_empty());

        monitor.set_window(15);
        assert_eq!(monitor.history().window(), 15);
    }

    #[test]
    fn test_unknown_project_constant_matches_groups() {
        // The default label the adapter assigns is the one grouping sorts last
        assert_eq!(UNKNOWN_PROJECT, "Unknown");
    }
}

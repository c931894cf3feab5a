/// Docker daemon integration
///
/// Wraps the bollard client behind the small surface the monitor needs:
/// list containers, one-shot stats snapshot, restart, logs.

use bollard::container::{
    ListContainersOptions, LogsOptions, RestartContainerOptions, Stats, StatsOptions,
};
use bollard::models::ContainerSummary;
use bollard::Docker;
use futures::StreamExt;
use thiserror::Error;

use crate::core::stats::{InterfaceCounters, RawStatsSnapshot};
use crate::utils::{ContainerStatus, COMPOSE_PROJECT_LABEL, COMPOSE_SERVICE_LABEL, UNKNOWN_PROJECT};

/// Failure kinds at the daemon boundary.
///
/// `RuntimeUnavailable` is fatal for the session; the per-container kinds
/// are recoverable and make a container absent from one cycle's results.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot reach the Docker daemon (is it running?): {source}")]
    RuntimeUnavailable {
        #[source]
        source: bollard::errors::Error,
    },

    #[error("container {id} no longer exists")]
    ContainerGone { id: String },

    #[error("stats unavailable for container {id}: {reason}")]
    StatsUnavailable { id: String, reason: String },

    #[error("docker api error: {0}")]
    Api(#[from] bollard::errors::Error),
}

/// One container as listed by the daemon, with compose labels resolved
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    /// Stable short id (first 12 hex chars)
    pub id: String,
    pub name: String,
    pub image: String,
    pub status: ContainerStatus,
    /// Raw status line, e.g. "Up 2 hours"
    pub status_text: String,
    /// Compose project label; "Unknown" when the container carries none
    pub project: String,
    /// Compose service label; falls back to the container name
    pub service: String,
    pub created: Option<i64>,
}

#[derive(Clone)]
pub struct DockerClient {
    docker: Docker,
}

impl DockerClient {
    /// Connect to the local daemon and verify it responds.
    pub async fn connect() -> Result<Self, ClientError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|source| ClientError::RuntimeUnavailable { source })?;

        docker
            .ping()
            .await
            .map_err(|source| ClientError::RuntimeUnavailable { source })?;

        Ok(Self { docker })
    }

    /// List containers, optionally including stopped ones.
    pub async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerInfo>, ClientError> {
        let options = Some(ListContainersOptions::<String> {
            all: include_stopped,
            ..Default::default()
        });

        let containers = self.docker.list_containers(options).await?;

        Ok(containers
            .into_iter()
            .map(container_summary_to_info)
            .collect())
    }

    /// Fetch one synchronous stats sample for a container.
    ///
    /// The daemon differences two internal readings to produce the
    /// (current, previous) counter pair, so this call blocks for up to a
    /// second. Callers fan these out in parallel for that reason.
    pub async fn fetch_stats(&self, id: &str) -> Result<RawStatsSnapshot, ClientError> {
        let mut stream = self.docker.stats(
            id,
            Some(StatsOptions {
                stream: false,
                one_shot: false,
            }),
        );

        match stream.next().await {
            Some(Ok(stats)) => Ok(snapshot_from_stats(stats)),
            Some(Err(err)) => Err(map_container_error(id, err)),
            None => Err(ClientError::StatsUnavailable {
                id: id.to_string(),
                reason: "daemon returned no stats frame".to_string(),
            }),
        }
    }

    /// Restart a container. Surfaced as an operation-level error, never retried.
    pub async fn restart(&self, id: &str) -> Result<(), ClientError> {
        self.docker
            .restart_container(id, None::<RestartContainerOptions>)
            .await
            .map_err(|err| map_container_error(id, err))
    }

    /// Fetch the last `tail` log lines (stdout + stderr) for a container.
    pub async fn logs(&self, id: &str, tail: usize) -> Result<Vec<u8>, ClientError> {
        let options = Some(LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: tail.to_string(),
            ..Default::default()
        });

        let mut stream = self.docker.logs(id, options);
        let mut buffer = Vec::new();

        while let Some(frame) = stream.next().await {
            let output = frame.map_err(|err| map_container_error(id, err))?;
            buffer.extend_from_slice(&output.into_bytes());
        }

        Ok(buffer)
    }
}

/// Classify a per-container API failure: a 404 means the container is gone,
/// anything else leaves the stats for this cycle unavailable.
fn map_container_error(id: &str, err: bollard::errors::Error) -> ClientError {
    match err {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => ClientError::ContainerGone { id: id.to_string() },
        other => ClientError::StatsUnavailable {
            id: id.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Convert a ContainerSummary to ContainerInfo
fn container_summary_to_info(summary: ContainerSummary) -> ContainerInfo {
    let id = summary
        .id
        .map(|id| id.chars().take(12).collect())
        .unwrap_or_default();

    let name = summary
        .names
        .as_ref()
        .and_then(|names| names.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let status = summary
        .state
        .as_deref()
        .map(ContainerStatus::from)
        .unwrap_or(ContainerStatus::Other);

    let status_text = summary.status.unwrap_or_else(|| "unknown".to_string());

    let project = summary
        .labels
        .as_ref()
        .and_then(|labels| labels.get(COMPOSE_PROJECT_LABEL))
        .cloned()
        .unwrap_or_else(|| UNKNOWN_PROJECT.to_string());

    let service = summary
        .labels
        .as_ref()
        .and_then(|labels| labels.get(COMPOSE_SERVICE_LABEL))
        .cloned()
        .unwrap_or_else(|| name.clone());

    ContainerInfo {
        id,
        name,
        image: summary.image.unwrap_or_else(|| "unknown".to_string()),
        status,
        status_text,
        project,
        service,
        created: summary.created,
    }
}

/// Lift a bollard stats payload into the structured snapshot the
/// normalizer consumes, preserving optional fields as-is.
fn snapshot_from_stats(stats: Stats) -> RawStatsSnapshot {
    let networks = stats
        .networks
        .map(|nets| {
            nets.into_iter()
                .map(|(name, net)| {
                    (
                        name,
                        InterfaceCounters {
                            rx_bytes: net.rx_bytes,
                            tx_bytes: net.tx_bytes,
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    RawStatsSnapshot {
        cpu_total: stats.cpu_stats.cpu_usage.total_usage,
        precpu_total: stats.precpu_stats.cpu_usage.total_usage,
        percpu_usage: stats.cpu_stats.cpu_usage.percpu_usage,
        system_cpu: stats.cpu_stats.system_cpu_usage,
        presystem_cpu: stats.precpu_stats.system_cpu_usage,
        online_cpus: stats.cpu_stats.online_cpus,
        memory_usage: stats.memory_stats.usage,
        memory_limit: stats.memory_stats.limit,
        networks,
        read_at: stats.read,
    }
}

/// Parallel stats collection
///
/// Fans out one-shot stats fetches over the running container set with a
/// bounded worker pool. Each fetch blocks ~1s inside the daemon, so a
/// sequential sweep would scale cycle latency linearly with fleet size.

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::core::docker::{ClientError, ContainerInfo, DockerClient};
use crate::core::stats::{normalize, NormalizedSample, RawStatsSnapshot};
use crate::utils::STATS_FETCH_TIMEOUT_SECS;

/// Anything that can produce a raw stats snapshot for a container id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_stats(&self, id: &str) -> Result<RawStatsSnapshot, ClientError>;
}

#[async_trait]
impl StatsSource for DockerClient {
    async fn fetch_stats(&self, id: &str) -> Result<RawStatsSnapshot, ClientError> {
        DockerClient::fetch_stats(self, id).await
    }
}

/// Fetch and normalize stats for every container, at most `max_workers` at a
/// time. Per-container failures are dropped from the result map; they never
/// abort or delay the rest of the batch. Returns once every dispatched fetch
/// has completed, failed, or hit its deadline.
pub async fn collect_stats<S: StatsSource>(
    source: &S,
    containers: &[ContainerInfo],
    max_workers: usize,
) -> HashMap<String, NormalizedSample> {
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let deadline = Duration::from_secs(STATS_FETCH_TIMEOUT_SECS);

    let fetches = containers.iter().map(|container| {
        let semaphore = Arc::clone(&semaphore);
        let id = container.id.clone();
        async move {
            // Closing the semaphore is not part of this flow; acquire only
            // fails on a closed semaphore.
            let _permit = semaphore.acquire().await.ok()?;

            match tokio::time::timeout(deadline, source.fetch_stats(&id)).await {
                Ok(Ok(raw)) => Some(normalize(&id, &raw)),
                Ok(Err(err)) => {
                    debug!(container = %id, error = %err, "skipping container this cycle");
                    None
                }
                Err(_) => {
                    debug!(container = %id, "stats fetch timed out");
                    None
                }
            }
        }
    });

    join_all(fetches)
        .await
        .into_iter()
        .flatten()
        .map(|sample| (sample.container_id.clone(), sample))
        .collect()
}

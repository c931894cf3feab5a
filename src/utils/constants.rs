/// Shared constants for dockmon

// Compose labels used to group containers into projects/instances
pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";
pub const COMPOSE_SERVICE_LABEL: &str = "com.docker.compose.service";

/// Group label for containers without a compose project
pub const UNKNOWN_PROJECT: &str = "Unknown";

// Refresh interval (seconds)
pub const DEFAULT_REFRESH_SECS: u64 = 5;
pub const MIN_REFRESH_SECS: u64 = 2;
pub const MAX_REFRESH_SECS: u64 = 60;

// Rolling history window (samples per container)
pub const DEFAULT_HISTORY_WINDOW: usize = 30;
pub const MIN_HISTORY_WINDOW: usize = 10;
pub const MAX_HISTORY_WINDOW: usize = 100;

// Concurrent stats fetches per refresh cycle
pub const DEFAULT_MAX_WORKERS: usize = 10;
pub const MAX_WORKERS_LIMIT: usize = 64;

/// Deadline for a single one-shot stats fetch. The daemon differences two
/// readings internally, so a healthy fetch still takes up to ~1s.
pub const STATS_FETCH_TIMEOUT_SECS: u64 = 5;

/// Default number of log lines fetched for the logs view
pub const DEFAULT_LOG_TAIL: usize = 100;

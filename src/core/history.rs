/// Rolling per-container sample history
///
/// The only mutable state that survives across refresh cycles. One writer
/// (the orchestrator) appends while the rendering layer reads concurrently,
/// so every access takes a short-lived lock and readers get owned snapshots.

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock};

use crate::core::stats::NormalizedSample;
use crate::utils::{MAX_HISTORY_WINDOW, MIN_HISTORY_WINDOW};

struct Inner {
    series: HashMap<String, VecDeque<NormalizedSample>>,
    window: usize,
}

/// Bounded history buffer keyed by container id, oldest sample first.
pub struct HistoryStore {
    inner: RwLock<Inner>,
}

impl HistoryStore {
    /// Create a store with the given window length, clamped to 10-100.
    pub fn new(window: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                series: HashMap::new(),
                window: window.clamp(MIN_HISTORY_WINDOW, MAX_HISTORY_WINDOW),
            }),
        }
    }

    /// Append a sample to its container's series, trimming the front so the
    /// series never exceeds the window.
    pub fn append(&self, sample: NormalizedSample) {
        let mut inner = self.write();
        let window = inner.window;
        let series = inner
            .series
            .entry(sample.container_id.clone())
            .or_default();

        series.push_back(sample);
        while series.len() > window {
            series.pop_front();
        }
    }

    /// Snapshot of one container's series, oldest first. Empty for ids
    /// never seen.
    pub fn get(&self, id: &str) -> Vec<NormalizedSample> {
        self.read()
            .series
            .get(id)
            .map(|series| series.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// CPU percent series for sparkline rendering
    pub fn cpu_series(&self, id: &str) -> Vec<f64> {
        self.read()
            .series
            .get(id)
            .map(|series| series.iter().map(|s| s.cpu_percent).collect())
            .unwrap_or_default()
    }

    /// Memory percent series for sparkline rendering
    pub fn mem_series(&self, id: &str) -> Vec<f64> {
        self.read()
            .series
            .get(id)
            .map(|series| series.iter().map(|s| s.mem_percent).collect())
            .unwrap_or_default()
    }

    /// Drop every series.
    pub fn clear(&self) {
        self.write().series.clear();
    }

    /// Change the window length (clamped to 10-100). Existing series are
    /// trimmed to the new length immediately, keeping the newest samples.
    pub fn set_window(&self, window: usize) {
        let mut inner = self.write();
        inner.window = window.clamp(MIN_HISTORY_WINDOW, MAX_HISTORY_WINDOW);
        let window = inner.window;
        for series in inner.series.values_mut() {
            while series.len() > window {
                series.pop_front();
            }
        }
    }

    /// Current window length
    pub fn window(&self) -> usize {
        self.read().window
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// Metrics hooks for the comparison engine.
//
// Callers install a global `EngineMetrics` implementation via
// [`set_engine_metrics`], then [`run_with_sources`](crate::run_with_sources)
// will report per-pair scores and per-run latency. This keeps instrumentation
// decoupled from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Metrics observer for comparison runs.
pub trait EngineMetrics: Send + Sync {
    /// Record one scored pair.
    ///
    /// `index` is the pair's 0-based position in the run and `score` is the
    /// similarity assigned to it.
    fn record_pair(&self, index: usize, score: f64);

    /// Record the outcome of a completed run.
    ///
    /// `target_name` is the display name of the target document, `latency` is
    /// the wall-clock duration of the whole run, and `pair_count` is the
    /// number of pair results written.
    fn record_run(&self, target_name: &str, latency: Duration, pair_count: usize);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn EngineMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn EngineMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn EngineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global engine metrics recorder.
///
/// This is typically called once during startup so every run in the process
/// reports to the same metrics backend.
pub fn set_engine_metrics(recorder: Option<Arc<dyn EngineMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().expect("engine metrics lock poisoned");
    *guard = recorder;
}

//! Background readiness monitor

use super::alerts::AlertEmitter;
use super::metrics::ReadinessMetrics;
use super::transitions::TransitionDetector;
use crate::core::cache::ReadinessCache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Refreshes readiness on a fixed interval and emits health transitions.
///
/// Each run is awaited before the next tick is taken, so runs never overlap;
/// ticks missed while a run is slow are skipped rather than bunched up.
pub struct BackgroundMonitor {
    cache: Arc<ReadinessCache>,
    emitter: Arc<dyn AlertEmitter>,
    metrics: Option<Arc<ReadinessMetrics>>,
    interval: Duration,
}

impl std::fmt::Debug for BackgroundMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundMonitor")
            .field("interval", &self.interval)
            .field("emitter", &self.emitter.name())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl BackgroundMonitor {
    pub fn new(
        cache: Arc<ReadinessCache>,
        emitter: Arc<dyn AlertEmitter>,
        interval: Duration,
    ) -> Self {
        Self {
            cache,
            emitter,
            metrics: None,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Feed every snapshot the monitor obtains into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<ReadinessMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Spawn the monitor loop; the first run starts immediately
    pub fn start(self) -> MonitorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let runs = Arc::new(AtomicU64::new(0));
        info!("Starting background monitor every {:?}", self.interval);

        let task = tokio::spawn(self.run(shutdown_rx, Arc::clone(&runs)));
        MonitorHandle {
            shutdown: shutdown_tx,
            task,
            runs,
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>, runs: Arc<AtomicU64>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut detector = TransitionDetector::new();

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let run = runs.fetch_add(1, Ordering::Relaxed) + 1;
            let snapshot = self.cache.refresh().await;
            if let Some(metrics) = &self.metrics {
                metrics.record_snapshot(&snapshot);
            }

            let transitions = detector.observe(&snapshot);
            debug!(
                "Monitor run {} finished: ready={}, transitions={}",
                run,
                snapshot.system_ready,
                transitions.len()
            );
            for transition in &transitions {
                self.emitter.emit(transition);
            }
        }

        info!("Background monitor stopped");
    }
}

/// Control handle for a running [`BackgroundMonitor`].
///
/// Dropping the handle also stops the monitor after its current run.
#[derive(Debug)]
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    runs: Arc<AtomicU64>,
}

impl MonitorHandle {
    /// Runs started so far
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the monitor, waiting up to `grace` for an in-flight run.
    ///
    /// Returns `false` when the run had to be aborted.
    pub async fn shutdown(mut self, grace: Duration) -> bool {
        // Ignore the error: the loop may already have exited.
        let _ = self.shutdown.send(true);

        match tokio::time::timeout(grace, &mut self.task).await {
            Ok(_) => true,
            Err(_) => {
                warn!(
                    "Background monitor did not stop within {:?}, aborting",
                    grace
                );
                self.task.abort();
                false
            }
        }
    }
}

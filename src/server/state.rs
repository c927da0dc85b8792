//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::cache::ReadinessCache;
use crate::monitoring::alerts::AlertManager;
use crate::monitoring::metrics::ReadinessMetrics;
use std::sync::Arc;
use std::time::Instant;

/// HTTP server state shared across handlers.
///
/// All fields are wrapped in `Arc` so that cloning per worker is cheap.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Loaded configuration (read-only)
    pub config: Arc<Config>,
    /// Readiness cache answering `/health/ready`
    pub cache: Arc<ReadinessCache>,
    /// Statistics, when the background monitor feeds them
    pub metrics: Option<Arc<ReadinessMetrics>>,
    /// Transition alerts, when the monitor is running
    pub alerts: Option<Arc<AlertManager>>,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, cache: Arc<ReadinessCache>) -> Self {
        Self {
            config: Arc::new(config),
            cache,
            metrics: None,
            alerts: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<ReadinessMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_alerts(mut self, alerts: Arc<AlertManager>) -> Self {
        self.alerts = Some(alerts);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

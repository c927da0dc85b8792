//! Readiness statistics aggregated from snapshots

use super::bounded::{BoundedPush, MAX_LATENCY_SAMPLES};
use super::helpers::{calculate_average, calculate_percentile, success_rate};
use crate::core::health::{CIRCUIT_OPEN_LABEL, ReadinessSnapshot, ServiceCheck};
use crate::core::probe::DependencyId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// Latency percentile metrics in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencyPercentiles {
    pub avg: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Aggregated statistics for one dependency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyMetrics {
    /// Checks observed, skipped ones included
    pub checks_total: u64,
    pub successes: u64,
    pub failures: u64,
    /// Checks skipped by an open breaker
    pub skipped: u64,
    /// Successes over attempted probes
    pub success_rate: f64,
    pub errors_by_kind: BTreeMap<String, u64>,
    pub latency_ms: LatencyPercentiles,
    pub last_healthy: Option<bool>,
}

/// Serializable view of [`ReadinessMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub snapshots_total: u64,
    pub ready_snapshots: u64,
    pub last_snapshot_at: Option<DateTime<Utc>>,
    pub dependencies: BTreeMap<DependencyId, DependencyMetrics>,
}

#[derive(Debug, Default)]
struct DependencyStats {
    checks_total: u64,
    successes: u64,
    failures: u64,
    skipped: u64,
    errors_by_kind: BTreeMap<String, u64>,
    latencies: VecDeque<f64>,
    last_healthy: Option<bool>,
}

impl DependencyStats {
    fn record(&mut self, check: &ServiceCheck) {
        self.checks_total += 1;
        self.last_healthy = Some(check.is_healthy());
        match check {
            ServiceCheck::SkippedBecauseOpen { .. } => {
                self.skipped += 1;
                *self
                    .errors_by_kind
                    .entry(CIRCUIT_OPEN_LABEL.to_string())
                    .or_default() += 1;
            }
            ServiceCheck::Probed(result) => {
                self.latencies
                    .push_bounded(result.latency_ms as f64, MAX_LATENCY_SAMPLES);
                if result.success {
                    self.successes += 1;
                } else {
                    self.failures += 1;
                    if let Some(kind) = result.error_kind {
                        *self
                            .errors_by_kind
                            .entry(kind.as_str().to_string())
                            .or_default() += 1;
                    }
                }
            }
        }
    }

    fn metrics(&self) -> DependencyMetrics {
        let mut sorted: Vec<f64> = self.latencies.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        DependencyMetrics {
            checks_total: self.checks_total,
            successes: self.successes,
            failures: self.failures,
            skipped: self.skipped,
            success_rate: success_rate(self.successes, self.failures),
            errors_by_kind: self.errors_by_kind.clone(),
            latency_ms: LatencyPercentiles {
                avg: calculate_average(&self.latencies),
                p50: calculate_percentile(&sorted, 0.50),
                p95: calculate_percentile(&sorted, 0.95),
                p99: calculate_percentile(&sorted, 0.99),
            },
            last_healthy: self.last_healthy,
        }
    }
}

#[derive(Debug, Default)]
struct MetricsState {
    snapshots_total: u64,
    ready_snapshots: u64,
    last_snapshot_at: Option<DateTime<Utc>>,
    dependencies: BTreeMap<DependencyId, DependencyStats>,
}

/// Per-dependency readiness statistics.
///
/// Fed with every snapshot the background monitor produces; read by the
/// metrics endpoint.
#[derive(Debug, Default)]
pub struct ReadinessMetrics {
    state: RwLock<MetricsState>,
}

impl ReadinessMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one snapshot into the running statistics
    pub fn record_snapshot(&self, snapshot: &ReadinessSnapshot) {
        let mut state = self.state.write();
        state.snapshots_total += 1;
        if snapshot.system_ready {
            state.ready_snapshots += 1;
        }
        state.last_snapshot_at = Some(snapshot.generated_at);

        for (id, check) in &snapshot.services {
            state
                .dependencies
                .entry(id.clone())
                .or_default()
                .record(check);
        }
    }

    pub fn dependency(&self, id: &DependencyId) -> Option<DependencyMetrics> {
        self.state
            .read()
            .dependencies
            .get(id)
            .map(DependencyStats::metrics)
    }

    pub fn report(&self) -> MetricsReport {
        let state = self.state.read();
        MetricsReport {
            snapshots_total: state.snapshots_total,
            ready_snapshots: state.ready_snapshots,
            last_snapshot_at: state.last_snapshot_at,
            dependencies: state
                .dependencies
                .iter()
                .map(|(id, stats)| (id.clone(), stats.metrics()))
                .collect(),
        }
    }

    pub fn reset(&self) {
        *self.state.write() = MetricsState::default();
    }
}

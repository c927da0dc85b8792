//! Readiness metrics
//!
//! Aggregates readiness snapshots into per-dependency counters and latency
//! percentiles over a bounded sample window.

mod bounded;
mod helpers;
mod readiness;


pub use readiness::{DependencyMetrics, LatencyPercentiles, MetricsReport, ReadinessMetrics};

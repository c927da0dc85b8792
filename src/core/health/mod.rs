//! Health check orchestration
//!
//! [`HealthCheckOrchestrator`] fans probes out to every registered dependency
//! in parallel, gates each through its circuit breaker, bounds the whole run
//! by a deadline and folds the results into an immutable [`ReadinessSnapshot`].

mod orchestrator;
mod types;

pub use orchestrator::{HealthCheckOrchestrator, OrchestratorBuilder, OrchestratorSettings};
pub use types::{
    CIRCUIT_OPEN_LABEL, DependencyPolicy, ReadinessReport, ReadinessSnapshot, ServiceCheck,
    ServiceReport,
};

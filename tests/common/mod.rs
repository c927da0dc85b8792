//! Common test utilities
//!
//! Scripted probes whose behaviour can be switched while a test runs, and
//! helpers for building orchestrators around them.

pub mod probes;

pub use probes::{Script, ScriptedProbe};

use readiness_orchestrator::core::breaker::CircuitBreakerConfig;
use readiness_orchestrator::core::health::{
    DependencyPolicy, HealthCheckOrchestrator, OrchestratorSettings,
};
use std::sync::Arc;
use std::time::Duration;

/// Settings with short timeouts suited to paused-clock tests
pub fn fast_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        probe_timeout: Duration::from_millis(500),
        overall_budget: Duration::from_millis(800),
        snapshot_ttl: Duration::from_secs(30),
    }
}

/// Build an orchestrator over `(id, policy, probe)` triples
pub fn orchestrator(
    breaker: CircuitBreakerConfig,
    dependencies: &[(&str, DependencyPolicy, Arc<ScriptedProbe>)],
) -> HealthCheckOrchestrator {
    let mut builder = HealthCheckOrchestrator::builder()
        .settings(fast_settings())
        .breaker_config(breaker);
    for (id, policy, probe) in dependencies {
        builder = builder.register(*id, *policy, probe.clone());
    }
    builder.build().expect("valid orchestrator")
}

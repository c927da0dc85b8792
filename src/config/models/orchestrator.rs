//! Orchestrator timing configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeouts applied to each orchestrator run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Per-probe timeout in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Budget for a whole run in milliseconds; must be >= probe_timeout_ms
    #[serde(default = "default_overall_budget_ms")]
    pub overall_budget_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: default_probe_timeout_ms(),
            overall_budget_ms: default_overall_budget_ms(),
        }
    }
}

impl OrchestratorConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn overall_budget(&self) -> Duration {
        Duration::from_millis(self.overall_budget_ms)
    }
}

fn default_probe_timeout_ms() -> u64 {
    5_000
}

fn default_overall_budget_ms() -> u64 {
    8_000
}

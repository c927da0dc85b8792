//! Environment variable overrides
//!
//! Every `READINESS_*` variable overrides the matching file setting.

use super::Config;
use crate::utils::error::{ReadinessError, Result};
use std::env;
use std::str::FromStr;
use tracing::debug;

impl Config {
    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("READINESS_HOST") {
            self.server.host = host;
        }
        override_parsed(&lookup, "READINESS_PORT", &mut self.server.port)?;

        override_parsed(
            &lookup,
            "READINESS_PROBE_TIMEOUT_MS",
            &mut self.orchestrator.probe_timeout_ms,
        )?;
        override_parsed(
            &lookup,
            "READINESS_OVERALL_BUDGET_MS",
            &mut self.orchestrator.overall_budget_ms,
        )?;

        override_parsed(
            &lookup,
            "READINESS_FAILURE_THRESHOLD",
            &mut self.circuit_breaker.failure_threshold,
        )?;
        override_parsed(
            &lookup,
            "READINESS_SUCCESS_THRESHOLD",
            &mut self.circuit_breaker.success_threshold,
        )?;
        override_parsed(
            &lookup,
            "READINESS_OPEN_TIMEOUT_MS",
            &mut self.circuit_breaker.open_timeout_ms,
        )?;
        override_parsed(
            &lookup,
            "READINESS_HALF_OPEN_MAX_CONCURRENT",
            &mut self.circuit_breaker.half_open_max_concurrent,
        )?;

        override_parsed(&lookup, "READINESS_CACHE_TTL_SECS", &mut self.cache.ttl_secs)?;

        override_parsed(&lookup, "READINESS_MONITOR_ENABLED", &mut self.monitor.enabled)?;
        override_parsed(
            &lookup,
            "READINESS_MONITOR_INTERVAL_MS",
            &mut self.monitor.interval_ms,
        )?;

        if let Some(url) = lookup("READINESS_ALERT_WEBHOOK_URL") {
            self.alerts.webhook_url = Some(url);
        }

        if let Some(level) = lookup("READINESS_LOG_LEVEL") {
            self.logging.level = level;
        }
        override_parsed(&lookup, "READINESS_LOG_JSON", &mut self.logging.json)?;

        debug!("Environment overrides applied");
        Ok(())
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| ReadinessError::Config(format!("Invalid {}: {}", key, e)))?;
    }
    Ok(())
}

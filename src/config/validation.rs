//! Configuration validation
//!
//! Each configuration section validates itself; [`Config::validate`](super::Config::validate)
//! wraps the messages into configuration errors.

use super::models::*;
use tracing::warn;
use url::Url;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if let Some(0) = self.workers {
            return Err("Number of workers must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for OrchestratorConfig {
    fn validate(&self) -> Result<(), String> {
        if self.probe_timeout_ms == 0 {
            return Err("probe_timeout_ms must be greater than 0".to_string());
        }
        if self.overall_budget_ms < self.probe_timeout_ms {
            return Err(format!(
                "overall_budget_ms ({}) must be >= probe_timeout_ms ({})",
                self.overall_budget_ms, self.probe_timeout_ms
            ));
        }
        Ok(())
    }
}

impl Validate for BreakerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.failure_threshold == 0 {
            return Err("failure_threshold must be greater than 0".to_string());
        }
        if self.success_threshold == 0 {
            return Err("success_threshold must be greater than 0".to_string());
        }
        if self.half_open_max_concurrent == 0 {
            return Err("half_open_max_concurrent must be greater than 0".to_string());
        }
        if self.open_timeout_ms == 0 {
            return Err("open_timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.ttl_secs == 0 {
            return Err("ttl_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for MonitorConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.interval_ms == 0 {
            return Err("interval_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for AlertsConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(url) = &self.webhook_url {
            validate_http_url(url, "webhook_url")?;
        }
        if self.broadcast_capacity == 0 {
            return Err("broadcast_capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for DependencyConfig {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Dependency id cannot be empty".to_string());
        }
        if self.id.eq_ignore_ascii_case("system") {
            return Err("'system' is reserved for the aggregate alert scope".to_string());
        }
        validate_http_url(self.probe.url(), "probe url")?;

        match &self.probe {
            ProbeConfig::Http {
                expected_status: Some(status),
                ..
            } if !(100..=599).contains(status) => {
                return Err(format!("expected_status {} is not a valid HTTP status", status));
            }
            ProbeConfig::JsonRpc {
                username, password, ..
            } => {
                if username.is_some() != password.is_some() {
                    return Err("username and password must be set together".to_string());
                }
                if username.is_some() && self.probe.url().starts_with("http://") {
                    warn!(
                        "Dependency '{}' sends RPC credentials over plain http",
                        self.id
                    );
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn validate_http_url(url_str: &str, context: &str) -> Result<(), String> {
    let url =
        Url::parse(url_str).map_err(|e| format!("{} has invalid URL format: {}", context, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!(
            "{} must use http:// or https:// scheme, got: {}",
            context, scheme
        )),
    }
}

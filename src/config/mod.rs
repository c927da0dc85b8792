//! Configuration management for the readiness orchestrator
//!
//! Configuration is built once at startup (YAML file, then environment
//! overrides), validated, and passed explicitly into every component. Nothing
//! reads settings from global state at runtime.

mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{ReadinessError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub circuit_breaker: BreakerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub dependencies: Vec<DependencyConfig>,
}

impl Config {
    /// Load configuration from a YAML file, apply environment overrides and validate
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ReadinessError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env()?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse configuration from YAML without environment overrides or validation
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ReadinessError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Build configuration from defaults plus environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.server
            .validate()
            .map_err(|e| ReadinessError::Config(format!("Server config error: {}", e)))?;
        self.orchestrator
            .validate()
            .map_err(|e| ReadinessError::Config(format!("Orchestrator config error: {}", e)))?;
        self.circuit_breaker
            .validate()
            .map_err(|e| ReadinessError::Config(format!("Circuit breaker config error: {}", e)))?;
        self.cache
            .validate()
            .map_err(|e| ReadinessError::Config(format!("Cache config error: {}", e)))?;
        self.monitor
            .validate()
            .map_err(|e| ReadinessError::Config(format!("Monitor config error: {}", e)))?;
        self.alerts
            .validate()
            .map_err(|e| ReadinessError::Config(format!("Alerts config error: {}", e)))?;

        let mut seen = HashSet::new();
        for dependency in &self.dependencies {
            dependency.validate().map_err(|e| {
                ReadinessError::Config(format!(
                    "Dependency '{}' config error: {}",
                    dependency.id, e
                ))
            })?;
            if !seen.insert(dependency.id.as_str()) {
                return Err(ReadinessError::DuplicateDependency(dependency.id.clone()));
            }
        }

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            ReadinessError::Config(format!("Failed to serialize config to YAML: {}", e))
        })
    }
}

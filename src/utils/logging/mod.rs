//! Tracing subscriber setup

use crate::config::LoggingConfig;
use crate::utils::error::{ReadinessError, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins over the configured level
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            ReadinessError::config(format!("invalid log level '{}': {}", config.level, e))
        }),
    }
}

/// Install the global tracing subscriber.
///
/// Fails if the level does not parse or a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let installed = if config.json {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ReadinessError::internal(format!("failed to install tracing: {}", e)))
}

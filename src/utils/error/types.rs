//! Error types for the readiness orchestrator

use thiserror::Error;

/// Result type alias for the readiness orchestrator
pub type Result<T> = std::result::Result<T, ReadinessError>;

/// Main error type for the readiness orchestrator
#[derive(Error, Debug)]
pub enum ReadinessError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Duplicate dependency registration
    #[error("Dependency already registered: {0}")]
    DuplicateDependency(String),

    /// Alert delivery errors
    #[error("Alert error: {0}")]
    Alert(String),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

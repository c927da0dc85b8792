//! Configuration loading integration tests

#[cfg(test)]
mod tests {
    use readiness_orchestrator::config::{Config, ProbeConfig};
    use readiness_orchestrator::core::health::{DependencyPolicy, HealthCheckOrchestrator};
    use readiness_orchestrator::utils::error::ReadinessError;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn example_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/readiness.yaml.example")
    }

    #[tokio::test]
    async fn test_example_config_loads() {
        let config = Config::from_file(example_path()).await.unwrap();

        assert_eq!(config.dependencies.len(), 3);
        assert_eq!(config.dependencies[2].policy, DependencyPolicy::Advisory);
        assert!(matches!(
            config.dependencies[0].probe,
            ProbeConfig::JsonRpc { .. }
        ));
        assert_eq!(config.orchestrator.overall_budget(), Duration::from_secs(8));

        let orchestrator = HealthCheckOrchestrator::from_config(&config).unwrap();
        assert_eq!(orchestrator.policies().len(), 3);
    }

    #[tokio::test]
    async fn test_minimal_config_uses_defaults() {
        let file = write_config(
            r#"
dependencies:
  - id: core
    probe:
      type: http
      url: "http://localhost:8332/health"
"#,
        );
        let config = Config::from_file(file.path()).await.unwrap();

        assert_eq!(config.dependencies[0].policy, DependencyPolicy::Required);
        assert_eq!(config.circuit_breaker.failure_threshold, 3);
        assert_eq!(config.cache.ttl(), Duration::from_secs(30));
        assert_eq!(config.orchestrator.probe_timeout(), Duration::from_secs(5));
        assert!(config.monitor.enabled);
    }

    #[tokio::test]
    async fn test_budget_below_timeout_rejected() {
        let file = write_config(
            r#"
orchestrator:
  probe_timeout_ms: 5000
  overall_budget_ms: 1000
"#,
        );
        let err = Config::from_file(file.path()).await.unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("budget"));
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let file = write_config(
            r#"
dependencies:
  - id: core
    probe: { type: http, url: "http://localhost:1/a" }
  - id: core
    probe: { type: http, url: "http://localhost:1/b" }
"#,
        );
        let err = Config::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, ReadinessError::DuplicateDependency(ref id) if id == "core"));
    }

    #[tokio::test]
    async fn test_bad_url_scheme_rejected() {
        let file = write_config(
            r#"
dependencies:
  - id: core
    probe: { type: http, url: "ftp://localhost/health" }
"#,
        );
        assert!(Config::from_file(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_probe_type_rejected() {
        let file = write_config(
            r#"
dependencies:
  - id: core
    probe: { type: grpc, url: "http://localhost:1" }
"#,
        );
        assert!(Config::from_file(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_round_trip_through_yaml() {
        let config = Config::from_file(example_path()).await.unwrap();
        let yaml = config.to_yaml().unwrap();
        let reparsed = Config::from_yaml_str(&yaml).unwrap();

        assert_eq!(reparsed.dependencies.len(), config.dependencies.len());
        assert_eq!(reparsed.server.port, config.server.port);
    }
}

//! Background monitor integration tests

#[cfg(test)]
mod tests {
    use crate::common::{Script, ScriptedProbe, orchestrator};
    use readiness_orchestrator::config::AlertsConfig;
    use readiness_orchestrator::core::breaker::CircuitBreakerConfig;
    use readiness_orchestrator::core::cache::ReadinessCache;
    use readiness_orchestrator::core::health::DependencyPolicy;
    use readiness_orchestrator::core::probe::{DependencyId, ErrorKind};
    use readiness_orchestrator::monitoring::BackgroundMonitor;
    use readiness_orchestrator::monitoring::alerts::{AlertManager, AlertScope, HealthStatus};
    use readiness_orchestrator::monitoring::metrics::ReadinessMetrics;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cache_over(
        dependencies: &[(&str, DependencyPolicy, Arc<ScriptedProbe>)],
    ) -> Arc<ReadinessCache> {
        Arc::new(ReadinessCache::new(
            Arc::new(orchestrator(CircuitBreakerConfig::default(), dependencies)),
            Duration::from_secs(30),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_transitions_reach_subscribers() {
        let index = ScriptedProbe::healthy();
        let cache = cache_over(&[
            ("core", DependencyPolicy::Required, ScriptedProbe::healthy()),
            ("index", DependencyPolicy::Required, index.clone()),
        ]);
        let alerts = Arc::new(
            AlertManager::from_config(&AlertsConfig {
                log: true,
                webhook_url: None,
                broadcast_capacity: 16,
            })
            .unwrap(),
        );
        let mut receiver = alerts.subscribe();
        let metrics = Arc::new(ReadinessMetrics::new());

        let handle = BackgroundMonitor::new(cache.clone(), alerts.clone(), Duration::from_secs(5))
            .with_metrics(metrics.clone())
            .start();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(alerts.recent().is_empty());

        index.set(Script::Fail(ErrorKind::Timeout));
        let degraded = receiver.recv().await.unwrap();
        assert_eq!(
            degraded.scope,
            AlertScope::Dependency(DependencyId::new("index"))
        );
        assert_eq!(degraded.to, HealthStatus::Unhealthy);
        assert_eq!(degraded.error_kind.as_deref(), Some("timeout"));
        let system = receiver.recv().await.unwrap();
        assert_eq!(system.scope, AlertScope::System);

        index.set(Script::Healthy);
        let recovered = receiver.recv().await.unwrap();
        assert!(recovered.is_recovery());

        assert!(handle.shutdown(Duration::from_secs(1)).await);
        assert_eq!(alerts.recent().len(), 4);
        assert!(metrics.report().snapshots_total >= 3);
        assert!(cache.peek().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_keeps_cache_fresh() {
        let core = ScriptedProbe::healthy();
        let cache = cache_over(&[("core", DependencyPolicy::Required, core.clone())]);
        let alerts = Arc::new(AlertManager::from_config(&AlertsConfig::default()).unwrap());

        let handle = BackgroundMonitor::new(cache.clone(), alerts, Duration::from_secs(10)).start();
        tokio::time::sleep(Duration::from_secs(25)).await;

        // Runs at 0s, 10s and 20s; readers are served from the cache.
        assert_eq!(core.calls(), 3);
        let snapshot = cache.get().await;
        assert!(snapshot.system_ready);
        assert_eq!(core.calls(), 3);

        handle.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_webhook_receives_transitions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let core = ScriptedProbe::healthy();
        let cache = cache_over(&[("core", DependencyPolicy::Required, core.clone())]);
        let alerts = Arc::new(
            AlertManager::from_config(&AlertsConfig {
                log: false,
                webhook_url: Some(format!("{}/hook", server.uri())),
                broadcast_capacity: 16,
            })
            .unwrap(),
        );

        let handle =
            BackgroundMonitor::new(cache, alerts.clone(), Duration::from_millis(50)).start();
        tokio::time::sleep(Duration::from_millis(20)).await;
        core.set(Script::Fail(ErrorKind::ConnectionRefused));

        let mut delivered = Vec::new();
        for _ in 0..100 {
            delivered = server.received_requests().await.unwrap_or_default();
            if delivered.len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        handle.shutdown(Duration::from_secs(1)).await;

        assert_eq!(delivered.len(), 2);
        let bodies: Vec<serde_json::Value> = delivered
            .iter()
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect();
        let core = bodies
            .iter()
            .find(|body| body["transition"]["scope"] == "core")
            .unwrap();
        assert_eq!(core["transition"]["error_kind"], "connection_refused");
        assert!(
            bodies
                .iter()
                .any(|body| body["transition"]["scope"] == "system")
        );
    }
}

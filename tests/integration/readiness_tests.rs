//! Orchestrator, breaker and cache integration tests

#[cfg(test)]
mod tests {
    use crate::common::{Script, ScriptedProbe, orchestrator};
    use readiness_orchestrator::core::breaker::{CircuitBreakerConfig, CircuitState};
    use readiness_orchestrator::core::cache::ReadinessCache;
    use readiness_orchestrator::core::health::DependencyPolicy;
    use readiness_orchestrator::core::probe::{DependencyId, ErrorKind};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    fn id(name: &str) -> DependencyId {
        DependencyId::new(name)
    }

    /// Required dependencies healthy, advisory one hanging past the timeout
    #[tokio::test(start_paused = true)]
    async fn test_advisory_timeout_does_not_block_readiness() {
        let price = ScriptedProbe::new(Script::Hang);
        let orchestrator = orchestrator(
            CircuitBreakerConfig::default(),
            &[
                ("core", DependencyPolicy::Required, ScriptedProbe::healthy()),
                ("index", DependencyPolicy::Required, ScriptedProbe::healthy()),
                ("price", DependencyPolicy::Advisory, price.clone()),
            ],
        );

        let started = Instant::now();
        let snapshot = orchestrator.run().await;

        assert!(started.elapsed() <= orchestrator.settings().overall_budget);
        assert!(snapshot.system_ready);

        let report = snapshot.report();
        assert!(report.services[&id("core")].healthy);
        assert!(report.services[&id("index")].healthy);
        assert!(!report.services[&id("price")].healthy);
        assert_eq!(
            report.services[&id("price")].error_kind.as_deref(),
            Some("timeout")
        );
    }

    /// Open breaker stops probing until the open timeout elapses
    #[tokio::test(start_paused = true)]
    async fn test_breaker_opens_and_recovers() {
        let index = ScriptedProbe::new(Script::Fail(ErrorKind::ConnectionRefused));
        let orchestrator = orchestrator(
            CircuitBreakerConfig::new()
                .with_failure_threshold(3)
                .with_open_timeout(Duration::from_secs(30)),
            &[
                ("core", DependencyPolicy::Required, ScriptedProbe::healthy()),
                ("index", DependencyPolicy::Required, index.clone()),
            ],
        );

        for _ in 0..3 {
            assert!(!orchestrator.run().await.system_ready);
        }
        let breaker = orchestrator.breaker(&id("index")).unwrap().clone();
        assert_eq!(breaker.state(), CircuitState::Open);

        for _ in 0..5 {
            let snapshot = orchestrator.run().await;
            let check = snapshot.service(&id("index")).unwrap();
            assert!(check.is_skipped());
            assert_eq!(check.error_label(), Some("circuit_open"));
            assert!(!snapshot.system_ready);
        }
        assert_eq!(index.calls(), 3);
        assert_eq!(breaker.status().skipped_total, 5);

        index.set(Script::Healthy);
        tokio::time::advance(Duration::from_secs(30)).await;

        let snapshot = orchestrator.run().await;
        assert!(snapshot.system_ready);
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(index.calls(), 4);
    }

    /// A failed half-open trial reopens the breaker with a fresh timer
    #[tokio::test(start_paused = true)]
    async fn test_failed_trial_reopens() {
        let index = ScriptedProbe::new(Script::Fail(ErrorKind::ProtocolError));
        let orchestrator = orchestrator(
            CircuitBreakerConfig::new()
                .with_failure_threshold(1)
                .with_open_timeout(Duration::from_secs(10)),
            &[("index", DependencyPolicy::Required, index.clone())],
        );

        orchestrator.run().await;
        tokio::time::advance(Duration::from_secs(10)).await;
        orchestrator.run().await;
        assert_eq!(index.calls(), 2);

        let breaker = orchestrator.breaker(&id("index")).unwrap();
        assert_eq!(breaker.state(), CircuitState::Open);

        tokio::time::advance(Duration::from_secs(5)).await;
        orchestrator.run().await;
        assert_eq!(index.calls(), 2);
    }

    /// Only `half_open_max_concurrent` trials run at once
    #[tokio::test(start_paused = true)]
    async fn test_half_open_admits_single_trial() {
        let index = ScriptedProbe::new(Script::Fail(ErrorKind::Unknown));
        let orchestrator = orchestrator(
            CircuitBreakerConfig::new()
                .with_failure_threshold(1)
                .with_open_timeout(Duration::from_secs(10))
                .with_half_open_max_concurrent(1),
            &[("index", DependencyPolicy::Required, index.clone())],
        );

        orchestrator.run().await;
        index.set(Script::Slow(Duration::from_millis(100)));
        tokio::time::advance(Duration::from_secs(10)).await;

        let (first, second) = tokio::join!(orchestrator.run(), orchestrator.run());
        let skipped = [&first, &second]
            .iter()
            .filter(|snapshot| snapshot.service(&id("index")).unwrap().is_skipped())
            .count();

        assert_eq!(skipped, 1);
        assert_eq!(index.calls(), 2);
        let breaker = orchestrator.breaker(&id("index")).unwrap();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    /// A panicking advisory probe fails alone and the result is cached
    #[tokio::test(start_paused = true)]
    async fn test_panicking_advisory_probe_is_isolated_in_cache() {
        let core = ScriptedProbe::healthy();
        let price = ScriptedProbe::new(Script::Panic);
        let orchestrator = orchestrator(
            CircuitBreakerConfig::default(),
            &[
                ("core", DependencyPolicy::Required, core.clone()),
                ("price", DependencyPolicy::Advisory, price.clone()),
            ],
        );
        let cache = ReadinessCache::new(Arc::new(orchestrator), Duration::from_secs(30));

        let snapshot = cache.get().await;
        assert!(snapshot.system_ready);

        let report = snapshot.report();
        assert!(report.services[&id("core")].healthy);
        assert!(!report.services[&id("price")].healthy);
        assert_eq!(
            report.services[&id("price")].error_kind.as_deref(),
            Some("unknown")
        );

        let again = cache.get().await;
        assert!(Arc::ptr_eq(&snapshot, &again));
        assert_eq!(cache.refresh_count(), 1);
        assert_eq!(core.calls(), 1);
        assert_eq!(price.calls(), 1);
    }

    /// Concurrent callers through the cache share one orchestrator run
    #[tokio::test(start_paused = true)]
    async fn test_cache_single_flight_across_callers() {
        let core = ScriptedProbe::new(Script::Slow(Duration::from_millis(200)));
        let index = ScriptedProbe::new(Script::Slow(Duration::from_millis(50)));
        let orchestrator = orchestrator(
            CircuitBreakerConfig::default(),
            &[
                ("core", DependencyPolicy::Required, core.clone()),
                ("index", DependencyPolicy::Required, index.clone()),
            ],
        );
        let cache = Arc::new(ReadinessCache::new(
            Arc::new(orchestrator),
            Duration::from_secs(30),
        ));

        let callers: Vec<_> = (0..10)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get().await })
            })
            .collect();
        let snapshots: Vec<_> = futures::future::join_all(callers)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(core.calls(), 1);
        assert_eq!(index.calls(), 1);
        assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
        assert!(snapshots[0].system_ready);
    }

    /// The query shape exposes exactly the documented fields
    #[tokio::test(start_paused = true)]
    async fn test_report_json_shape() {
        let orchestrator = orchestrator(
            CircuitBreakerConfig::default(),
            &[
                ("core", DependencyPolicy::Required, ScriptedProbe::healthy()),
                (
                    "index",
                    DependencyPolicy::Required,
                    ScriptedProbe::new(Script::Fail(ErrorKind::AuthFailure)),
                ),
            ],
        );

        let json = serde_json::to_value(orchestrator.run().await.report()).unwrap();

        assert_eq!(json["system_ready"], false);
        assert_eq!(json["services"]["core"]["healthy"], true);
        assert!(json["services"]["core"].get("error_kind").is_none());
        assert_eq!(json["services"]["index"]["error_kind"], "auth_failure");
        assert!(json["services"]["index"]["latency_ms"].is_u64());
    }
}

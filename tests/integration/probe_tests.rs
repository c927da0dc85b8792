//! HTTP and JSON-RPC probe tests against a mock server

#[cfg(test)]
mod tests {
    use readiness_orchestrator::config::{Config, DependencyConfig, ProbeConfig};
    use readiness_orchestrator::core::health::{DependencyPolicy, HealthCheckOrchestrator};
    use readiness_orchestrator::core::probe::{
        DependencyId, ErrorKind, HttpProbe, JsonRpcProbe, Probe,
    };
    use reqwest::StatusCode;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::Instant;
    use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(2)
    }

    async fn mock_get(server: &MockServer, route: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    /// Address nothing listens on
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}/health", port)
    }

    // ==================== HttpProbe ====================

    #[tokio::test]
    async fn test_http_probe_healthy_on_2xx() {
        let server = MockServer::start().await;
        mock_get(&server, "/health", 200).await;

        let probe = HttpProbe::new(format!("{}/health", server.uri()));
        assert!(probe.probe(deadline()).await.is_ok());
    }

    #[tokio::test]
    async fn test_http_probe_classifies_statuses() {
        let server = MockServer::start().await;
        mock_get(&server, "/down", 503).await;
        mock_get(&server, "/denied", 401).await;
        mock_get(&server, "/gateway", 504).await;

        let cases = [
            ("/down", ErrorKind::ProtocolError),
            ("/denied", ErrorKind::AuthFailure),
            ("/gateway", ErrorKind::Timeout),
        ];
        for (route, expected) in cases {
            let probe = HttpProbe::new(format!("{}{}", server.uri(), route));
            let failure = probe.probe(deadline()).await.unwrap_err();
            assert_eq!(failure.kind, expected, "route {}", route);
        }
    }

    #[tokio::test]
    async fn test_http_probe_expected_status() {
        let server = MockServer::start().await;
        mock_get(&server, "/teapot", 418).await;
        mock_get(&server, "/ok", 200).await;

        let probe = HttpProbe::new(format!("{}/teapot", server.uri()))
            .with_expected_status(StatusCode::IM_A_TEAPOT);
        assert!(probe.probe(deadline()).await.is_ok());

        let probe = HttpProbe::new(format!("{}/ok", server.uri()))
            .with_expected_status(StatusCode::NO_CONTENT);
        assert!(probe.probe(deadline()).await.is_err());
    }

    #[tokio::test]
    async fn test_http_probe_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer s3cret"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let probe = HttpProbe::new(server.uri()).with_bearer_token("s3cret");
        assert!(probe.probe(deadline()).await.is_ok());
        assert!(!format!("{:?}", probe).contains("s3cret"));
    }

    #[tokio::test]
    async fn test_http_probe_times_out_at_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let probe = HttpProbe::new(server.uri());
        let started = std::time::Instant::now();
        let failure = probe
            .probe(Instant::now() + Duration::from_millis(200))
            .await
            .unwrap_err();

        assert_eq!(failure.kind, ErrorKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_http_probe_connection_refused() {
        let probe = HttpProbe::new(closed_port_url());
        let failure = probe.probe(deadline()).await.unwrap_err();
        assert_eq!(failure.kind, ErrorKind::ConnectionRefused);
    }

    #[tokio::test]
    async fn test_http_probe_elapsed_deadline() {
        let probe = HttpProbe::new(closed_port_url());
        let failure = probe.probe(Instant::now()).await.unwrap_err();
        assert_eq!(failure.kind, ErrorKind::Timeout);
    }

    // ==================== JsonRpcProbe ====================

    #[tokio::test]
    async fn test_rpc_probe_healthy_on_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "jsonrpc": "2.0",
                "method": "getblockchaininfo",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"blocks": 800000},
                "error": null,
                "id": "readiness"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let probe = JsonRpcProbe::new(server.uri());
        assert!(probe.probe(deadline()).await.is_ok());
    }

    #[tokio::test]
    async fn test_rpc_probe_error_member_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": null,
                "error": {"code": -28, "message": "Loading block index..."},
                "id": "readiness"
            })))
            .mount(&server)
            .await;

        let failure = JsonRpcProbe::new(server.uri())
            .probe(deadline())
            .await
            .unwrap_err();
        assert_eq!(failure.kind, ErrorKind::ProtocolError);
        assert!(failure.message.contains("Loading block index"));
    }

    #[tokio::test]
    async fn test_rpc_probe_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let failure = JsonRpcProbe::new(server.uri())
            .probe(deadline())
            .await
            .unwrap_err();
        assert_eq!(failure.kind, ErrorKind::ProtocolError);
    }

    #[tokio::test]
    async fn test_rpc_probe_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 1})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let anonymous = JsonRpcProbe::new(server.uri());
        assert_eq!(
            anonymous.probe(deadline()).await.unwrap_err().kind,
            ErrorKind::AuthFailure
        );

        let authed = JsonRpcProbe::new(server.uri())
            .with_method("getblockcount")
            .with_basic_auth("rpcuser", "rpcpass");
        assert!(authed.probe(deadline()).await.is_ok());
        assert!(!format!("{:?}", authed).contains("rpcpass"));
    }

    // ==================== From configuration ====================

    #[tokio::test]
    async fn test_orchestrator_from_config() {
        let server = MockServer::start().await;
        mock_get(&server, "/index/health", 200).await;
        mock_get(&server, "/price/ping", 500).await;
        Mock::given(method("POST"))
            .and(path("/rpc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {}})))
            .mount(&server)
            .await;

        let config = Config {
            dependencies: vec![
                DependencyConfig {
                    id: "core".to_string(),
                    policy: DependencyPolicy::Required,
                    probe: ProbeConfig::JsonRpc {
                        url: format!("{}/rpc", server.uri()),
                        method: "getblockchaininfo".to_string(),
                        username: None,
                        password: None,
                    },
                },
                DependencyConfig {
                    id: "index".to_string(),
                    policy: DependencyPolicy::Required,
                    probe: ProbeConfig::Http {
                        url: format!("{}/index/health", server.uri()),
                        expected_status: None,
                        bearer_token: None,
                    },
                },
                DependencyConfig {
                    id: "price".to_string(),
                    policy: DependencyPolicy::Advisory,
                    probe: ProbeConfig::Http {
                        url: format!("{}/price/ping", server.uri()),
                        expected_status: None,
                        bearer_token: None,
                    },
                },
            ],
            ..Config::default()
        };
        config.validate().unwrap();

        let orchestrator = HealthCheckOrchestrator::from_config(&config).unwrap();
        let snapshot = orchestrator.run().await;

        assert!(snapshot.system_ready);
        assert!(snapshot.service(&DependencyId::new("core")).unwrap().is_healthy());
        assert_eq!(
            snapshot
                .service(&DependencyId::new("price"))
                .unwrap()
                .error_kind(),
            Some(ErrorKind::ProtocolError)
        );
        assert_eq!(orchestrator.breaker_statuses().len(), 3);
    }
}

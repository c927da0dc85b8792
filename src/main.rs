//! Readiness orchestrator service
//!
//! Probes the configured dependencies and serves aggregated readiness over HTTP.

use anyhow::Context;
use clap::Parser;
use readiness_orchestrator::config::Config;
use readiness_orchestrator::core::cache::ReadinessCache;
use readiness_orchestrator::core::health::HealthCheckOrchestrator;
use readiness_orchestrator::monitoring::BackgroundMonitor;
use readiness_orchestrator::monitoring::alerts::AlertManager;
use readiness_orchestrator::monitoring::metrics::ReadinessMetrics;
use readiness_orchestrator::server::{AppState, HttpServer};
use readiness_orchestrator::utils::logging::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "readiness", version, about = "Dependency readiness orchestrator")]
struct Cli {
    /// YAML configuration file; environment variables only when omitted
    #[arg(short, long, env = "READINESS_CONFIG")]
    config: Option<PathBuf>,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,

    /// Run one readiness check, print the report and exit (1 when not ready)
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::from_env().context("loading configuration from environment")?,
    };
    if cli.log_json {
        config.logging.json = true;
    }
    init_tracing(&config.logging)?;

    if config.dependencies.is_empty() {
        warn!("No dependencies configured; readiness will always be reported as ready");
    }
    let orchestrator = Arc::new(HealthCheckOrchestrator::from_config(&config)?);
    let cache = Arc::new(ReadinessCache::new(orchestrator, config.cache.ttl()));

    if cli.check {
        let snapshot = cache.get().await;
        println!("{}", serde_json::to_string_pretty(&snapshot.report())?);
        return Ok(if snapshot.system_ready {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let mut state = AppState::new(config.clone(), Arc::clone(&cache));

    let monitor = if config.monitor.enabled {
        let metrics = Arc::new(ReadinessMetrics::new());
        let alerts = Arc::new(AlertManager::from_config(&config.alerts)?);
        state = state
            .with_metrics(Arc::clone(&metrics))
            .with_alerts(Arc::clone(&alerts));
        Some(
            BackgroundMonitor::new(Arc::clone(&cache), alerts, config.monitor.interval())
                .with_metrics(metrics)
                .start(),
        )
    } else {
        info!("Background monitor disabled");
        None
    };

    let served = HttpServer::new(&config.server, state).start().await;

    if let Some(monitor) = monitor {
        monitor.shutdown(config.monitor.shutdown_grace()).await;
    }
    served?;

    Ok(ExitCode::SUCCESS)
}

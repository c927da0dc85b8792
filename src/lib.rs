//! # Readiness Orchestrator
//!
//! Aggregated readiness for a service that depends on several remote
//! backends (a node daemon, an indexer, a price feed and so on).
//!
//! ## Features
//!
//! - **Parallel probes**: every dependency is probed concurrently under a
//!   per-probe timeout and an overall budget
//! - **Circuit breakers**: one per dependency; open breakers skip their probe
//!   until a half-open trial succeeds
//! - **Required vs advisory**: only required dependencies decide readiness
//! - **Single-flight cache**: concurrent callers share one orchestrator run
//! - **Background monitor**: proactive refreshes with transition alerts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use readiness_orchestrator::core::cache::ReadinessCache;
//! use readiness_orchestrator::core::health::{DependencyPolicy, HealthCheckOrchestrator};
//! use readiness_orchestrator::core::probe::HttpProbe;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = HealthCheckOrchestrator::builder()
//!         .register(
//!             "core",
//!             DependencyPolicy::Required,
//!             Arc::new(HttpProbe::new("http://127.0.0.1:8332/health")),
//!         )
//!         .register(
//!             "price",
//!             DependencyPolicy::Advisory,
//!             Arc::new(HttpProbe::new("https://prices.example.com/ping")),
//!         )
//!         .build()?;
//!
//!     let cache = ReadinessCache::new(Arc::new(orchestrator), Duration::from_secs(30));
//!     let snapshot = cache.get().await;
//!     println!("ready: {}", snapshot.system_ready);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]

pub mod config;
pub mod core;
pub mod monitoring;
pub mod server;
pub mod utils;

pub use config::Config;
pub use core::cache::ReadinessCache;
pub use core::health::{
    DependencyPolicy, HealthCheckOrchestrator, ReadinessReport, ReadinessSnapshot,
};
pub use core::probe::{DependencyId, ErrorKind, Probe, ProbeFailure, ProbeResult};
pub use monitoring::{BackgroundMonitor, MonitorHandle};
pub use utils::error::{ReadinessError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

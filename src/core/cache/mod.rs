//! Readiness caching
//!
//! Serves recent [`ReadinessSnapshot`](crate::core::health::ReadinessSnapshot)s
//! within a TTL and collapses concurrent refreshes into a single orchestrator run.

mod readiness_cache;

pub use readiness_cache::ReadinessCache;

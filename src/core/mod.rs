//! Core readiness logic
//!
//! Probes, circuit breakers, the health check orchestrator and the readiness cache.

pub mod breaker;
pub mod cache;
pub mod health;
pub mod probe;

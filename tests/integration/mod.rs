//! Integration tests for readiness-orchestrator
//!
//! These tests wire real components together; only the remote
//! dependencies are scripted or mocked.

pub mod config_tests;
pub mod monitor_tests;
pub mod probe_tests;
pub mod readiness_tests;

//! Error handling for the readiness orchestrator
//!
//! Probe failures are not errors: they are captured as data inside a
//! [`ReadinessSnapshot`](crate::core::health::ReadinessSnapshot). The types here
//! cover configuration, startup and serving failures only.

mod helpers;
mod types;

pub use types::{ReadinessError, Result};

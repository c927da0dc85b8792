//! Background monitoring
//!
//! Proactive readiness refreshes, transition alerts and readiness metrics.

pub mod alerts;
pub mod metrics;

mod background;
mod transitions;

pub use background::{BackgroundMonitor, MonitorHandle};
pub use transitions::TransitionDetector;

//! Transition alerting
//!
//! Emitters receive health transitions from the background monitor. Emission
//! never blocks the monitor and delivery failures never propagate back to it.

mod channels;
mod emitter;
mod manager;
mod types;

pub use channels::{DEFAULT_WEBHOOK_QUEUE, DEFAULT_WEBHOOK_TIMEOUT, WebhookEmitter};
pub use emitter::{
    AlertEmitter, BroadcastEmitter, DEFAULT_HISTORY_CAPACITY, FanoutEmitter, HistoryEmitter,
    LogEmitter,
};
pub use manager::AlertManager;
pub use types::{AlertScope, HealthStatus, SYSTEM_SCOPE, Transition};

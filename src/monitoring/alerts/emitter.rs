//! Alert emitters

use super::types::Transition;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Transitions kept by [`HistoryEmitter`] by default
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Receives health transitions.
///
/// `emit` must not block the caller: slow delivery is handed off to a
/// background task and failures are logged and dropped.
pub trait AlertEmitter: Send + Sync + std::fmt::Debug {
    fn emit(&self, transition: &Transition);

    /// Emitter name used in logs
    fn name(&self) -> &str;
}

/// Writes transitions to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEmitter;

impl AlertEmitter for LogEmitter {
    fn emit(&self, transition: &Transition) {
        if transition.is_recovery() {
            info!(
                scope = %transition.scope,
                alert_id = %transition.id,
                "Readiness recovered: {}",
                transition.summary()
            );
        } else {
            warn!(
                scope = %transition.scope,
                alert_id = %transition.id,
                "Readiness degraded: {}",
                transition.summary()
            );
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Publishes transitions on an in-process broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastEmitter {
    sender: broadcast::Sender<Transition>,
}

impl BroadcastEmitter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Transition> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl AlertEmitter for BroadcastEmitter {
    fn emit(&self, transition: &Transition) {
        if self.sender.send(transition.clone()).is_err() {
            debug!(
                "No subscribers for transition {}, dropping it",
                transition.id
            );
        }
    }

    fn name(&self) -> &str {
        "broadcast"
    }
}

/// Keeps the most recent transitions in memory
#[derive(Debug)]
pub struct HistoryEmitter {
    capacity: usize,
    history: Mutex<VecDeque<Transition>>,
}

impl Default for HistoryEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryEmitter {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            history: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Most recent transitions, newest last
    pub fn recent(&self) -> Vec<Transition> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }
}

impl AlertEmitter for HistoryEmitter {
    fn emit(&self, transition: &Transition) {
        if self.capacity == 0 {
            return;
        }
        let mut history = self.history.lock();
        while history.len() >= self.capacity {
            history.pop_front();
        }
        history.push_back(transition.clone());
    }

    fn name(&self) -> &str {
        "history"
    }
}

/// Delivers every transition to each registered emitter in turn.
///
/// A panicking emitter is logged and skipped; the others still receive
/// the transition.
#[derive(Debug, Default, Clone)]
pub struct FanoutEmitter {
    emitters: Vec<Arc<dyn AlertEmitter>>,
}

impl FanoutEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, emitter: Arc<dyn AlertEmitter>) -> Self {
        self.emitters.push(emitter);
        self
    }

    pub fn push(&mut self, emitter: Arc<dyn AlertEmitter>) {
        self.emitters.push(emitter);
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.emitters.iter().map(|emitter| emitter.name()).collect()
    }
}

impl AlertEmitter for FanoutEmitter {
    fn emit(&self, transition: &Transition) {
        for emitter in &self.emitters {
            if catch_unwind(AssertUnwindSafe(|| emitter.emit(transition))).is_err() {
                warn!(
                    "Alert emitter {} panicked on transition {}, dropping it",
                    emitter.name(),
                    transition.id
                );
            }
        }
    }

    fn name(&self) -> &str {
        "fanout"
    }
}

//! Scripted probes

use parking_lot::Mutex;
use readiness_orchestrator::core::probe::{ErrorKind, Probe, ProbeFailure};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// What the next probe call does
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Script {
    Healthy,
    Fail(ErrorKind),
    /// Succeed after the given delay
    Slow(Duration),
    /// Never answer
    Hang,
    Panic,
}

/// Probe following a switchable script and counting its calls
#[derive(Debug)]
pub struct ScriptedProbe {
    script: Mutex<Script>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn healthy() -> Arc<Self> {
        Self::new(Script::Healthy)
    }

    pub fn set(&self, script: Script) {
        *self.script.lock() = script;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Probe for ScriptedProbe {
    async fn probe(&self, _deadline: Instant) -> Result<(), ProbeFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = *self.script.lock();
        match script {
            Script::Healthy => Ok(()),
            Script::Fail(kind) => Err(ProbeFailure::new(kind, "scripted failure")),
            Script::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Script::Hang => {
                futures::future::pending::<()>().await;
                Ok(())
            }
            Script::Panic => panic!("scripted panic"),
        }
    }
}

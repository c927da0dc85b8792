//! Alert manager wiring emitters from configuration

use super::channels::WebhookEmitter;
use super::emitter::{AlertEmitter, BroadcastEmitter, FanoutEmitter, HistoryEmitter, LogEmitter};
use super::types::Transition;
use crate::config::AlertsConfig;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Routes every transition to the configured emitters.
///
/// Always keeps an in-memory history and an in-process broadcast channel;
/// logging and the webhook are enabled by configuration.
#[derive(Debug, Clone)]
pub struct AlertManager {
    fanout: FanoutEmitter,
    broadcast: BroadcastEmitter,
    history: Arc<HistoryEmitter>,
}

impl AlertManager {
    pub fn from_config(config: &AlertsConfig) -> Result<Self> {
        let broadcast = BroadcastEmitter::new(config.broadcast_capacity);
        let history = Arc::new(HistoryEmitter::default());

        let mut fanout = FanoutEmitter::new()
            .with(Arc::new(broadcast.clone()))
            .with(history.clone());
        if config.log {
            fanout.push(Arc::new(LogEmitter));
        }
        if let Some(url) = &config.webhook_url {
            let client = reqwest::Client::builder()
                .user_agent(concat!("readiness-orchestrator/", env!("CARGO_PKG_VERSION")))
                .build()?;
            fanout.push(Arc::new(WebhookEmitter::with_client(client, url.clone())));
        }

        info!("Alert emitters enabled: {:?}", fanout.names());
        Ok(Self {
            fanout,
            broadcast,
            history,
        })
    }

    /// Register an additional emitter
    pub fn with_emitter(mut self, emitter: Arc<dyn AlertEmitter>) -> Self {
        self.fanout.push(emitter);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Transition> {
        self.broadcast.subscribe()
    }

    /// Most recent transitions, newest last
    pub fn recent(&self) -> Vec<Transition> {
        self.history.recent()
    }

    pub fn emitter_names(&self) -> Vec<&str> {
        self.fanout.names()
    }
}

impl AlertEmitter for AlertManager {
    fn emit(&self, transition: &Transition) {
        self.fanout.emit(transition);
    }

    fn name(&self) -> &str {
        "manager"
    }
}

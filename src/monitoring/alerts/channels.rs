//! Outbound alert channels

use super::emitter::AlertEmitter;
use super::types::Transition;
use crate::utils::error::{ReadinessError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Default timeout for a single webhook delivery
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of transitions waiting for delivery before new ones are dropped
pub const DEFAULT_WEBHOOK_QUEUE: usize = 64;

#[derive(Debug, Default)]
struct DeliveryStats {
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Everything the delivery task needs; owns no queue handle
#[derive(Debug, Clone)]
struct Delivery {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    stats: Arc<DeliveryStats>,
}

impl Delivery {
    async fn post(&self, transition: &Transition) -> Result<()> {
        let payload = serde_json::json!({
            "text": transition.summary(),
            "transition": transition,
        });

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReadinessError::alert(format!(
                "alert webhook returned status: {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn drain(self, mut receiver: mpsc::Receiver<Transition>) {
        while let Some(transition) = receiver.recv().await {
            match self.post(&transition).await {
                Ok(()) => {
                    self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                    debug!("Delivered transition {} to webhook", transition.id);
                }
                Err(e) => {
                    self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "Failed to deliver transition {} to {}: {}",
                        transition.id, self.url, e
                    );
                }
            }
        }
        debug!("Webhook delivery task for {} stopped", self.url);
    }
}

/// Posts each transition as JSON to a webhook.
///
/// Transitions go through a bounded queue drained by a single delivery task,
/// started on first use. When the queue is full the transition is dropped and
/// counted as failed; delivery errors are logged and dropped too.
#[derive(Debug, Clone)]
pub struct WebhookEmitter {
    delivery: Delivery,
    capacity: usize,
    queue: Arc<Mutex<Option<mpsc::Sender<Transition>>>>,
}

impl WebhookEmitter {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            delivery: Delivery {
                client,
                url: url.into(),
                timeout: DEFAULT_WEBHOOK_TIMEOUT,
                stats: Arc::new(DeliveryStats::default()),
            },
            capacity: DEFAULT_WEBHOOK_QUEUE,
            queue: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.delivery.timeout = timeout;
        self
    }

    /// Queue length; at least 1
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn url(&self) -> &str {
        &self.delivery.url
    }

    pub fn delivered(&self) -> u64 {
        self.delivery.stats.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.delivery.stats.failed.load(Ordering::Relaxed)
    }

    /// Post one transition and wait for the response, bypassing the queue
    pub async fn deliver(&self, transition: &Transition) -> Result<()> {
        self.delivery.post(transition).await
    }

    fn drop_transition(&self, transition: &Transition, reason: &str) {
        self.delivery.stats.failed.fetch_add(1, Ordering::Relaxed);
        warn!("Dropping transition {}: {}", transition.id, reason);
    }

    /// Sender of a live delivery task, starting one if needed
    fn sender(&self, runtime: &tokio::runtime::Handle) -> mpsc::Sender<Transition> {
        let mut queue = self.queue.lock();
        if let Some(sender) = queue.as_ref().filter(|sender| !sender.is_closed()) {
            return sender.clone();
        }

        let (sender, receiver) = mpsc::channel(self.capacity);
        runtime.spawn(self.delivery.clone().drain(receiver));
        *queue = Some(sender.clone());
        sender
    }
}

impl AlertEmitter for WebhookEmitter {
    fn emit(&self, transition: &Transition) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.drop_transition(transition, "no async runtime to deliver it");
            return;
        };

        match self.sender(&runtime).try_send(transition.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.drop_transition(transition, "webhook queue is full");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.drop_transition(transition, "webhook delivery task stopped");
            }
        }
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

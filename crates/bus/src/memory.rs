use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use event_store::EventEnvelope;

use crate::{EventBus, EventBusError, Result};

/// A message delivered through the in-memory bus.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    /// Destination bucket.
    pub bucket: String,
    /// Destination subset within the bucket.
    pub subset: String,
    /// The delivered envelope.
    pub envelope: EventEnvelope,
}

/// In-memory event bus.
///
/// Records every delivery for inspection and can be told to refuse
/// publishes, which the pipeline tests use to exercise the
/// publication failure path.
#[derive(Clone, Default)]
pub struct InMemoryEventBus {
    messages: Arc<RwLock<Vec<PublishedMessage>>>,
    fail_on_publish: Arc<AtomicBool>,
}

impl InMemoryEventBus {
    /// Creates a new empty in-memory bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the bus to refuse all publishes.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.fail_on_publish.store(fail, Ordering::SeqCst);
    }

    /// Returns all delivered messages in publication order.
    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.messages.read().await.clone()
    }

    /// Returns the number of delivered messages.
    pub async fn published_count(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Returns the messages delivered to a specific destination.
    pub async fn messages_for(&self, bucket: &str, subset: &str) -> Vec<PublishedMessage> {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| m.bucket == bucket && m.subset == subset)
            .cloned()
            .collect()
    }

    /// Drops all recorded messages.
    pub async fn clear(&self) {
        self.messages.write().await.clear();
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, envelope: EventEnvelope, bucket: &str, subset: &str) -> Result<()> {
        if self.fail_on_publish.load(Ordering::SeqCst) {
            return Err(EventBusError::Delivery(format!(
                "publish to {bucket}/{subset} refused"
            )));
        }

        tracing::debug!(bucket, subset, event_type = %envelope.event_type, "event published");
        self.messages.write().await.push(PublishedMessage {
            bucket: bucket.to_string(),
            subset: subset.to_string(),
            envelope,
        });
        Ok(())
    }
}

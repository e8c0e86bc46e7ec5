use async_trait::async_trait;

use event_store::EventEnvelope;

use crate::Result;

/// Core trait for event bus implementations.
///
/// A destination is named by a bucket (stream or exchange) and a subset
/// (partition or routing key within it). Implementations must be safe for
/// concurrent use; delivery order is only guaranteed per publisher call
/// sequence, not across publishers.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publishes a single envelope to `bucket`/`subset`.
    async fn publish(&self, envelope: EventEnvelope, bucket: &str, subset: &str) -> Result<()>;
}

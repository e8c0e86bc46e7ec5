use thiserror::Error;

/// Errors that can occur when publishing to the event bus.
#[derive(Debug, Error)]
pub enum EventBusError {
    /// The message could not be delivered to the destination.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// A serialization error occurred while encoding the message.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event bus operations.
pub type Result<T> = std::result::Result<T, EventBusError>;

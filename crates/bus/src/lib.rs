//! Event bus contract and in-memory implementation.
//!
//! The bus is the notification side of the command pipeline: persisted
//! events are delivered to a bucket/subset destination, and classified
//! command failures go to the `errors` subset of the same bucket.

pub mod error;
pub mod memory;
pub mod publisher;

pub use error::{EventBusError, Result};
pub use memory::{InMemoryEventBus, PublishedMessage};
pub use publisher::EventBus;

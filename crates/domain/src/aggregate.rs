//! Core aggregate and domain event traits.

use common::{AggregateId, CommandId};
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// This is used for serialization, storage, and bus routing.
    fn event_type(&self) -> &'static str;
}

/// Trait for aggregates in an event-sourced system.
///
/// A fresh, zero-valued instance is constructed for every command
/// invocation — aggregates are never pooled or reused across commands, so
/// no state can leak between unrelated requests.
///
/// Event application is fallible: history replayed from the store or events
/// freshly raised by a command can be rejected by the aggregate's own
/// rules. Rejections are not returned to the replaying caller; they are
/// parked in the replay-error slot, which the command pipeline inspects
/// after loading and again after dispatch.
pub trait Aggregate: Default + Send + Sync {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate can produce.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the aggregate type name.
    ///
    /// Used for event store organization and bus routing.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's identity.
    ///
    /// None until an identity-establishing event has been applied.
    fn id(&self) -> Option<AggregateId>;

    /// Applies an event to the aggregate state.
    ///
    /// Must be deterministic and free of side effects. An event that does
    /// not fit the current state is rejected with the aggregate's error
    /// type.
    fn apply(&mut self, event: Self::Event) -> Result<(), Self::Error>;

    /// Returns the parked event-application error, if any.
    fn replay_error(&self) -> Option<&Self::Error>;

    /// Parks an event-application error.
    fn set_replay_error(&mut self, error: Self::Error);

    /// Takes the parked error, leaving the slot empty.
    fn take_replay_error(&mut self) -> Option<Self::Error>;

    /// Events raised by the current command, awaiting persistence.
    fn pending_events(&self) -> &[Self::Event];

    /// Queues an event for persistence without applying it.
    fn push_pending(&mut self, event: Self::Event);

    /// Records the id of the command that produced the pending events.
    fn attach_command_id(&mut self, id: CommandId);

    /// The command id last attached for traceability, if any.
    fn command_id(&self) -> Option<CommandId>;

    /// Applies one event, parking a rejection in the replay-error slot.
    ///
    /// Once an error is parked the aggregate state is suspect, so later
    /// events are skipped; the first error wins.
    fn replay(&mut self, event: Self::Event) {
        if self.replay_error().is_some() {
            return;
        }
        if let Err(error) = self.apply(event) {
            self.set_replay_error(error);
        }
    }

    /// Replays a sequence of events in order.
    fn replay_all(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.replay(event);
        }
    }

    /// Raises a new event: applies it and queues it for persistence.
    ///
    /// Command handlers on the aggregate use this for every event they
    /// produce. A rejected event still lands in the pending queue, but the
    /// parked error stops the pipeline before anything is persisted.
    fn raise(&mut self, event: Self::Event) {
        self.replay(event.clone());
        self.push_pending(event);
    }

    /// Returns true if a replay error is parked.
    fn has_replay_error(&self) -> bool {
        self.replay_error().is_some()
    }
}

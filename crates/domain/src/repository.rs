//! Aggregate store facade pairing an event store with an event bus.

use bus::{EventBus, EventBusError};
use common::AggregateId;
use event_store::{
    AppendOptions, EventEnvelope, EventStore, EventStoreError, Version,
};
use thiserror::Error;

use crate::aggregate::{Aggregate, DomainEvent};
use crate::failure::Failure;

/// Metadata key under which the originating command id is stamped on
/// persisted envelopes.
pub const COMMAND_ID_METADATA_KEY: &str = "command_id";

/// Errors surfaced by [`Repository`] operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The event store failed.
    #[error("event store error: {0}")]
    Store(#[from] EventStoreError),

    /// The event bus failed.
    #[error("event bus error: {0}")]
    Bus(#[from] EventBusError),

    /// An event payload could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The aggregate has no identity to persist events under.
    #[error("aggregate has no identity to save under")]
    MissingAggregateId,
}

/// Facade over the event store and event bus, offering the four operations
/// the command pipeline drives: load, save, publish, and the errors side
/// channel.
#[derive(Clone)]
pub struct Repository<S, B> {
    store: S,
    bus: B,
}

impl<S, B> Repository<S, B>
where
    S: EventStore,
    B: EventBus,
{
    /// Creates a repository over the given store and bus.
    pub fn new(store: S, bus: B) -> Self {
        Self { store, bus }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the underlying event bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Replays persisted history into `aggregate`.
    ///
    /// Store and deserialization errors are returned. Events the aggregate
    /// itself rejects are parked in its replay-error slot instead; the
    /// pipeline inspects the slot after loading.
    pub async fn load<A: Aggregate>(
        &self,
        aggregate: &mut A,
        aggregate_id: AggregateId,
    ) -> Result<(), RepositoryError> {
        let envelopes = self.store.get_events_for_aggregate(aggregate_id).await?;
        for envelope in envelopes {
            let event: A::Event = serde_json::from_value(envelope.payload)?;
            aggregate.replay(event);
        }
        Ok(())
    }

    /// Persists the aggregate's pending events iff the stored version still
    /// equals `expected_version`.
    ///
    /// Envelopes are numbered `expected_version + 1` onwards and stamped
    /// with the attached command id. Returns the envelopes exactly as
    /// persisted so the caller can publish the same data. With no pending
    /// events the store is not touched and the result is empty.
    pub async fn save<A: Aggregate>(
        &self,
        aggregate: &A,
        expected_version: Version,
    ) -> Result<Vec<EventEnvelope>, RepositoryError> {
        let events = aggregate.pending_events();
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let aggregate_id = aggregate.id().ok_or(RepositoryError::MissingAggregateId)?;

        let mut envelopes = Vec::with_capacity(events.len());
        let mut version = expected_version;
        for event in events {
            version = version.next();
            let mut envelope = EventEnvelope::new(
                event.event_type(),
                aggregate_id,
                A::aggregate_type(),
                version,
                event,
            )?;
            if let Some(command_id) = aggregate.command_id() {
                envelope = envelope
                    .with_metadata(COMMAND_ID_METADATA_KEY, serde_json::json!(command_id));
            }
            envelopes.push(envelope);
        }

        let options = if expected_version == Version::initial() {
            AppendOptions::expect_new()
        } else {
            AppendOptions::expect_version(expected_version)
        };
        self.store.append(envelopes.clone(), options).await?;

        Ok(envelopes)
    }

    /// Publishes persisted envelopes to `bucket`/`subset`, in order.
    pub async fn publish_events(
        &self,
        envelopes: &[EventEnvelope],
        bucket: &str,
        subset: &str,
    ) -> Result<(), RepositoryError> {
        for envelope in envelopes {
            self.bus.publish(envelope.clone(), bucket, subset).await?;
        }
        Ok(())
    }

    /// Publishes a classified failure to the errors side channel.
    ///
    /// Best-effort: the pipeline logs a failed notice publication but never
    /// lets it mask the classified failure itself.
    pub async fn publish_error(
        &self,
        failure: &Failure,
        bucket: &str,
        subset: &str,
    ) -> Result<(), RepositoryError> {
        let notice = failure.to_notice();
        let envelope = EventEnvelope::new(
            "CommandFailed",
            failure.aggregate_id(),
            failure.aggregate_type(),
            Version::initial(),
            &notice,
        )?;
        self.bus.publish(envelope, bucket, subset).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus::InMemoryEventBus;
    use common::CommandId;
    use event_store::InMemoryEventStore;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum TallyEvent {
        Opened { id: AggregateId },
        Counted { amount: i64 },
    }

    impl DomainEvent for TallyEvent {
        fn event_type(&self) -> &'static str {
            match self {
                TallyEvent::Opened { .. } => "TallyOpened",
                TallyEvent::Counted { .. } => "TallyCounted",
            }
        }
    }

    #[derive(Debug, thiserror::Error)]
    enum TallyError {
        #[error("tally not opened")]
        NotOpened,
    }

    #[derive(Debug, Default)]
    struct Tally {
        id: Option<AggregateId>,
        total: i64,
        replay_error: Option<TallyError>,
        pending: Vec<TallyEvent>,
        command_id: Option<CommandId>,
    }

    impl Aggregate for Tally {
        type Event = TallyEvent;
        type Error = TallyError;

        fn aggregate_type() -> &'static str {
            "Tally"
        }

        fn id(&self) -> Option<AggregateId> {
            self.id
        }

        fn apply(&mut self, event: Self::Event) -> Result<(), Self::Error> {
            match event {
                TallyEvent::Opened { id } => {
                    self.id = Some(id);
                    Ok(())
                }
                TallyEvent::Counted { amount } => {
                    if self.id.is_none() {
                        return Err(TallyError::NotOpened);
                    }
                    self.total += amount;
                    Ok(())
                }
            }
        }

        fn replay_error(&self) -> Option<&Self::Error> {
            self.replay_error.as_ref()
        }

        fn set_replay_error(&mut self, error: Self::Error) {
            self.replay_error = Some(error);
        }

        fn take_replay_error(&mut self) -> Option<Self::Error> {
            self.replay_error.take()
        }

        fn pending_events(&self) -> &[Self::Event] {
            &self.pending
        }

        fn push_pending(&mut self, event: Self::Event) {
            self.pending.push(event);
        }

        fn attach_command_id(&mut self, id: CommandId) {
            self.command_id = Some(id);
        }

        fn command_id(&self) -> Option<CommandId> {
            self.command_id
        }
    }

    fn repository() -> Repository<InMemoryEventStore, InMemoryEventBus> {
        Repository::new(InMemoryEventStore::new(), InMemoryEventBus::new())
    }

    #[tokio::test]
    async fn save_assigns_sequential_versions() {
        let repo = repository();
        let id = AggregateId::new();

        let mut tally = Tally::default();
        tally.raise(TallyEvent::Opened { id });
        tally.raise(TallyEvent::Counted { amount: 5 });

        let envelopes = repo.save(&tally, Version::initial()).await.unwrap();

        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].version, Version::first());
        assert_eq!(envelopes[1].version, Version::new(2));
        assert_eq!(envelopes[0].aggregate_type, "Tally");
        assert_eq!(repo.store().event_count().await, 2);
    }

    #[tokio::test]
    async fn save_stamps_command_id_metadata() {
        let repo = repository();
        let id = AggregateId::new();
        let command_id = CommandId::new();

        let mut tally = Tally::default();
        tally.raise(TallyEvent::Opened { id });
        tally.attach_command_id(command_id);

        let envelopes = repo.save(&tally, Version::initial()).await.unwrap();

        assert_eq!(
            envelopes[0].metadata.get(COMMAND_ID_METADATA_KEY),
            Some(&serde_json::json!(command_id))
        );
    }

    #[tokio::test]
    async fn save_without_pending_events_is_a_no_op() {
        let repo = repository();
        let tally = Tally::default();

        let envelopes = repo.save(&tally, Version::initial()).await.unwrap();
        assert!(envelopes.is_empty());
        assert_eq!(repo.store().event_count().await, 0);
    }

    #[tokio::test]
    async fn save_without_identity_is_rejected() {
        let repo = repository();

        let mut tally = Tally::default();
        // Queue an event without ever establishing the identity.
        tally.push_pending(TallyEvent::Counted { amount: 1 });

        let result = repo.save(&tally, Version::initial()).await;
        assert!(matches!(result, Err(RepositoryError::MissingAggregateId)));
    }

    #[tokio::test]
    async fn save_conflicts_on_stale_version() {
        let repo = repository();
        let id = AggregateId::new();

        let mut first = Tally::default();
        first.raise(TallyEvent::Opened { id });
        repo.save(&first, Version::initial()).await.unwrap();

        // A second writer that never observed the first save.
        let mut second = Tally::default();
        second.raise(TallyEvent::Opened { id });
        let result = repo.save(&second, Version::initial()).await;

        assert!(matches!(
            result,
            Err(RepositoryError::Store(
                EventStoreError::ConcurrencyConflict { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn load_replays_saved_history() {
        let repo = repository();
        let id = AggregateId::new();

        let mut tally = Tally::default();
        tally.raise(TallyEvent::Opened { id });
        tally.raise(TallyEvent::Counted { amount: 7 });
        repo.save(&tally, Version::initial()).await.unwrap();

        let mut restored = Tally::default();
        repo.load(&mut restored, id).await.unwrap();

        assert_eq!(restored.id(), Some(id));
        assert_eq!(restored.total, 7);
        assert!(!restored.has_replay_error());
    }

    #[tokio::test]
    async fn load_parks_rejected_history_on_the_aggregate() {
        let repo = repository();
        let id = AggregateId::new();

        // Corrupt history: a count with no preceding open.
        let envelope = EventEnvelope::new(
            "TallyCounted",
            id,
            "Tally",
            Version::first(),
            &TallyEvent::Counted { amount: 3 },
        )
        .unwrap();
        repo.store()
            .append(vec![envelope], AppendOptions::expect_new())
            .await
            .unwrap();

        let mut restored = Tally::default();
        repo.load(&mut restored, id).await.unwrap();

        assert!(restored.has_replay_error());
    }

    #[tokio::test]
    async fn publish_events_delivers_in_order() {
        let repo = repository();
        let id = AggregateId::new();

        let mut tally = Tally::default();
        tally.raise(TallyEvent::Opened { id });
        tally.raise(TallyEvent::Counted { amount: 1 });
        let envelopes = repo.save(&tally, Version::initial()).await.unwrap();

        repo.publish_events(&envelopes, "bank", "tally")
            .await
            .unwrap();

        let messages = repo.bus().messages_for("bank", "tally").await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].envelope.event_type, "TallyOpened");
        assert_eq!(messages[1].envelope.event_type, "TallyCounted");
        assert_eq!(messages[0].envelope.event_id, envelopes[0].event_id);
    }
}

//! The command handling pipeline.
//!
//! One invocation drives a single command through a fixed stage sequence:
//! conditional load, replay check, dispatch, post-dispatch replay check,
//! identity validation, traceability stamping, optimistic-concurrency save,
//! and event publication. A failing stage aborts the rest, and every failed
//! invocation is classified with exactly one [`FailureKind`] and reported
//! once to the errors side channel.

use std::marker::PhantomData;

use bus::EventBus;
use event_store::{EventStore, Version};

use crate::aggregate::Aggregate;
use crate::command::{Command, HandleCommand};
use crate::failure::{Failure, FailureKind, MissingInitialEvent};
use crate::repository::Repository;

/// Subset within the handler's bucket that receives failure notices.
pub const ERRORS_SUBSET: &str = "errors";

/// Handler driving commands against one aggregate type.
///
/// The aggregate type is bound at construction; a fresh instance is built
/// for every invocation. The handler holds no per-command state, so one
/// instance can serve concurrent invocations for different commands.
pub struct CommandHandler<S, B, A>
where
    S: EventStore,
    B: EventBus,
    A: Aggregate,
{
    repository: Repository<S, B>,
    bucket: String,
    subset: String,
    _phantom: PhantomData<A>,
}

impl<S, B, A> CommandHandler<S, B, A>
where
    S: EventStore,
    B: EventBus,
    A: Aggregate,
{
    /// Creates a handler publishing to `bucket`/`subset`.
    ///
    /// Failure notices go to the [`ERRORS_SUBSET`] of the same bucket.
    pub fn new(
        repository: Repository<S, B>,
        bucket: impl Into<String>,
        subset: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            bucket: bucket.into(),
            subset: subset.into(),
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &Repository<S, B> {
        &self.repository
    }

    /// Handles one command, reporting exactly one outcome.
    ///
    /// On failure, the classified [`Failure`] is additionally published to
    /// the errors subset before it is returned; a failed notice publication
    /// is logged and never masks the failure itself.
    #[tracing::instrument(skip(self), fields(aggregate_type = A::aggregate_type()))]
    pub async fn handle<C>(&self, command: &C) -> Result<(), Failure>
    where
        C: Command<Aggregate = A>,
        A: HandleCommand<C>,
    {
        metrics::counter!("commands_handled_total").increment(1);
        let started = std::time::Instant::now();

        let outcome = self.run(command).await;

        if let Err(failure) = &outcome {
            metrics::counter!("command_failures_total", "kind" => failure.kind().as_str())
                .increment(1);
            tracing::warn!(kind = %failure.kind(), cause = %failure.cause(), "command failed");

            if let Err(error) = self
                .repository
                .publish_error(failure, &self.bucket, ERRORS_SUBSET)
                .await
            {
                tracing::warn!(%error, "failure notice could not be published");
            }
        }

        metrics::histogram!("command_duration_seconds").record(started.elapsed().as_secs_f64());
        outcome
    }

    /// The stage sequence. [`CommandHandler::handle`] wraps it so failure
    /// reporting runs on every exit path.
    async fn run<C>(&self, command: &C) -> Result<(), Failure>
    where
        C: Command<Aggregate = A>,
        A: HandleCommand<C>,
    {
        // The version the caller observed. The save in stage 8 uses it
        // untouched, no matter how many events dispatch raises in between.
        let expected_version = command.expected_version();
        let mut aggregate = A::default();

        // Version 0 is the create path: there is no history to replay.
        if expected_version != Version::initial() {
            if let Err(error) = self
                .repository
                .load(&mut aggregate, command.aggregate_id())
                .await
            {
                return Err(Failure::new(error, FailureKind::LoadingEvents, command));
            }
        }

        // Replay can fail inside the aggregate even when the store read
        // succeeded.
        if let Some(error) = aggregate.take_replay_error() {
            return Err(Failure::new(error, FailureKind::ReplayingEvents, command));
        }

        if let Err(error) = aggregate.handle_command(command) {
            return Err(Failure::new(error, FailureKind::ProcessingCommand, command));
        }

        // Dispatch applies freshly raised events, and those can be rejected
        // too.
        if let Some(error) = aggregate.take_replay_error() {
            return Err(Failure::new(error, FailureKind::ReplayingEvents, command));
        }

        // A command on a brand-new aggregate must establish the identity
        // itself; an empty identity after dispatch means the initial event
        // was never produced.
        if aggregate.id().is_none() {
            return Err(Failure::new(
                MissingInitialEvent,
                FailureKind::InvalidId,
                command,
            ));
        }

        aggregate.attach_command_id(command.command_id());

        let envelopes = match self.repository.save(&aggregate, expected_version).await {
            Ok(envelopes) => envelopes,
            Err(error) => {
                return Err(Failure::new(error, FailureKind::SavingOnStorage, command));
            }
        };

        if let Err(error) = self
            .repository
            .publish_events(&envelopes, &self.bucket, &self.subset)
            .await
        {
            return Err(Failure::new(error, FailureKind::PublishingEvents, command));
        }

        Ok(())
    }
}

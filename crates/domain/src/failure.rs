//! Failure classification for the command pipeline.

use common::{AggregateId, CommandId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::Aggregate;
use crate::command::Command;

/// The pipeline stage a failed invocation is attributed to.
///
/// Kinds are checked in stage order and exactly one is attributed per
/// failed invocation, so upstream retry and alerting logic can branch on
/// the kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Reading or replaying history from the store failed.
    LoadingEvents,

    /// An event failed to apply to the aggregate. Covers both bad history
    /// and bad freshly-raised events; the wrapped cause tells them apart.
    ReplayingEvents,

    /// The aggregate rejected the command.
    ProcessingCommand,

    /// Dispatch succeeded but never established the aggregate identity.
    InvalidId,

    /// Persisting the produced events failed, including version conflicts.
    SavingOnStorage,

    /// The persisted events could not be delivered to the bus.
    PublishingEvents,
}

impl FailureKind {
    /// Returns the kind name as used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::LoadingEvents => "loading_events",
            FailureKind::ReplayingEvents => "replaying_events",
            FailureKind::ProcessingCommand => "processing_command",
            FailureKind::InvalidId => "invalid_id",
            FailureKind::SavingOnStorage => "saving_on_storage",
            FailureKind::PublishingEvents => "publishing_events",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sentinel cause used when a dispatched command never produced the
/// identity-establishing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid aggregate id: initial event missing")]
pub struct MissingInitialEvent;

/// The sole error surfaced by the command pipeline.
///
/// Wraps the underlying cause with a stage classification and the
/// identifying data of the originating command. Callers branch on the
/// kind; the cause is preserved for diagnostics.
#[derive(Debug, Error)]
#[error("{kind} failure for command {command_id} on {aggregate_type} {aggregate_id}: {cause}")]
pub struct Failure {
    kind: FailureKind,
    #[source]
    cause: Box<dyn std::error::Error + Send + Sync>,
    command_id: CommandId,
    aggregate_id: AggregateId,
    aggregate_type: &'static str,
}

impl Failure {
    /// Wraps `cause` with a stage classification and the originating command.
    pub fn new<C: Command>(
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
        kind: FailureKind,
        command: &C,
    ) -> Self {
        Self {
            kind,
            cause: cause.into(),
            command_id: command.command_id(),
            aggregate_id: command.aggregate_id(),
            aggregate_type: <C::Aggregate as Aggregate>::aggregate_type(),
        }
    }

    /// Returns the failure classification.
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Returns the wrapped cause.
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync) {
        self.cause.as_ref()
    }

    /// Returns the id of the originating command.
    pub fn command_id(&self) -> CommandId {
        self.command_id
    }

    /// Returns the id of the targeted aggregate.
    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    /// Returns the type name of the targeted aggregate.
    pub fn aggregate_type(&self) -> &'static str {
        self.aggregate_type
    }

    /// Builds the serializable notice published to the errors subset.
    pub fn to_notice(&self) -> FailureNotice {
        FailureNotice {
            kind: self.kind,
            reason: self.cause.to_string(),
            command_id: self.command_id,
            aggregate_id: self.aggregate_id,
            aggregate_type: self.aggregate_type.to_string(),
        }
    }
}

/// Serializable side-channel notification of a classified failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureNotice {
    /// The failure classification.
    pub kind: FailureKind,

    /// Stringified underlying cause.
    pub reason: String,

    /// Id of the originating command.
    pub command_id: CommandId,

    /// Id of the targeted aggregate.
    pub aggregate_id: AggregateId,

    /// Type name of the targeted aggregate.
    pub aggregate_type: String,
}

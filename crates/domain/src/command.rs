//! Command traits: the input contract of the pipeline.

use common::{AggregateId, CommandId};
use event_store::Version;

use crate::aggregate::Aggregate;

/// Trait for commands that can be executed against an aggregate.
///
/// A command is an immutable value object: it names its target aggregate
/// instance, carries the version the caller last observed, and has its own
/// unique id for traceability. The payload is whatever fields the concrete
/// command type defines.
pub trait Command: std::fmt::Debug + Send + Sync {
    /// The type of aggregate this command targets.
    type Aggregate: Aggregate;

    /// Returns the ID of the aggregate this command targets.
    fn aggregate_id(&self) -> AggregateId;

    /// Returns the unique id of this command.
    fn command_id(&self) -> CommandId;

    /// Returns the aggregate version the caller last observed.
    ///
    /// [`Version::initial`] (0) means the aggregate is being created and no
    /// history is loaded. Any other value is used unchanged as the
    /// optimistic-concurrency token at save time.
    fn expected_version(&self) -> Version;
}

/// Command-handling capability of an aggregate.
///
/// One implementation per accepted command type. The handler validates the
/// command against current state and raises the resulting events via
/// [`Aggregate::raise`]; it does not persist anything itself.
pub trait HandleCommand<C>: Aggregate
where
    C: Command<Aggregate = Self>,
{
    /// Handles the command, raising zero or more events.
    fn handle_command(&mut self, command: &C) -> Result<(), Self::Error>;
}

//! Command handling pipeline for event-sourced aggregates.
//!
//! This crate provides the core abstractions and the pipeline itself:
//! - Aggregate and DomainEvent traits for event-sourced entities
//! - Command and HandleCommand traits for the dispatch seam
//! - Failure taxonomy classifying every failed invocation
//! - Repository facade over the event store and event bus
//! - CommandHandler driving the load/dispatch/validate/save/publish stages
//! - Account aggregate as the reference business domain

pub mod account;
pub mod aggregate;
pub mod command;
pub mod failure;
pub mod handler;
pub mod repository;

pub use account::{
    Account, AccountError, AccountEvent, AccountService, CloseAccount, DepositMoney, Money,
    OpenAccount, WithdrawMoney,
};
pub use aggregate::{Aggregate, DomainEvent};
pub use command::{Command, HandleCommand};
pub use failure::{Failure, FailureKind, FailureNotice, MissingInitialEvent};
pub use handler::{CommandHandler, ERRORS_SUBSET};
pub use repository::{COMMAND_ID_METADATA_KEY, Repository, RepositoryError};

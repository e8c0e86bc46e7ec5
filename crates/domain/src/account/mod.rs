//! Bank account aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;
mod value_objects;

pub use aggregate::Account;
pub use commands::{CloseAccount, DepositMoney, OpenAccount, WithdrawMoney};
pub use events::{
    AccountClosedData, AccountEvent, AccountOpenedData, MoneyDepositedData, MoneyWithdrawnData,
};
pub use service::{ACCOUNT_BUCKET, ACCOUNT_SUBSET, AccountService};
pub use value_objects::Money;

use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    /// The account already has an identity.
    #[error("account already opened")]
    AlreadyOpened,

    /// No identity-establishing event has been applied yet.
    #[error("account is not opened")]
    NotOpened,

    /// The account is closed; no further operations apply.
    #[error("account is closed")]
    Closed,

    /// Deposits and withdrawals must move a positive amount.
    #[error("invalid amount: {amount} (must be positive)")]
    InvalidAmount { amount: Money },

    /// A withdrawal must not exceed the balance.
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Money, requested: Money },

    /// An account can only be closed once it is empty.
    #[error("cannot close account with remaining balance {balance}")]
    BalanceRemaining { balance: Money },
}

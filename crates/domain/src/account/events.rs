//! Account domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::Money;

/// Events that can occur on an account aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AccountEvent {
    /// Account was opened; establishes the identity.
    AccountOpened(AccountOpenedData),

    /// Money was deposited.
    MoneyDeposited(MoneyDepositedData),

    /// Money was withdrawn.
    MoneyWithdrawn(MoneyWithdrawnData),

    /// Account was closed (terminal).
    AccountClosed(AccountClosedData),
}

impl DomainEvent for AccountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::AccountOpened(_) => "AccountOpened",
            AccountEvent::MoneyDeposited(_) => "MoneyDeposited",
            AccountEvent::MoneyWithdrawn(_) => "MoneyWithdrawn",
            AccountEvent::AccountClosed(_) => "AccountClosed",
        }
    }
}

/// Data for AccountOpened event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOpenedData {
    /// The account identity.
    pub account_id: AggregateId,

    /// Name of the account owner.
    pub owner: String,

    /// When the account was opened.
    pub opened_at: DateTime<Utc>,
}

/// Data for MoneyDeposited event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneyDepositedData {
    /// Amount deposited.
    pub amount: Money,

    /// When the deposit happened.
    pub deposited_at: DateTime<Utc>,
}

/// Data for MoneyWithdrawn event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneyWithdrawnData {
    /// Amount withdrawn.
    pub amount: Money,

    /// When the withdrawal happened.
    pub withdrawn_at: DateTime<Utc>,
}

/// Data for AccountClosed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountClosedData {
    /// When the account was closed.
    pub closed_at: DateTime<Utc>,
}

// Convenience constructors for events
impl AccountEvent {
    /// Creates an AccountOpened event.
    pub fn account_opened(account_id: AggregateId, owner: impl Into<String>) -> Self {
        AccountEvent::AccountOpened(AccountOpenedData {
            account_id,
            owner: owner.into(),
            opened_at: Utc::now(),
        })
    }

    /// Creates a MoneyDeposited event.
    pub fn money_deposited(amount: Money) -> Self {
        AccountEvent::MoneyDeposited(MoneyDepositedData {
            amount,
            deposited_at: Utc::now(),
        })
    }

    /// Creates a MoneyWithdrawn event.
    pub fn money_withdrawn(amount: Money) -> Self {
        AccountEvent::MoneyWithdrawn(MoneyWithdrawnData {
            amount,
            withdrawn_at: Utc::now(),
        })
    }

    /// Creates an AccountClosed event.
    pub fn account_closed() -> Self {
        AccountEvent::AccountClosed(AccountClosedData {
            closed_at: Utc::now(),
        })
    }
}

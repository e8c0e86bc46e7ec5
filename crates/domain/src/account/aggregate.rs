//! Account aggregate implementation.

use common::{AggregateId, CommandId};

use crate::aggregate::Aggregate;

use super::{AccountError, AccountEvent, Money};

/// Bank account aggregate root.
///
/// Tracks the balance of a single account from opening to closure. A fresh
/// instance is built per command; history replays through
/// [`Aggregate::apply`] and the account rejects any event that does not fit
/// its state.
#[derive(Debug, Default)]
pub struct Account {
    /// Account identity; None until the opening event applies.
    id: Option<AggregateId>,

    /// Name of the account owner.
    owner: String,

    /// Current balance.
    balance: Money,

    /// Closed accounts accept no further events.
    closed: bool,

    replay_error: Option<AccountError>,
    pending: Vec<AccountEvent>,
    command_id: Option<CommandId>,
}

impl Aggregate for Account {
    type Event = AccountEvent;
    type Error = AccountError;

    fn aggregate_type() -> &'static str {
        "Account"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn apply(&mut self, event: Self::Event) -> Result<(), Self::Error> {
        match event {
            AccountEvent::AccountOpened(data) => {
                if self.id.is_some() {
                    return Err(AccountError::AlreadyOpened);
                }
                self.id = Some(data.account_id);
                self.owner = data.owner;
                Ok(())
            }
            AccountEvent::MoneyDeposited(data) => {
                self.ensure_open()?;
                if !data.amount.is_positive() {
                    return Err(AccountError::InvalidAmount {
                        amount: data.amount,
                    });
                }
                self.balance += data.amount;
                Ok(())
            }
            AccountEvent::MoneyWithdrawn(data) => {
                self.ensure_open()?;
                if !data.amount.is_positive() {
                    return Err(AccountError::InvalidAmount {
                        amount: data.amount,
                    });
                }
                if data.amount > self.balance {
                    return Err(AccountError::InsufficientFunds {
                        balance: self.balance,
                        requested: data.amount,
                    });
                }
                self.balance -= data.amount;
                Ok(())
            }
            AccountEvent::AccountClosed(_) => {
                self.ensure_open()?;
                if !self.balance.is_zero() {
                    return Err(AccountError::BalanceRemaining {
                        balance: self.balance,
                    });
                }
                self.closed = true;
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

// Query methods
impl Account {
    /// Returns the owner name.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the current balance.
    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Returns true once the account is closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), AccountError> {
        if self.id.is_none() {
            return Err(AccountError::NotOpened);
        }
        if self.closed {
            return Err(AccountError::Closed);
        }
        Ok(())
    }
}

// Command methods (validate, then raise)
impl Account {
    /// Opens the account, establishing its identity.
    pub fn open(
        &mut self,
        account_id: AggregateId,
        owner: impl Into<String>,
    ) -> Result<(), AccountError> {
        if self.id.is_some() {
            return Err(AccountError::AlreadyOpened);
        }
        self.raise(AccountEvent::account_opened(account_id, owner));
        Ok(())
    }

    /// Deposits a positive amount.
    pub fn deposit(&mut self, amount: Money) -> Result<(), AccountError> {
        self.ensure_open()?;
        if !amount.is_positive() {
            return Err(AccountError::InvalidAmount { amount });
        }
        self.raise(AccountEvent::money_deposited(amount));
        Ok(())
    }

    /// Withdraws a positive amount not exceeding the balance.
    pub fn withdraw(&mut self, amount: Money) -> Result<(), AccountError> {
        self.ensure_open()?;
        if !amount.is_positive() {
            return Err(AccountError::InvalidAmount { amount });
        }
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                balance: self.balance,
                requested: amount,
            });
        }
        self.raise(AccountEvent::money_withdrawn(amount));
        Ok(())
    }

    /// Closes an emptied account.
    pub fn close(&mut self) -> Result<(), AccountError> {
        self.ensure_open()?;
        if !self.balance.is_zero() {
            return Err(AccountError::BalanceRemaining {
                balance: self.balance,
            });
        }
        self.raise(AccountEvent::account_closed());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_account() -> (Account, AggregateId) {
        let mut account = Account::default();
        let account_id = AggregateId::new();
        account.open(account_id, "Alice").unwrap();
        (account, account_id)
    }

    #[test]
    fn open_establishes_identity() {
        let (account, account_id) = open_account();
        assert_eq!(account.id(), Some(account_id));
        assert_eq!(account.owner(), "Alice");
        assert_eq!(account.balance(), Money::zero());
        assert_eq!(account.pending_events().len(), 1);
        assert!(!account.has_replay_error());
    }

    #[test]
    fn open_twice_fails() {
        let (mut account, _) = open_account();
        let result = account.open(AggregateId::new(), "Bob");
        assert_eq!(result, Err(AccountError::AlreadyOpened));
    }

    #[test]
    fn deposit_increases_balance() {
        let (mut account, _) = open_account();
        account.deposit(Money::from_cents(1000)).unwrap();
        account.deposit(Money::from_cents(250)).unwrap();

        assert_eq!(account.balance(), Money::from_cents(1250));
        assert_eq!(account.pending_events().len(), 3);
    }

    #[test]
    fn deposit_requires_open_account() {
        let mut account = Account::default();
        let result = account.deposit(Money::from_cents(100));
        assert_eq!(result, Err(AccountError::NotOpened));
    }

    #[test]
    fn deposit_rejects_non_positive_amounts() {
        let (mut account, _) = open_account();
        assert_eq!(
            account.deposit(Money::zero()),
            Err(AccountError::InvalidAmount {
                amount: Money::zero()
            })
        );
        assert_eq!(
            account.deposit(Money::from_cents(-5)),
            Err(AccountError::InvalidAmount {
                amount: Money::from_cents(-5)
            })
        );
    }

    #[test]
    fn withdraw_decreases_balance() {
        let (mut account, _) = open_account();
        account.deposit(Money::from_cents(1000)).unwrap();
        account.withdraw(Money::from_cents(400)).unwrap();

        assert_eq!(account.balance(), Money::from_cents(600));
    }

    #[test]
    fn withdraw_rejects_overdraft() {
        let (mut account, _) = open_account();
        account.deposit(Money::from_cents(100)).unwrap();

        let result = account.withdraw(Money::from_cents(500));
        assert_eq!(
            result,
            Err(AccountError::InsufficientFunds {
                balance: Money::from_cents(100),
                requested: Money::from_cents(500),
            })
        );
        assert_eq!(account.balance(), Money::from_cents(100));
    }

    #[test]
    fn close_requires_zero_balance() {
        let (mut account, _) = open_account();
        account.deposit(Money::from_cents(100)).unwrap();

        assert_eq!(
            account.close(),
            Err(AccountError::BalanceRemaining {
                balance: Money::from_cents(100)
            })
        );

        account.withdraw(Money::from_cents(100)).unwrap();
        account.close().unwrap();
        assert!(account.is_closed());
    }

    #[test]
    fn closed_account_rejects_operations() {
        let (mut account, _) = open_account();
        account.close().unwrap();

        assert_eq!(
            account.deposit(Money::from_cents(100)),
            Err(AccountError::Closed)
        );
        assert_eq!(
            account.withdraw(Money::from_cents(100)),
            Err(AccountError::Closed)
        );
        assert_eq!(account.close(), Err(AccountError::Closed));
    }

    #[test]
    fn replaying_overdraft_history_parks_error() {
        let account_id = AggregateId::new();
        let mut account = Account::default();
        account.replay_all(vec![
            AccountEvent::account_opened(account_id, "Alice"),
            AccountEvent::money_deposited(Money::from_cents(100)),
            // Corrupt history: withdraws more than was ever deposited.
            AccountEvent::money_withdrawn(Money::from_cents(900)),
        ]);

        assert_eq!(
            account.replay_error(),
            Some(&AccountError::InsufficientFunds {
                balance: Money::from_cents(100),
                requested: Money::from_cents(900),
            })
        );
        // Balance stayed at the last consistent state.
        assert_eq!(account.balance(), Money::from_cents(100));
    }

    #[test]
    fn replay_rebuilds_state_without_pending_events() {
        let account_id = AggregateId::new();
        let mut account = Account::default();
        account.replay_all(vec![
            AccountEvent::account_opened(account_id, "Alice"),
            AccountEvent::money_deposited(Money::from_cents(500)),
            AccountEvent::money_withdrawn(Money::from_cents(200)),
        ]);

        assert_eq!(account.id(), Some(account_id));
        assert_eq!(account.balance(), Money::from_cents(300));
        assert!(account.pending_events().is_empty());
    }
}

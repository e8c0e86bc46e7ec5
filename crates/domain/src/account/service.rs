//! Account service providing a simplified API over the command pipeline.

use bus::EventBus;
use common::AggregateId;
use event_store::EventStore;

use crate::aggregate::Aggregate;
use crate::failure::Failure;
use crate::handler::CommandHandler;
use crate::repository::{Repository, RepositoryError};

use super::{Account, CloseAccount, DepositMoney, OpenAccount, WithdrawMoney};

/// Default bucket account events are published to.
pub const ACCOUNT_BUCKET: &str = "bank";

/// Default subset within the bucket.
pub const ACCOUNT_SUBSET: &str = "account";

/// Service for managing accounts.
///
/// Wraps a [`CommandHandler`] bound to the account aggregate, one method per
/// command. Every failure comes back as a classified [`Failure`].
pub struct AccountService<S: EventStore, B: EventBus> {
    handler: CommandHandler<S, B, Account>,
}

impl<S: EventStore, B: EventBus> AccountService<S, B> {
    /// Creates a service publishing to the default `bank`/`account`
    /// destination.
    pub fn new(store: S, bus: B) -> Self {
        Self::with_destination(store, bus, ACCOUNT_BUCKET, ACCOUNT_SUBSET)
    }

    /// Creates a service publishing to a custom destination.
    pub fn with_destination(
        store: S,
        bus: B,
        bucket: impl Into<String>,
        subset: impl Into<String>,
    ) -> Self {
        Self {
            handler: CommandHandler::new(Repository::new(store, bus), bucket, subset),
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, B, Account> {
        &self.handler
    }

    /// Opens a new account.
    #[tracing::instrument(skip(self))]
    pub async fn open_account(&self, cmd: OpenAccount) -> Result<(), Failure> {
        self.handler.handle(&cmd).await
    }

    /// Deposits money into an account.
    #[tracing::instrument(skip(self))]
    pub async fn deposit(&self, cmd: DepositMoney) -> Result<(), Failure> {
        self.handler.handle(&cmd).await
    }

    /// Withdraws money from an account.
    #[tracing::instrument(skip(self))]
    pub async fn withdraw(&self, cmd: WithdrawMoney) -> Result<(), Failure> {
        self.handler.handle(&cmd).await
    }

    /// Closes an emptied account.
    #[tracing::instrument(skip(self))]
    pub async fn close_account(&self, cmd: CloseAccount) -> Result<(), Failure> {
        self.handler.handle(&cmd).await
    }

    /// Loads an account by replaying its history.
    ///
    /// Returns None if the account doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_account(
        &self,
        account_id: AggregateId,
    ) -> Result<Option<Account>, RepositoryError> {
        let mut account = Account::default();
        self.handler
            .repository()
            .load(&mut account, account_id)
            .await?;
        if account.id().is_some() {
            Ok(Some(account))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Money;
    use bus::InMemoryEventBus;
    use event_store::{InMemoryEventStore, Version};

    fn service() -> AccountService<InMemoryEventStore, InMemoryEventBus> {
        AccountService::new(InMemoryEventStore::new(), InMemoryEventBus::new())
    }

    #[tokio::test]
    async fn open_and_get_account() {
        let service = service();
        let cmd = OpenAccount::for_owner("Alice");
        let account_id = cmd.account_id;

        service.open_account(cmd).await.unwrap();

        let account = service.get_account(account_id).await.unwrap().unwrap();
        assert_eq!(account.id(), Some(account_id));
        assert_eq!(account.owner(), "Alice");
        assert_eq!(account.balance(), Money::zero());
    }

    #[tokio::test]
    async fn get_missing_account_returns_none() {
        let service = service();
        let result = service.get_account(AggregateId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn deposit_and_withdraw_update_balance() {
        let service = service();
        let cmd = OpenAccount::for_owner("Alice");
        let account_id = cmd.account_id;
        service.open_account(cmd).await.unwrap();

        service
            .deposit(DepositMoney::new(
                account_id,
                Version::first(),
                Money::from_cents(1000),
            ))
            .await
            .unwrap();
        service
            .withdraw(WithdrawMoney::new(
                account_id,
                Version::new(2),
                Money::from_cents(300),
            ))
            .await
            .unwrap();

        let account = service.get_account(account_id).await.unwrap().unwrap();
        assert_eq!(account.balance(), Money::from_cents(700));
    }

    #[tokio::test]
    async fn close_account_lifecycle() {
        let service = service();
        let cmd = OpenAccount::for_owner("Alice");
        let account_id = cmd.account_id;
        service.open_account(cmd).await.unwrap();

        service
            .close_account(CloseAccount::new(account_id, Version::first()))
            .await
            .unwrap();

        let account = service.get_account(account_id).await.unwrap().unwrap();
        assert!(account.is_closed());
    }
}

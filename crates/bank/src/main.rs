//! Demo entry point: drives a bank account through the command pipeline
//! against in-memory infrastructure and shows failure classification.

mod config;

use bus::InMemoryEventBus;
use domain::{AccountService, DepositMoney, Money, OpenAccount, WithdrawMoney};
use event_store::{InMemoryEventStore, Version};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = InMemoryEventStore::new();
    let bus = InMemoryEventBus::new();
    let service = AccountService::with_destination(
        store.clone(),
        bus.clone(),
        config.bucket.clone(),
        config.subset.clone(),
    );

    // Open an account and move some money through it.
    let open = OpenAccount::for_owner("Alice");
    let account_id = open.account_id;
    service.open_account(open).await.expect("open failed");
    tracing::info!(%account_id, "account opened");

    service
        .deposit(DepositMoney::new(
            account_id,
            Version::first(),
            Money::from_cents(10_000),
        ))
        .await
        .expect("deposit failed");

    service
        .withdraw(WithdrawMoney::new(
            account_id,
            Version::new(2),
            Money::from_cents(2_500),
        ))
        .await
        .expect("withdraw failed");

    let account = service
        .get_account(account_id)
        .await
        .expect("load failed")
        .expect("account missing");
    tracing::info!(balance = %account.balance(), "account state after replay");

    // An overdraft: dispatch rejects it and the failure is classified and
    // reported to the errors subset.
    let overdraft = service
        .withdraw(WithdrawMoney::new(
            account_id,
            Version::new(3),
            Money::from_cents(1_000_000),
        ))
        .await
        .expect_err("overdraft should fail");
    tracing::info!(kind = %overdraft.kind(), cause = %overdraft.cause(), "command rejected");

    let events = bus.messages_for(&config.bucket, &config.subset).await;
    let errors = bus.messages_for(&config.bucket, domain::ERRORS_SUBSET).await;
    tracing::info!(
        stored = store.event_count().await,
        published = events.len(),
        error_notices = errors.len(),
        "session complete"
    );
}

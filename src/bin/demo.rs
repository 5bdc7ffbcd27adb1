//! Ledger walkthrough
//!
//! Run with: cargo run --bin demo

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledger_core::aggregate::{Account, Aggregate};
use ledger_core::event_store::InMemoryEventStore;
use ledger_core::handlers::{Command, CommandModel, TransferSaga};
use ledger_core::projection::EntityStore;
use ledger_core::query::QueryModel;
use ledger_core::{Amount, Config};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledger_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    tracing::info!(
        "Starting ledger walkthrough (snapshot interval {})",
        config.snapshot_interval
    );

    let store = Arc::new(InMemoryEventStore::new());
    let entities = Arc::new(EntityStore::new());
    let query = QueryModel::new(store.clone(), config.snapshot_interval);
    let model = Arc::new(CommandModel::new(
        store.clone(),
        query.clone(),
        entities.clone(),
    ));

    let acct1 = uuid::Uuid::new_v4();
    let acct2 = uuid::Uuid::new_v4();

    // Deposit and withdraw
    let account = model.execute_command(&Command::deposit(acct1, Amount::from_integer(150)?))?;
    println!("After deposit of 150: balance {}", account.balance());

    let withdrawal = Command::withdrawal(acct1, Amount::from_integer(50)?);
    let account = model.execute_command(&withdrawal)?;
    println!("After withdrawal of 50: balance {}", account.balance());

    // Overdraft is rejected before anything reaches the log
    match model.execute_command(&Command::withdrawal(acct1, Amount::from_integer(150)?)) {
        Err(e) => println!("Overdraft rejected: {}", e),
        Ok(_) => anyhow::bail!("overdraft unexpectedly accepted"),
    }
    let entity = entities.query_entity(acct1).expect("projected entity");
    println!("Balance after rejection: {}", entity.balance);

    // Transfer succeeds
    let mut saga = TransferSaga::new(model.clone());
    saga.start_transfer(acct1, acct2, Amount::from_integer(50)?)?;
    println!(
        "After transfer of 50: acct1 {}, acct2 {}",
        entities.query_entity(acct1).expect("projected entity").balance,
        entities.query_entity(acct2).expect("projected entity").balance,
    );

    // Transfer fails and is compensated
    match saga.start_transfer(acct1, acct2, Amount::from_integer(100)?) {
        Err(e) => println!("Transfer of 100 failed: {}", e),
        Ok(_) => anyhow::bail!("transfer unexpectedly committed"),
    }
    println!(
        "After compensation: acct1 {}, acct2 {}",
        entities.query_entity(acct1).expect("projected entity").balance,
        entities.query_entity(acct2).expect("projected entity").balance,
    );

    // Undo the earlier withdrawal
    let account = model.undo_command(&withdrawal)?;
    println!("After undoing the 50 withdrawal: balance {}", account.balance());

    // Snapshot round-trip
    query.save_snapshot(&account)?;
    let rebuilt: Account = query.rebuild_aggregate(acct1)?;
    println!(
        "Rebuilt from snapshot: balance {} at version {}",
        rebuilt.balance(),
        rebuilt.version()
    );

    Ok(())
}

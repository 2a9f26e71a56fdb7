//! Postgres-backed integration tests for the ledger engine.
//!
//! These need a reachable database: set `DATABASE_URL` to run them. Without
//! it every test exits early, so the suite stays green in environments with
//! no Postgres.

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::OnceCell;
use walletd_core::WalletId;
use walletd_store::{Ledger, LedgerError, QueryEngine, StorageFacade, TxManager, repo};

// Concurrent CREATE TABLE IF NOT EXISTS can race on the catalog, so the
// schema is applied exactly once per test binary.
static SCHEMA: OnceCell<()> = OnceCell::const_new();

async fn connect() -> Option<PgPool> {
    walletd_observability::init();

    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("DATABASE_URL is set but unreachable");

    SCHEMA
        .get_or_init(|| async {
            sqlx::query(
                "CREATE TABLE IF NOT EXISTS wallets (
                    wallet_id UUID PRIMARY KEY,
                    balance   BIGINT NOT NULL DEFAULT 0
                )",
            )
            .execute(&pool)
            .await
            .expect("failed to ensure wallets table");
        })
        .await;

    Some(pool)
}

fn ledger(pool: PgPool) -> Arc<StorageFacade> {
    Arc::new(StorageFacade::new(TxManager::new(pool)))
}

macro_rules! require_pg {
    () => {
        match connect().await {
            Some(pool) => pool,
            None => {
                eprintln!("skipping: DATABASE_URL not set");
                return;
            }
        }
    };
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_deposits_lose_no_updates() {
    let pool = require_pg!();
    let ledger = ledger(pool);
    let id = WalletId::new();
    ledger.create(id).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move { ledger.deposit(id, 7).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(ledger.balance(id).await.unwrap(), 70);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_withdrawals_never_overdraw() {
    let pool = require_pg!();
    let ledger = ledger(pool);
    let id = WalletId::new();
    ledger.create(id).await.unwrap();
    ledger.deposit(id, 100).await.unwrap();

    // Ten withdrawals of 30 against 100: at most three can succeed.
    let mut handles = Vec::new();
    for _ in 0..10 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move { ledger.withdraw(id, 30).await }));
    }

    let mut successes = 0u32;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(LedgerError::InsufficientBalance { .. }) => {}
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }

    assert!(successes <= 3);
    let balance = ledger.balance(id).await.unwrap();
    assert_eq!(balance, 100 - i64::from(successes) * 30);
    assert!(balance >= 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_create_is_rejected_and_leaves_balance_untouched() {
    let pool = require_pg!();
    let ledger = ledger(pool);
    let id = WalletId::new();

    ledger.create(id).await.unwrap();
    let err = ledger.create(id).await.unwrap_err();
    assert!(matches!(err, LedgerError::WalletAlreadyExists));

    assert_eq!(ledger.balance(id).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn withdraw_exact_balance_then_overdraw() {
    let pool = require_pg!();
    let ledger = ledger(pool);
    let id = WalletId::new();
    ledger.create(id).await.unwrap();
    ledger.deposit(id, 100).await.unwrap();

    ledger.withdraw(id, 100).await.unwrap();
    assert_eq!(ledger.balance(id).await.unwrap(), 0);

    let err = ledger.withdraw(id, 1).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientBalance {
            balance: 0,
            requested: 1
        }
    ));
    assert_eq!(ledger.balance(id).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn operations_on_missing_wallet_report_not_found() {
    let pool = require_pg!();
    let ledger = ledger(pool);
    let id = WalletId::new();

    // Deposit discovers the missing row only at the final write.
    let err = ledger.deposit(id, 10).await.unwrap_err();
    assert!(matches!(err, LedgerError::WalletNotFound));

    let err = ledger.withdraw(id, 10).await.unwrap_err();
    assert!(matches!(err, LedgerError::WalletNotFound));

    let err = ledger.balance(id).await.unwrap_err();
    assert!(matches!(err, LedgerError::WalletNotFound));
}

#[tokio::test(flavor = "multi_thread")]
async fn read_uncommitted_path_reads_committed_balance() {
    let pool = require_pg!();
    let tx_manager = TxManager::new(pool);
    let ledger = StorageFacade::new(tx_manager.clone());
    let id = WalletId::new();
    ledger.create(id).await.unwrap();
    ledger.deposit(id, 55).await.unwrap();

    let balance = tx_manager
        .run_read_uncommitted(move |mut engine: QueryEngine<'_>| {
            Box::pin(async move { repo::get_by_id(&mut engine, id).await })
        })
        .await
        .unwrap();

    assert_eq!(balance, 55);
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_delete_removes_the_row() {
    let pool = require_pg!();
    let ledger = ledger(pool.clone());
    let id = WalletId::new();
    ledger.create(id).await.unwrap();

    repo::delete_wallet(&mut QueryEngine::Pool(&pool), id)
        .await
        .unwrap();
    // Deleting again is a no-op, not an error.
    repo::delete_wallet(&mut QueryEngine::Pool(&pool), id)
        .await
        .unwrap();

    let err = ledger.balance(id).await.unwrap_err();
    assert!(matches!(err, LedgerError::WalletNotFound));
}

//! Public ledger contract and its Postgres-backed implementation.

use async_trait::async_trait;
use tracing::instrument;
use walletd_core::WalletId;

use crate::engine::QueryEngine;
use crate::error::LedgerError;
use crate::repo;
use crate::tx::TxManager;

/// The ledger's public contract, consumed by the service layer.
///
/// Amounts are positive integer units; the caller validates that before
/// invoking — no business-rule re-validation happens below this trait.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Insert a new wallet with zero balance.
    async fn create(&self, id: WalletId) -> Result<(), LedgerError>;

    /// Credit `amount` to the wallet.
    async fn deposit(&self, id: WalletId, amount: i64) -> Result<(), LedgerError>;

    /// Debit `amount` from the wallet if the balance is sufficient.
    async fn withdraw(&self, id: WalletId, amount: i64) -> Result<(), LedgerError>;

    /// Current balance.
    async fn balance(&self, id: WalletId) -> Result<i64, LedgerError>;
}

/// Composes repository statements inside transaction-manager boundaries.
///
/// Mutators serialize on the store's row lock, never on an in-process
/// mutex, so mutual exclusion holds across process instances too.
#[derive(Debug, Clone)]
pub struct StorageFacade {
    tx_manager: TxManager,
}

impl StorageFacade {
    pub fn new(tx_manager: TxManager) -> Self {
        Self { tx_manager }
    }
}

#[async_trait]
impl Ledger for StorageFacade {
    // Single statement; no transaction boundary needed.
    #[instrument(skip(self), fields(wallet_id = %id), err)]
    async fn create(&self, id: WalletId) -> Result<(), LedgerError> {
        repo::insert_wallet(&mut self.tx_manager.query_engine(), id).await
    }

    #[instrument(skip(self), fields(wallet_id = %id), err)]
    async fn deposit(&self, id: WalletId, amount: i64) -> Result<(), LedgerError> {
        self.tx_manager
            .run_serializable(move |mut engine: QueryEngine<'_>| {
                Box::pin(async move {
                    repo::lock_balance(&mut engine, id).await?;
                    // Existence surfaces from the update's affected-row
                    // count; no extra read once the lock is held.
                    repo::update_balance(&mut engine, id, amount).await
                })
            })
            .await
    }

    #[instrument(skip(self), fields(wallet_id = %id), err)]
    async fn withdraw(&self, id: WalletId, amount: i64) -> Result<(), LedgerError> {
        self.tx_manager
            .run_serializable(move |mut engine: QueryEngine<'_>| {
                Box::pin(async move {
                    repo::lock_balance(&mut engine, id).await?;
                    let balance = repo::get_by_id(&mut engine, id).await?;
                    if balance < amount {
                        return Err(LedgerError::InsufficientBalance {
                            balance,
                            requested: amount,
                        });
                    }
                    repo::update_balance(&mut engine, id, -amount).await
                })
            })
            .await
    }

    #[instrument(skip(self), fields(wallet_id = %id), err)]
    async fn balance(&self, id: WalletId) -> Result<i64, LedgerError> {
        repo::get_by_id(&mut self.tx_manager.query_engine(), id).await
    }
}

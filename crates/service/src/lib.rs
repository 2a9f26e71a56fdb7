//! `walletd-service` — validating service layer above the ledger facade.
//!
//! Business-rule validation (positive amounts, non-nil ids) happens here,
//! so the engine below can assume already-validated arguments. Everything
//! else is a pass-through; the error taxonomy of `walletd-store` reaches
//! the transport layer unchanged.

use std::sync::Arc;

use tracing::instrument;
use walletd_core::WalletId;
use walletd_store::{Ledger, LedgerError};

/// Wallet operations as exposed to the transport layer.
pub struct WalletService {
    ledger: Arc<dyn Ledger>,
}

impl WalletService {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    #[instrument(skip(self), fields(wallet_id = %id), err)]
    pub async fn create_wallet(&self, id: WalletId) -> Result<(), LedgerError> {
        if id.is_nil() {
            return Err(LedgerError::validation("wallet id is required"));
        }
        self.ledger.create(id).await
    }

    #[instrument(skip(self), fields(wallet_id = %id), err)]
    pub async fn deposit_funds(&self, id: WalletId, amount: i64) -> Result<(), LedgerError> {
        require_positive(amount)?;
        self.ledger.deposit(id, amount).await
    }

    #[instrument(skip(self), fields(wallet_id = %id), err)]
    pub async fn withdraw_funds(&self, id: WalletId, amount: i64) -> Result<(), LedgerError> {
        require_positive(amount)?;
        self.ledger.withdraw(id, amount).await
    }

    #[instrument(skip(self), fields(wallet_id = %id), err)]
    pub async fn get_balance(&self, id: WalletId) -> Result<i64, LedgerError> {
        self.ledger.balance(id).await
    }
}

fn require_positive(amount: i64) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::validation("amount must be positive"));
    }
    Ok(())
}

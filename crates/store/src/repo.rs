//! Single-statement wallet persistence operations.
//!
//! Each operation runs exactly one statement against the engine handle it is
//! given and never begins or ends a transaction itself. Whether a statement
//! joins a transaction is decided entirely by the caller through the handle.

use sqlx::Row;
use walletd_core::WalletId;

use crate::engine::QueryEngine;
use crate::error::{LedgerError, is_unique_violation};

/// Acquire an exclusive row lock on the wallet, held until the surrounding
/// transaction ends. Returns no data; a missing row is not detected here —
/// callers that must assert existence do so with a subsequent read or via
/// `update_balance`'s affected-row count.
pub async fn lock_balance(
    engine: &mut QueryEngine<'_>,
    id: WalletId,
) -> Result<(), LedgerError> {
    engine
        .execute(
            sqlx::query("SELECT balance FROM wallets WHERE wallet_id = $1 FOR UPDATE")
                .bind(id.as_uuid()),
        )
        .await?;
    Ok(())
}

/// Current balance. Fails with `WalletNotFound` if no row matches.
pub async fn get_by_id(
    engine: &mut QueryEngine<'_>,
    id: WalletId,
) -> Result<i64, LedgerError> {
    let row = engine
        .fetch_optional(
            sqlx::query("SELECT balance FROM wallets WHERE wallet_id = $1")
                .bind(id.as_uuid()),
        )
        .await?
        .ok_or(LedgerError::WalletNotFound)?;

    let balance: i64 = row.try_get("balance")?;
    Ok(balance)
}

/// Apply a signed delta server-side (`balance = balance + delta`).
/// Fails with `WalletNotFound` when zero rows matched.
pub async fn update_balance(
    engine: &mut QueryEngine<'_>,
    id: WalletId,
    delta: i64,
) -> Result<(), LedgerError> {
    let result = engine
        .execute(
            sqlx::query("UPDATE wallets SET balance = balance + $2 WHERE wallet_id = $1")
                .bind(id.as_uuid())
                .bind(delta),
        )
        .await?;

    if result.rows_affected() == 0 {
        return Err(LedgerError::WalletNotFound);
    }
    Ok(())
}

/// Insert a new wallet row; balance starts at the schema's zero default.
/// A duplicate id fails with `WalletAlreadyExists`.
pub async fn insert_wallet(
    engine: &mut QueryEngine<'_>,
    id: WalletId,
) -> Result<(), LedgerError> {
    engine
        .execute(sqlx::query("INSERT INTO wallets (wallet_id) VALUES ($1)").bind(id.as_uuid()))
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                LedgerError::WalletAlreadyExists
            } else {
                LedgerError::Database(e)
            }
        })?;
    Ok(())
}

/// Administrative removal of a wallet row. Not part of the ledger's public
/// contract; deleting a missing row is not an error.
pub async fn delete_wallet(
    engine: &mut QueryEngine<'_>,
    id: WalletId,
) -> Result<(), LedgerError> {
    engine
        .execute(sqlx::query("DELETE FROM wallets WHERE wallet_id = $1").bind(id.as_uuid()))
        .await?;
    Ok(())
}

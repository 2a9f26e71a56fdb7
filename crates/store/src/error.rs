//! Ledger error taxonomy and Postgres error-code classification.
//!
//! Raw store errors travel upward untranslated in the `Database` variant.
//! Exactly two domain translations happen at the repository layer
//! (unique violation → `WalletAlreadyExists`, zero rows affected →
//! `WalletNotFound`); the transaction manager additionally classifies
//! serialization failures and deadlocks as retryable.

use thiserror::Error;

/// Result type used across the store layer.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Unique-constraint violation.
const UNIQUE_VIOLATION: &str = "23505";
/// Serialization failure (transaction could not be serialized).
const SERIALIZATION_FAILURE: &str = "40001";
/// Deadlock detected.
const DEADLOCK_DETECTED: &str = "40P01";

/// Failure taxonomy of the ledger engine.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed input rejected before the engine runs any statement.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Operation targeted a wallet that does not exist.
    #[error("wallet not found")]
    WalletNotFound,

    /// Creation targeted an id that is already taken.
    #[error("wallet already exists")]
    WalletAlreadyExists,

    /// Withdrawal would drive the balance negative. No write was performed.
    #[error("insufficient balance: have {balance}, requested {requested}")]
    InsufficientBalance { balance: i64, requested: i64 },

    /// A serializable unit of work kept conflicting past the retry budget.
    /// Distinct from `Database` so operators can tell contention from outage.
    #[error("transaction failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Underlying store failure, surfaced as-is.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for store-reported conflicts that are safe to retry from
    /// scratch: serialization failure and deadlock detected.
    pub fn is_transient_conflict(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db)) => db
                .code()
                .is_some_and(|code| is_transient_code(code.as_ref())),
            _ => false,
        }
    }
}

pub(crate) fn is_transient_code(code: &str) -> bool {
    code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED
}

/// True if the error is a unique-constraint violation (duplicate key).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(code) = db.code() {
            return code.as_ref() == UNIQUE_VIOLATION;
        }
    }
    false
}

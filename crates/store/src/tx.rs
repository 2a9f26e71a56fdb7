//! Transaction lifecycle: isolation profiles, commit/rollback discipline,
//! and conflict retry for serializable units of work.

use futures::future::BoxFuture;
use sqlx::PgPool;
use tracing::warn;

use crate::engine::QueryEngine;
use crate::error::LedgerError;
use crate::retry::{self, RetryError, RetryPolicy};

/// Isolation/access-mode profile a transaction is opened at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxProfile {
    /// Strictest isolation, read-write. All balance mutations run here so
    /// write skew between concurrent mutators cannot go undetected.
    SerializableReadWrite,
    /// Weakly isolated, read-only. For work that tolerates stale reads.
    ReadUncommittedReadOnly,
}

impl TxProfile {
    /// Postgres requires SET TRANSACTION to be the first statement of the
    /// transaction.
    fn set_transaction_sql(self) -> &'static str {
        match self {
            Self::SerializableReadWrite => {
                "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE READ WRITE"
            }
            Self::ReadUncommittedReadOnly => {
                "SET TRANSACTION ISOLATION LEVEL READ UNCOMMITTED READ ONLY"
            }
        }
    }
}

/// Owns transaction boundaries for units of work against the wallet store.
///
/// A unit of work is a re-invokable closure handed a transaction-backed
/// [`QueryEngine`]. It must re-derive every decision (lock, fresh read,
/// computed write) from the store on each invocation; nothing observed in a
/// rolled-back attempt may be reused.
#[derive(Debug, Clone)]
pub struct TxManager {
    pool: PgPool,
    policy: RetryPolicy,
}

impl TxManager {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(pool: PgPool, policy: RetryPolicy) -> Self {
        Self { pool, policy }
    }

    /// Pool-backed handle for single statements that need no transaction.
    pub fn query_engine(&self) -> QueryEngine<'_> {
        QueryEngine::Pool(&self.pool)
    }

    /// Run `work` in a serializable read-write transaction, retrying the
    /// whole unit on serialization failure or deadlock up to the policy's
    /// attempt budget. Exhaustion is reported as
    /// [`LedgerError::RetriesExhausted`], not the last store error; any
    /// other failure aborts immediately and is returned unchanged.
    pub async fn run_serializable<T, F>(&self, work: F) -> Result<T, LedgerError>
    where
        F: for<'c> Fn(QueryEngine<'c>) -> BoxFuture<'c, Result<T, LedgerError>>,
    {
        let outcome = retry::with_backoff(self.policy, LedgerError::is_transient_conflict, || {
            self.run_in_tx(TxProfile::SerializableReadWrite, &work)
        })
        .await;
        flatten_retry(outcome)
    }

    /// Run `work` once in a read-only, read-uncommitted transaction.
    /// No retry: nothing on this path can hit a serialization conflict.
    pub async fn run_read_uncommitted<T, F>(&self, work: F) -> Result<T, LedgerError>
    where
        F: for<'c> Fn(QueryEngine<'c>) -> BoxFuture<'c, Result<T, LedgerError>>,
    {
        self.run_in_tx(TxProfile::ReadUncommittedReadOnly, &work)
            .await
    }

    /// One attempt: begin at `profile`, run `work` against the transaction's
    /// connection, commit on success. The transaction is rolled back on every
    /// other exit path — error returns explicitly, panics and cancelled
    /// futures through the transaction guard's drop.
    async fn run_in_tx<T, F>(&self, profile: TxProfile, work: &F) -> Result<T, LedgerError>
    where
        F: for<'c> Fn(QueryEngine<'c>) -> BoxFuture<'c, Result<T, LedgerError>>,
    {
        let mut tx = self.pool.begin().await?;
        sqlx::query(profile.set_transaction_sql())
            .execute(&mut *tx)
            .await?;

        match work(QueryEngine::Tx(&mut *tx)).await {
            Ok(value) => {
                // Commit failures (e.g. conflicts surfaced at commit time)
                // become the unit of work's own result.
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Fold the retry driver's outcome back into the ledger taxonomy: a spent
/// attempt budget becomes `RetriesExhausted`; any other error is returned
/// unchanged.
fn flatten_retry<T>(outcome: Result<T, RetryError<LedgerError>>) -> Result<T, LedgerError> {
    match outcome {
        Ok(value) => Ok(value),
        Err(RetryError::Inner(err)) => Err(err),
        Err(RetryError::Exhausted { attempts }) => Err(LedgerError::RetriesExhausted { attempts }),
    }
}

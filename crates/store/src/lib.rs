//! `walletd-store` — the transactional ledger engine.
//!
//! Wraps wallet balance reads and writes in serializable transactions with
//! row-level locking, validates sufficiency before debiting, and retries
//! whole units of work on transient serialization conflicts. Callers above
//! (the service layer) hand in already-validated arguments; the relational
//! store below is the sole owner of wallet state.

pub mod config;
pub mod engine;
pub mod error;
pub mod facade;
pub mod repo;
pub mod retry;
pub mod tx;

pub use config::StoreConfig;
pub use engine::QueryEngine;
pub use error::{LedgerError, LedgerResult};
pub use facade::{Ledger, StorageFacade};
pub use retry::{RetryError, RetryPolicy};
pub use tx::{TxManager, TxProfile};

#[cfg(feature = "mock")]
pub use facade::MockLedger;

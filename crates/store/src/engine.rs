//! Execution handle for repository statements.
//!
//! One narrow capability with two implementations: a handle that talks
//! straight to the connection pool (autocommit), and a handle bound to an
//! in-flight transaction's connection. The transaction manager decides which
//! one a caller gets; repository operations take the handle as a parameter
//! and stay oblivious to transaction boundaries.

use sqlx::postgres::{PgArguments, PgQueryResult, PgRow};
use sqlx::query::Query;
use sqlx::{PgConnection, PgPool, Postgres};

/// Query-capable execution handle.
pub enum QueryEngine<'a> {
    /// Autocommit execution against the shared pool.
    Pool(&'a PgPool),
    /// Execution inside the transaction that owns this connection.
    Tx(&'a mut PgConnection),
}

impl QueryEngine<'_> {
    pub(crate) async fn execute(
        &mut self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> Result<PgQueryResult, sqlx::Error> {
        match self {
            Self::Pool(pool) => query.execute(*pool).await,
            Self::Tx(conn) => query.execute(&mut **conn).await,
        }
    }

    pub(crate) async fn fetch_optional(
        &mut self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> Result<Option<PgRow>, sqlx::Error> {
        match self {
            Self::Pool(pool) => query.fetch_optional(*pool).await,
            Self::Tx(conn) => query.fetch_optional(&mut **conn).await,
        }
    }
}

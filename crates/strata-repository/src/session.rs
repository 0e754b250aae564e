//! Unit of work.
//!
//! A [`Session`] wraps one database transaction. DAO operations ending in
//! `_in` run inside a caller-owned session so several of them commit or roll
//! back together. A session that is dropped without [`Session::commit`] is
//! rolled back.

use crate::pool::{DatabasePoolInterface, Dialect};
use sqlx::{Any, AnyConnection, Transaction};
use strata_core::{BoxFuture, StrataResult};
use tracing::{debug, warn};

/// An open database transaction.
pub struct Session {
    tx: Transaction<'static, Any>,
    dialect: Dialect,
}

impl Session {
    pub(crate) fn new(tx: Transaction<'static, Any>, dialect: Dialect) -> Self {
        debug!("Session opened ({})", dialect);
        Self { tx, dialect }
    }

    /// SQL dialect of the underlying connection.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub(crate) fn connection(&mut self) -> &mut AnyConnection {
        &mut self.tx
    }

    /// Executes raw SQL inside this session. Returns rows affected.
    pub async fn execute(&mut self, sql: &str) -> StrataResult<u64> {
        let result = sqlx::raw_sql(sql).execute(self.connection()).await?;
        Ok(result.rows_affected())
    }

    /// Commits every change made in this session.
    pub async fn commit(self) -> StrataResult<()> {
        self.tx.commit().await?;
        debug!("Session committed");
        Ok(())
    }

    /// Discards every change made in this session.
    pub async fn rollback(self) -> StrataResult<()> {
        self.tx.rollback().await?;
        debug!("Session rolled back");
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

/// Runs `f` inside a new session.
///
/// Commits when `f` returns `Ok`, rolls back when it returns `Err` and hands
/// the error from `f` back.
///
/// ```ignore
/// let customers = Arc::clone(&customers);
/// let id = transaction(pool.as_ref(), move |session| {
///     Box::pin(async move { customers.save_in(session, &customer).await })
/// })
/// .await?;
/// ```
pub async fn transaction<T, F>(pool: &dyn DatabasePoolInterface, f: F) -> StrataResult<T>
where
    T: Send,
    F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, T> + Send,
{
    let mut session = pool.begin().await?;

    match f(&mut session).await {
        Ok(value) => {
            session.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = session.rollback().await {
                warn!("Rollback failed after error '{}': {}", e, rollback_err);
            }
            Err(e)
        }
    }
}

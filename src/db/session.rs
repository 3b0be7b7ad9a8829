//! Per-request database session.
//!
//! A `Session` owns at most one pooled connection, checked out on first use.
//! The first write opens a transaction that stays open until
//! [`Session::commit`] or [`Session::dispose`]. Every operation executed
//! inside that transaction runs in its own savepoint, so a rejected statement
//! is rolled back on its own and later operations in the same scope still
//! see a usable transaction.
//!
//! Losing the transaction any other way (a dropped connection, a failed
//! savepoint) aborts the session: writes and commits are refused until
//! [`Session::dispose`], so earlier writes can never be silently replaced by
//! a partial commit.

use std::sync::Arc;

use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, TransactionManager};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};

/// Session shared by every repository of one unit of work.
pub type SharedSession = Arc<Mutex<Session>>;

/// Whether an operation reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

pub struct Session {
    pool: AsyncDbPool,
    conn: Option<PooledConnection<'static, AsyncPgConnection>>,
    transaction_open: bool,
    savepoint_open: bool,
    pending_rows: usize,
    aborted: bool,
    disposed: bool,
}

impl Session {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            pool,
            conn: None,
            transaction_open: false,
            savepoint_open: false,
            pending_rows: 0,
            aborted: false,
            disposed: false,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// True while writes are waiting for [`Session::commit`].
    pub fn has_pending_writes(&self) -> bool {
        self.transaction_open
    }

    /// Rows affected by writes since the transaction opened.
    pub fn pending_rows(&self) -> usize {
        self.pending_rows
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// True once uncommitted writes were rolled back before a commit.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Prepares the connection for one operation.
    ///
    /// Must be paired with [`Session::end`] once the operation's result is
    /// known, whether it succeeded or not.
    pub async fn begin(&mut self, access: Access) -> AppResult<&mut AsyncPgConnection> {
        if self.disposed {
            return Err(AppError::Internal {
                source: anyhow::anyhow!("session used after dispose"),
            });
        }
        if access == Access::Write && self.aborted {
            return Err(aborted());
        }

        if self.conn.is_none() {
            self.conn = Some(self.pool.get_owned().await?);
        }

        if let Err(e) = self.open_levels(access).await {
            // A transaction without its savepoint is unusable
            self.discard().await;
            return Err(e);
        }

        match self.conn.as_mut() {
            Some(conn) => Ok(&mut **conn),
            None => Err(AppError::Internal {
                source: anyhow::anyhow!("no connection checked out"),
            }),
        }
    }

    async fn open_levels(&mut self, access: Access) -> AppResult<()> {
        let Some(conn) = self.conn.as_mut() else {
            return Ok(());
        };
        let conn: &mut AsyncPgConnection = conn;

        if access == Access::Write && !self.transaction_open {
            AnsiTransactionManager::begin_transaction(conn).await?;
            self.transaction_open = true;
            tracing::debug!("Opened unit of work transaction");
        }

        if self.transaction_open {
            AnsiTransactionManager::begin_transaction(conn).await?;
            self.savepoint_open = true;
        }

        Ok(())
    }

    /// Closes the operation opened by [`Session::begin`].
    ///
    /// On success the savepoint is released and `rows` is added to the
    /// pending count; on failure the savepoint is rolled back, which undoes
    /// only this operation.
    pub async fn end(&mut self, succeeded: bool, rows: usize) -> AppResult<()> {
        if !self.savepoint_open {
            return Ok(());
        }
        self.savepoint_open = false;

        let Some(conn) = self.conn.as_mut() else {
            return Ok(());
        };
        let conn: &mut AsyncPgConnection = conn;

        let outcome = if succeeded {
            AnsiTransactionManager::commit_transaction(conn).await
        } else {
            AnsiTransactionManager::rollback_transaction(conn).await
        };

        match outcome {
            Ok(()) => {
                if succeeded {
                    self.pending_rows += rows;
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to close savepoint, discarding transaction");
                self.discard().await;
                Err(e.into())
            }
        }
    }

    /// Commits every write made since the transaction opened.
    ///
    /// Returns the number of affected rows; `0` when nothing was written.
    /// A cancelled token rolls the transaction back instead.
    pub async fn commit(&mut self, cancel: &CancellationToken) -> AppResult<usize> {
        if cancel.is_cancelled() {
            self.discard().await;
            return Err(AppError::Cancelled {
                operation: "commit".to_string(),
            });
        }

        if self.aborted {
            return Err(aborted());
        }
        if !self.transaction_open {
            return Ok(0);
        }

        let Some(conn) = self.conn.as_mut() else {
            self.transaction_open = false;
            return Ok(0);
        };
        let conn: &mut AsyncPgConnection = conn;

        let rows = self.pending_rows;
        match AnsiTransactionManager::commit_transaction(conn).await {
            Ok(()) => {
                self.transaction_open = false;
                self.pending_rows = 0;
                tracing::debug!(rows, "Committed unit of work");
                Ok(rows)
            }
            Err(e) => {
                self.discard().await;
                Err(AppError::Database {
                    operation: "commit".to_string(),
                    source: anyhow::Error::from(e),
                })
            }
        }
    }

    /// Releases the connection, rolling back anything uncommitted.
    ///
    /// Safe to call more than once; only the first call has an effect.
    pub async fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.discard().await;
        self.disposed = true;
    }

    /// Rolls back open work and returns the connection to the pool.
    ///
    /// Discarding an open transaction aborts the session.
    async fn discard(&mut self) {
        if self.transaction_open {
            self.aborted = true;
        }
        let Some(mut conn) = self.conn.take() else {
            self.reset();
            return;
        };

        let levels = usize::from(self.transaction_open) + usize::from(self.savepoint_open);
        if self.pending_rows > 0 {
            tracing::debug!(rows = self.pending_rows, "Discarding uncommitted writes");
        }
        for _ in 0..levels {
            if let Err(e) = AnsiTransactionManager::rollback_transaction(&mut *conn).await {
                // The pool drops connections left inside a transaction
                tracing::warn!(error = %e, "Rollback failed while releasing connection");
                break;
            }
        }

        self.reset();
        drop(conn);
    }

    fn reset(&mut self) {
        self.transaction_open = false;
        self.savepoint_open = false;
        self.pending_rows = 0;
    }
}

fn aborted() -> AppError {
    AppError::Unavailable {
        message: "unit of work aborted, its uncommitted writes were rolled back".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::lazy_pool;

    fn session() -> Session {
        Session::new(lazy_pool("postgres://localhost:1/unreachable"))
    }

    #[tokio::test]
    async fn test_commit_without_writes_is_a_no_op() {
        let mut session = session();
        let rows = session.commit(&CancellationToken::new()).await.unwrap();

        assert_eq!(rows, 0);
        assert!(!session.has_pending_writes());
    }

    #[tokio::test]
    async fn test_commit_honors_cancellation() {
        let mut session = session();
        let token = CancellationToken::new();
        token.cancel();

        match session.commit(&token).await {
            Err(AppError::Cancelled { operation }) => assert_eq!(operation, "commit"),
            other => panic!("Expected Cancelled, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispose_is_idempotent() {
        let mut session = session();

        session.dispose().await;
        assert!(session.is_disposed());
        session.dispose().await;
        assert!(session.is_disposed());
    }

    #[tokio::test]
    async fn test_begin_after_dispose_fails() {
        let mut session = session();
        session.dispose().await;

        assert!(matches!(
            session.begin(Access::Read).await,
            Err(AppError::Internal { .. })
        ));
    }

    #[tokio::test]
    async fn test_end_without_begin_is_a_no_op() {
        let mut session = session();
        session.end(true, 3).await.unwrap();
        assert_eq!(session.pending_rows(), 0);
    }

    #[tokio::test]
    async fn test_lost_transaction_refuses_writes_and_commit() {
        let mut session = session();
        session.transaction_open = true;
        session.pending_rows = 2;

        session.discard().await;
        assert!(session.is_aborted());
        assert_eq!(session.pending_rows(), 0);

        let write = session.begin(Access::Write).await.err().unwrap();
        assert!(matches!(write, AppError::Unavailable { .. }));
        let commit = session.commit(&CancellationToken::new()).await.unwrap_err();
        assert!(commit.to_string().contains("aborted"));

        // Reads go on to the pool; this one is unreachable
        let read = session.begin(Access::Read).await.err().unwrap();
        assert!(!read.to_string().contains("aborted"));
    }

    #[tokio::test]
    async fn test_discard_without_transaction_does_not_abort() {
        let mut session = session();
        session.discard().await;

        assert!(!session.is_aborted());
        assert_eq!(session.commit(&CancellationToken::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_database_is_transient() {
        let mut session = session();
        let error = session.begin(Access::Read).await.err().unwrap();
        assert!(error.is_transient(), "unexpected error: {:?}", error);
    }
}

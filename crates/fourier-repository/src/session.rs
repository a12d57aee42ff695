//! Scoped database sessions and transaction boundaries.
//!
//! Every [`DbSession`] runs inside a database transaction. Work done through
//! a session is only persisted by an explicit [`DbSession::commit`]; dropping
//! the session, closing it, or finishing it with an error rolls back and
//! returns the connection to the pool.

use crate::DatabasePool;
use fourier_core::{BoxFuture, FourierError, FourierResult};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::fmt;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Transaction isolation levels a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadUncommitted => write!(f, "READ UNCOMMITTED"),
            Self::ReadCommitted => write!(f, "READ COMMITTED"),
            Self::RepeatableRead => write!(f, "REPEATABLE READ"),
            Self::Serializable => write!(f, "SERIALIZABLE"),
        }
    }
}

/// Options for [`SessionManager::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Requested isolation level. SQLite transactions are always
    /// serializable, so this is recorded but not applied.
    pub isolation_level: Option<IsolationLevel>,
    /// Commit when the work succeeds; otherwise the session is released
    /// without committing.
    pub commit: bool,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            isolation_level: None,
            commit: true,
        }
    }
}

impl TransactionOptions {
    /// Options for work whose writes must never be persisted.
    #[must_use]
    pub const fn read_only() -> Self {
        Self {
            isolation_level: None,
            commit: false,
        }
    }

    #[must_use]
    pub const fn with_isolation_level(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = Some(level);
        self
    }
}

/// Opens the transaction a session works in. Transactional sessions take
/// the write lock up front, so concurrent writers wait on the busy timeout
/// instead of failing a read-to-write lock upgrade.
async fn begin(
    pool: &SqlitePool,
    transactional: bool,
) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    if transactional {
        pool.begin_with("BEGIN IMMEDIATE").await
    } else {
        pool.begin().await
    }
}

/// A scoped handle to one pooled connection with an open transaction.
pub struct DbSession {
    id: Uuid,
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
    transactional: bool,
}

impl DbSession {
    async fn open(pool: SqlitePool, transactional: bool) -> FourierResult<Self> {
        let tx = begin(&pool, transactional).await?;
        let id = Uuid::new_v4();
        debug!("Session {} opened (transactional: {})", id, transactional);
        Ok(Self {
            id,
            pool,
            tx: Some(tx),
            transactional,
        })
    }

    /// Identifier used to correlate log lines of one session.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns true when [`finish`](Self::finish) commits successful work.
    #[must_use]
    pub const fn is_transactional(&self) -> bool {
        self.transactional
    }

    /// Returns the connection, beginning a new transaction if the previous
    /// one was committed or rolled back.
    pub async fn connection(&mut self) -> FourierResult<&mut SqliteConnection> {
        if self.tx.is_none() {
            self.tx = Some(begin(&self.pool, self.transactional).await?);
            debug!("Session {} began a new transaction", self.id);
        }
        self.tx
            .as_deref_mut()
            .ok_or_else(|| FourierError::internal("session has no open transaction"))
    }

    /// Commits the open transaction, if any.
    pub async fn commit(&mut self) -> FourierResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
            debug!("Session {} committed", self.id);
        }
        Ok(())
    }

    /// Rolls back the open transaction, if any.
    pub async fn rollback(&mut self) -> FourierResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
            debug!("Session {} rolled back", self.id);
        }
        Ok(())
    }

    /// Releases the session, discarding uncommitted work.
    pub async fn close(mut self) -> FourierResult<()> {
        self.rollback().await?;
        debug!("Session {} closed", self.id);
        Ok(())
    }

    /// Ends the session according to the outcome of the work done in it.
    ///
    /// Transactional sessions commit on `Ok`. Any `Err` is rolled back and
    /// returned unchanged; a failing rollback is logged, not raised.
    pub async fn finish<T>(mut self, result: FourierResult<T>) -> FourierResult<T> {
        match result {
            Ok(value) => {
                if self.transactional {
                    self.commit().await?;
                } else {
                    self.close().await?;
                }
                Ok(value)
            }
            Err(err) => {
                error!("Session {} failed, rolling back: {}", self.id, err);
                if let Err(rollback_err) = self.rollback().await {
                    warn!("Session {} rollback failed: {}", self.id, rollback_err);
                }
                Err(err)
            }
        }
    }
}

impl fmt::Debug for DbSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSession")
            .field("id", &self.id)
            .field("open", &self.tx.is_some())
            .field("transactional", &self.transactional)
            .finish_non_exhaustive()
    }
}

/// Hands out sessions over the shared connection pool.
#[derive(Debug, Clone)]
pub struct SessionManager {
    pool: DatabasePool,
}

impl SessionManager {
    #[must_use]
    pub const fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Acquires a session that never commits on its own.
    pub async fn acquire_session(&self) -> FourierResult<DbSession> {
        DbSession::open(self.pool.inner().clone(), false).await
    }

    /// Acquires a session whose [`finish`](DbSession::finish) commits on
    /// success and rolls back on error.
    pub async fn acquire_transactional_session(&self) -> FourierResult<DbSession> {
        DbSession::open(self.pool.inner().clone(), true).await
    }

    /// Runs `work` in a plain session and releases it afterwards.
    pub async fn with_session<T, F>(&self, work: F) -> FourierResult<T>
    where
        T: Send,
        F: for<'s> FnOnce(&'s mut DbSession) -> BoxFuture<'s, T> + Send,
    {
        self.run(TransactionOptions::read_only(), work).await
    }

    /// Runs `work` in a transaction: commit on `Ok`, rollback on `Err`.
    pub async fn with_transaction<T, F>(&self, work: F) -> FourierResult<T>
    where
        T: Send,
        F: for<'s> FnOnce(&'s mut DbSession) -> BoxFuture<'s, T> + Send,
    {
        self.run(TransactionOptions::default(), work).await
    }

    /// Runs `work` in a session configured by `options`.
    pub async fn run<T, F>(&self, options: TransactionOptions, work: F) -> FourierResult<T>
    where
        T: Send,
        F: for<'s> FnOnce(&'s mut DbSession) -> BoxFuture<'s, T> + Send,
    {
        let mut session = DbSession::open(self.pool.inner().clone(), options.commit).await?;
        if let Some(level) = options.isolation_level {
            debug!(
                "Session {} requested isolation level {}; SQLite runs serializable",
                session.id(),
                level
            );
        }
        let result = work(&mut session).await;
        session.finish(result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_in_memory;
    use fourier_config::DatabaseConfig;

    async fn user_count(manager: &SessionManager) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(manager.pool().inner())
            .await
            .unwrap()
    }

    async fn insert_user(session: &mut DbSession, email: &str) -> FourierResult<()> {
        let conn = session.connection().await?;
        sqlx::query("INSERT INTO users (email, password) VALUES (?, 'hash')")
            .bind(email)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn manager() -> SessionManager {
        SessionManager::new(connect_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_transactional_session_commits_on_ok() {
        let manager = manager().await;
        let mut session = manager.acquire_transactional_session().await.unwrap();
        let result = insert_user(&mut session, "a@x.com").await;
        session.finish(result).await.unwrap();

        assert_eq!(user_count(&manager).await, 1);
    }

    #[tokio::test]
    async fn test_transactional_session_rolls_back_on_err() {
        let manager = manager().await;
        let mut session = manager.acquire_transactional_session().await.unwrap();
        insert_user(&mut session, "a@x.com").await.unwrap();
        let err = session
            .finish::<()>(Err(FourierError::validation("boom")))
            .await
            .unwrap_err();

        assert!(matches!(err, FourierError::Validation(_)));
        assert_eq!(user_count(&manager).await, 0);
    }

    #[tokio::test]
    async fn test_plain_session_never_commits() {
        let manager = manager().await;
        let mut session = manager.acquire_session().await.unwrap();
        assert!(!session.is_transactional());
        let result = insert_user(&mut session, "a@x.com").await;
        session.finish(result).await.unwrap();

        assert_eq!(user_count(&manager).await, 0);
    }

    #[tokio::test]
    async fn test_dropped_session_releases_connection() {
        let manager = manager().await;
        {
            let mut session = manager.acquire_transactional_session().await.unwrap();
            insert_user(&mut session, "a@x.com").await.unwrap();
        }

        // Single-connection pool: this only succeeds if the drop released it.
        let mut session = manager.acquire_session().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(session.connection().await.unwrap())
            .await
            .unwrap();
        assert_eq!(count, 0);
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_reopens_after_rollback() {
        let manager = manager().await;
        let mut session = manager.acquire_transactional_session().await.unwrap();
        insert_user(&mut session, "a@x.com").await.unwrap();
        session.rollback().await.unwrap();

        insert_user(&mut session, "b@x.com").await.unwrap();
        session.finish(Ok(())).await.unwrap();

        assert_eq!(user_count(&manager).await, 1);
    }

    #[tokio::test]
    async fn test_with_transaction_commits() {
        let manager = manager().await;
        let email = "closure@x.com".to_string();
        let inserted = manager
            .with_transaction(move |session| {
                Box::pin(async move {
                    insert_user(session, &email).await?;
                    Ok::<_, FourierError>(email)
                })
            })
            .await
            .unwrap();

        assert_eq!(inserted, "closure@x.com");
        assert_eq!(user_count(&manager).await, 1);
    }

    #[tokio::test]
    async fn test_with_transaction_rolls_back_and_reraises() {
        let manager = manager().await;
        let err = manager
            .with_transaction(|session| {
                Box::pin(async move {
                    insert_user(session, "a@x.com").await?;
                    Err::<(), _>(FourierError::internal("late failure"))
                })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, FourierError::Internal(_)));
        assert_eq!(user_count(&manager).await, 0);
    }

    #[tokio::test]
    async fn test_run_without_commit_discards_writes() {
        let manager = manager().await;
        let options =
            TransactionOptions::read_only().with_isolation_level(IsolationLevel::Serializable);
        manager
            .run(options, |session| {
                Box::pin(async move { insert_user(session, "a@x.com").await })
            })
            .await
            .unwrap();

        assert_eq!(user_count(&manager).await, 0);
    }

    #[tokio::test]
    async fn test_transactional_sessions_queue_for_the_write_lock() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", dir.path().join("db.sqlite3").display()),
            ..DatabaseConfig::default()
        };
        let pool = crate::create_pool(&config).await.unwrap();
        pool.run_migrations().await.unwrap();
        let manager = SessionManager::new(pool);

        let mut first = manager.acquire_transactional_session().await.unwrap();
        insert_user(&mut first, "a@x.com").await.unwrap();

        let second_manager = manager.clone();
        let second = tokio::spawn(async move {
            let mut session = second_manager.acquire_transactional_session().await?;
            let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(session.connection().await?)
                .await?;
            let result = insert_user(&mut session, "b@x.com").await.map(|()| found);
            session.finish(result).await
        });

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        first.finish(Ok(())).await.unwrap();

        // The second writer only began after the first committed.
        assert_eq!(second.await.unwrap().unwrap(), 1);
        assert_eq!(user_count(&manager).await, 2);
    }

    #[test]
    fn test_isolation_level_display() {
        assert_eq!(IsolationLevel::ReadCommitted.to_string(), "READ COMMITTED");
        assert!(TransactionOptions::default().commit);
        assert!(!TransactionOptions::read_only().commit);
    }
}

//! Database connection pool management.

use fourier_config::DatabaseConfig;
use fourier_core::{FourierError, FourierResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// Database pool wrapper.
#[derive(Clone)]
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    ///
    /// An in-memory database lives only as long as its connection, so such
    /// pools are pinned to a single connection that never idles out. Writers
    /// blocked by another transaction wait up to the connect timeout.
    pub async fn new(config: &DatabaseConfig) -> FourierResult<Self> {
        info!("Connecting to SQLite database...");

        let connect_options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| FourierError::Database(format!("Invalid database URL: {e}")))?
            .busy_timeout(config.connect_timeout());

        let options = SqlitePoolOptions::new().acquire_timeout(config.connect_timeout());
        let options = if config.is_in_memory() {
            options
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options
                .min_connections(config.min_connections)
                .max_connections(config.max_connections)
                .idle_timeout(Some(config.idle_timeout()))
        };

        let pool = options.connect_with(connect_options).await.map_err(|e| {
            warn!("Failed to connect to database: {}", e);
            FourierError::Database(format!("Failed to connect: {e}"))
        })?;

        info!("SQLite connection pool established");
        Ok(Self { pool })
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn inner(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checks if the database connection is healthy.
    pub async fn health_check(&self) -> FourierResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| FourierError::Database(format!("Health check failed: {e}")))?;
        Ok(())
    }

    /// Runs database migrations.
    pub async fn run_migrations(&self) -> FourierResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Closes the database pool.
    pub async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }

    /// Wraps a pre-existing pool.
    #[must_use]
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl std::ops::Deref for DatabasePool {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}

/// Creates the application pool, making sure the directory holding a
/// file-backed database exists first.
pub async fn create_pool(config: &DatabaseConfig) -> FourierResult<DatabasePool> {
    if !config.is_in_memory() {
        if let Some(dir) = database_dir(&config.url) {
            std::fs::create_dir_all(dir).map_err(|e| {
                FourierError::Database(format!(
                    "Failed to create database directory {}: {e}",
                    dir.display()
                ))
            })?;
        }
    }
    DatabasePool::new(config).await
}

/// Directory part of a `sqlite:` file URL, if it has one.
fn database_dir(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Opens an in-memory database with all migrations applied.
pub async fn connect_in_memory() -> FourierResult<DatabasePool> {
    let pool = DatabasePool::new(&DatabaseConfig::in_memory()).await?;
    pool.run_migrations().await?;
    Ok(pool)
}

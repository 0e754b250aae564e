//! Database connection pool management.

use crate::session::Session;
use async_trait::async_trait;
use sqlx::any::{AnyConnectOptions, AnyPoolOptions};
use sqlx::{AnyPool, ConnectOptions};
use std::fmt;
use std::str::FromStr;
use strata_config::DatabaseConfig;
use strata_core::{BoxFuture, Interface, StrataError, StrataResult};
use tracing::{info, warn};

/// SQL dialect of the connected database.
///
/// Selected from the URL scheme; decides placeholder style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// MySQL.
    #[default]
    MySql,
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    Sqlite,
}

impl Dialect {
    /// Resolves the dialect from a URL scheme.
    pub fn from_scheme(scheme: &str) -> StrataResult<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::MySql),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(StrataError::Configuration(format!(
                "Unsupported database scheme: {}",
                other
            ))),
        }
    }

    /// Resolves the dialect from a database URL.
    pub fn from_url(url: &str) -> StrataResult<Self> {
        let scheme = url
            .split_once(':')
            .map(|(scheme, _)| scheme)
            .filter(|scheme| !scheme.is_empty())
            .ok_or_else(|| StrataError::Configuration(format!("Database URL has no scheme: {}", url)))?;
        Self::from_scheme(scheme)
    }

    /// Bind placeholder for the 1-based parameter `index`.
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${}", index),
            Self::MySql | Self::Sqlite => "?".to_string(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        };
        write!(f, "{}", name)
    }
}

/// Interface for database pool operations.
///
/// DAOs hold an `Arc<dyn DatabasePoolInterface>` so the pool can be shared
/// and replaced in tests.
#[async_trait]
pub trait DatabasePoolInterface: Interface + Send + Sync {
    /// Returns a reference to the underlying SQLx pool.
    fn inner(&self) -> &AnyPool;

    /// Returns the SQL dialect of the connected database.
    fn dialect(&self) -> Dialect;

    /// Checks if the database connection is healthy.
    async fn health_check(&self) -> StrataResult<()>;

    /// Executes raw SQL, possibly several statements. Returns rows affected.
    async fn execute_script(&self, sql: &str) -> StrataResult<u64>;

    /// Opens a new unit of work.
    async fn begin(&self) -> StrataResult<Session>;

    /// Closes the pool.
    async fn close(&self);
}

/// Database pool wrapper.
pub struct DatabasePool {
    pool: AnyPool,
    dialect: Dialect,
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    pub async fn new(config: &DatabaseConfig) -> StrataResult<Self> {
        config.validate()?;
        let dialect = Dialect::from_url(&config.url)?;

        sqlx::any::install_default_drivers();

        info!("Connecting to {} database...", dialect);

        let mut options = AnyConnectOptions::from_str(&config.url)
            .map_err(|e| StrataError::Configuration(format!("Invalid database URL: {}", e)))?;
        if !config.log_queries {
            options = options.disable_statement_logging();
        }

        let pool = AnyPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                StrataError::Database(format!("Failed to connect: {}", e))
            })?;

        info!("{} connection pool established", dialect);
        Ok(Self { pool, dialect })
    }

    /// Wraps a pre-existing pool.
    #[must_use]
    pub fn with_pool(pool: AnyPool, dialect: Dialect) -> Self {
        Self { pool, dialect }
    }

    /// Runs `f` inside a unit of work. See [`crate::session::transaction`].
    pub async fn transaction<T, F>(&self, f: F) -> StrataResult<T>
    where
        T: Send,
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, T> + Send,
    {
        crate::session::transaction(self, f).await
    }
}

#[async_trait]
impl DatabasePoolInterface for DatabasePool {
    fn inner(&self) -> &AnyPool {
        &self.pool
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn health_check(&self) -> StrataResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StrataError::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    async fn execute_script(&self, sql: &str) -> StrataResult<u64> {
        let result = sqlx::raw_sql(sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn begin(&self) -> StrataResult<Session> {
        let tx = self.pool.begin().await?;
        Ok(Session::new(tx, self.dialect))
    }

    async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

impl fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabasePool")
            .field("dialect", &self.dialect)
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}

/// Creates a shared database pool.
pub async fn create_pool(config: &DatabaseConfig) -> StrataResult<std::sync::Arc<DatabasePool>> {
    let pool = DatabasePool::new(config).await?;
    Ok(std::sync::Arc::new(pool))
}

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DbConn};

use bloghub_core::error::RepoError;

use super::postgres_base::map_db_err;
use super::postgres_repo::{
    PostgresContactRepository, PostgresPostRepository, PostgresSubscriberRepository,
};

/// Configuration for the data-store database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` when `DATABASE_URL` is unset, which disables the
    /// data-store tier.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())?;

        Some(Self {
            url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            connect_timeout: Duration::from_secs(10),
        })
    }
}

/// Repositories sharing one connection pool.
#[derive(Clone)]
pub struct DataStore {
    pub posts: Arc<PostgresPostRepository>,
    pub subscribers: Arc<PostgresSubscriberRepository>,
    pub contacts: Arc<PostgresContactRepository>,
}

impl DataStore {
    /// Connect to the database described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, RepoError> {
        tracing::info!("Initializing database connection...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false)
            .to_owned();

        let db = Database::connect(opts).await.map_err(|e| match map_db_err(e) {
            RepoError::Query(msg) => RepoError::Connection(msg),
            other => other,
        })?;
        tracing::info!("Database connected (pool: {})", config.max_connections);

        Ok(Self::from_connection(db))
    }

    pub fn from_connection(db: DbConn) -> Self {
        Self {
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            subscribers: Arc::new(PostgresSubscriberRepository::new(db.clone())),
            contacts: Arc::new(PostgresContactRepository::new(db)),
        }
    }
}

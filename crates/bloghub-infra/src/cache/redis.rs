//! Redis key-value store - a shared local cache for multi-process setups.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use bloghub_core::ports::{CacheError, KeyValueStore};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Prefix applied to every key so the cache can share a database.
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "bloghub:".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "bloghub:".to_string()),
        }
    }
}

/// Redis-backed key-value store.
///
/// Uses connection manager for automatic reconnection.
pub struct RedisKeyValueStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisKeyValueStore {
    pub async fn new(config: RedisConfig) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Connection("Connection timed out".to_string()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, prefix = %config.key_prefix, "Connected to Redis cache");

        Ok(Self {
            conn,
            prefix: config.key_prefix,
        })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, CacheError> {
        Self::new(RedisConfig::from_env()).await
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(self.key(key))
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(self.key(key), value)
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(key))
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn
            .keys(format!("{}*", self.prefix))
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))?;

        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(&self.prefix).map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn get_test_store() -> Option<RedisKeyValueStore> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            key_prefix: format!("bloghub-test-{}:", uuid::Uuid::new_v4()),
        };

        RedisKeyValueStore::new(config).await.ok()
    }

    #[tokio::test]
    async fn test_redis_store_set_get_remove() {
        let store = match get_test_store().await {
            Some(s) => s,
            None => {
                tracing::warn!("Redis not available, skipping test");
                return;
            }
        };

        store.set("theme", "dark").await.unwrap();
        assert_eq!(store.get("theme").await.unwrap(), Some("dark".to_string()));
        assert_eq!(store.keys().await.unwrap(), vec!["theme".to_string()]);

        store.remove("theme").await.unwrap();
        assert_eq!(store.get("theme").await.unwrap(), None);
    }
}

use async_trait::async_trait;

/// Key-value store trait - abstraction over local cache backends
/// (on-device file, in-memory, Redis).
///
/// No expiry, no size bound, no versioning. Concurrent writers of the same
/// key are not coordinated: the last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a raw value. A key that was never written is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Set a raw value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// List the keys currently stored.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;
}

/// Cache operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("I/O failed: {0}")]
    Io(String),
}

//! In-memory key-value store - used for tests and ephemeral sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use bloghub_core::ports::{CacheError, KeyValueStore};

/// In-memory store using a simple HashMap with async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryKeyValueStore {
    store: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let store = self.store.read().await;
        Ok(store.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let store = self.store.read().await;
        let mut keys: Vec<String> = store.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryKeyValueStore::new();
        store.set("theme", "dark").await.unwrap();
        assert_eq!(store.get("theme").await.unwrap(), Some("dark".to_string()));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = InMemoryKeyValueStore::new();
        store.set("view_mode", "grid").await.unwrap();
        store.set("view_mode", "list").await.unwrap();
        assert_eq!(store.get("view_mode").await.unwrap(), Some("list".to_string()));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemoryKeyValueStore::new();
        store.set("theme", "dark").await.unwrap();
        store.remove("theme").await.unwrap();
        store.remove("never_written").await.unwrap();
        assert_eq!(store.get("theme").await.unwrap(), None);
        assert!(store.keys().await.unwrap().is_empty());
    }
}

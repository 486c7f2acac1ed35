//! Typed JSON helpers over a raw [`KeyValueStore`].

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ports::{CacheError, KeyValueStore};

/// JSON view of the local key-value store.
///
/// Reads are forgiving: a key that was never written, or one holding
/// malformed JSON, reads as empty. Writes propagate their errors.
#[derive(Clone)]
pub struct LocalCache {
    store: Arc<dyn KeyValueStore>,
}

impl LocalCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Decode a JSON value, `None` when missing or malformed.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding malformed cache entry");
                Ok(None)
            }
        }
    }

    /// Decode a JSON value, erroring on malformed content instead of hiding it.
    pub async fn get_json_strict<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        match self.store.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| CacheError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let raw =
            serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.store.set(key, &raw).await
    }

    /// A JSON collection; never-written keys are an empty collection.
    pub async fn list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, CacheError> {
        Ok(self.get_json(key).await?.unwrap_or_default())
    }

    /// Like [`list`](Self::list) but any read failure also yields an empty list.
    pub async fn list_or_empty<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.list(key).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Local cache read failed");
                Vec::new()
            }
        }
    }

    /// Read-modify-write a JSON collection. Not atomic across writers.
    pub async fn update_list<T, R>(
        &self,
        key: &str,
        f: impl FnOnce(&mut Vec<T>) -> R,
    ) -> Result<R, CacheError>
    where
        T: DeserializeOwned + Serialize,
    {
        let mut items: Vec<T> = self.list(key).await?;
        let result = f(&mut items);
        self.set_json(key, &items).await?;
        Ok(result)
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.store.get(key).await
    }

    pub async fn set_string(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.store.set(key, value).await
    }

    pub async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use std::collections::HashMap;

    fn cache() -> LocalCache {
        LocalCache::new(Arc::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn test_never_written_key_is_empty_collection() {
        let cache = cache();
        let items: Vec<String> = cache.list("never_written").await.unwrap();
        assert!(items.is_empty());

        let map: Option<HashMap<String, bool>> = cache.get_json("never_written").await.unwrap();
        assert!(map.is_none());
    }

    #[tokio::test]
    async fn test_malformed_entry_reads_as_empty() {
        let cache = cache();
        cache.set_string("broken", "{not json").await.unwrap();

        let items: Vec<u32> = cache.list("broken").await.unwrap();
        assert!(items.is_empty());

        let strict = cache.get_json_strict::<Vec<u32>>("broken").await;
        assert!(matches!(strict, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_update_list_persists() {
        let cache = cache();
        let len = cache
            .update_list("numbers", |items: &mut Vec<u32>| {
                items.push(4);
                items.push(2);
                items.len()
            })
            .await
            .unwrap();

        assert_eq!(len, 2);
        assert_eq!(cache.list::<u32>("numbers").await.unwrap(), vec![4, 2]);
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = cache();
        cache.set_json("k", &vec![1]).await.unwrap();
        cache.remove("k").await.unwrap();
        assert!(cache.get_string("k").await.unwrap().is_none());
    }
}

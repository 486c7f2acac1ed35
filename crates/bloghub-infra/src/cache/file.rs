//! File-backed key-value store - the on-device persistence of the local cache.
//!
//! All entries live in one JSON object. Every write rewrites the file through a
//! temporary sibling and a rename, so a crash never leaves a half-written file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use bloghub_core::ports::{CacheError, KeyValueStore};

const FILE_NAME: &str = "local_cache.json";

pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty store. A corrupt file is logged and
    /// treated as empty; it is replaced on the next write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::Io(format!("{}: {e}", parent.display())))?;
        }

        let entries: BTreeMap<String, String> = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Local cache file is corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(CacheError::Io(format!("{}: {e}", path.display()))),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "Opened local cache");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Default location under the platform data directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("bloghub").join(FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), CacheError> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| CacheError::Io(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CacheError::Io(format!("{}: {e}", self.path.display())))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }
}

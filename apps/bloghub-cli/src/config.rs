//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bloghub_core::fetch::{FallbackPolicy, Tier};

#[cfg(feature = "postgres")]
use bloghub_infra::database::DatabaseConfig;
#[cfg(feature = "http")]
use bloghub_infra::remote::RemoteConfig;

/// Where the local cache lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    File,
    Memory,
    Redis,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(format!("unknown cache backend: {other}")),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cache_backend: CacheBackend,
    /// Overrides the platform data directory for the file backend.
    pub cache_path: Option<PathBuf>,
    /// Display name used for new posts and comments.
    pub author: String,
    pub policy: FallbackPolicy,
    #[cfg(feature = "http")]
    pub remote: Option<RemoteConfig>,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let cache_backend = match env::var("CACHE_BACKEND") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to the file cache backend");
                CacheBackend::File
            }),
            Err(_) => CacheBackend::File,
        };

        Self {
            cache_backend,
            cache_path: env::var("BLOGHUB_CACHE_PATH").ok().map(PathBuf::from),
            author: env::var("BLOGHUB_AUTHOR").unwrap_or_else(|_| "Admin".to_string()),
            policy: fallback_policy(
                millis("FETCH_REMOTE_TIMEOUT_MS"),
                millis("FETCH_STORE_TIMEOUT_MS"),
            ),
            #[cfg(feature = "http")]
            remote: RemoteConfig::from_env(),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
        }
    }
}

fn millis(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|ms: &u64| *ms > 0)
        .map(Duration::from_millis)
}

/// Standard tier order with optional per-tier timeouts.
fn fallback_policy(remote: Option<Duration>, store: Option<Duration>) -> FallbackPolicy {
    let mut policy = FallbackPolicy::standard();
    if let Some(timeout) = remote {
        policy = policy.with_timeout(Tier::RemoteFunction, timeout);
    }
    if let Some(timeout) = store {
        policy = policy.with_timeout(Tier::DataStore, timeout);
    }
    policy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_backend_parse() {
        assert_eq!("File".parse::<CacheBackend>().unwrap(), CacheBackend::File);
        assert_eq!(" redis ".parse::<CacheBackend>().unwrap(), CacheBackend::Redis);
        assert!("sqlite".parse::<CacheBackend>().is_err());
    }

    #[test]
    fn test_fallback_policy_timeouts() {
        let policy = fallback_policy(Some(Duration::from_millis(1500)), None);

        assert_eq!(
            policy.timeout_for(Tier::RemoteFunction),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(policy.timeout_for(Tier::DataStore), None);
        assert_eq!(policy.tiers().len(), 3);
    }
}

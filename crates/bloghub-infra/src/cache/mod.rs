//! Key-value store implementations backing the local cache.

mod file;
mod memory;

pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisKeyValueStore};

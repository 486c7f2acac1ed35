//! # BlogHub Infrastructure
//!
//! Concrete implementations of the ports defined in `bloghub-core`.
//! This crate contains the remote function client, the data-store
//! repositories, the local cache backends and the event bus.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, file/in-memory only
//! - `postgres` - PostgreSQL data store via SeaORM
//! - `http` - Remote functions over HTTPS via reqwest
//! - `redis` - Redis backend for the local cache

pub mod cache;
pub mod events;

#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "http")]
pub mod remote;

// Re-exports - Local
pub use cache::{FileKeyValueStore, InMemoryKeyValueStore};
pub use events::InMemoryEventBus;

#[cfg(feature = "postgres")]
pub use database::{DataStore, DatabaseConfig};

#[cfg(feature = "http")]
pub use remote::{HttpRemoteFunctions, RemoteConfig};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisConfig, RedisKeyValueStore};

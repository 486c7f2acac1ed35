//! Data-store tier: PostgreSQL via SeaORM.

mod connections;
mod postgres_base;
pub mod postgres_repo;

pub mod entity;

pub use connections::{DataStore, DatabaseConfig};
pub use postgres_repo::{
    PostgresContactRepository, PostgresPostRepository, PostgresSubscriberRepository,
};

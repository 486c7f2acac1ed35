//! # BlogHub Core
//!
//! The client-side data layer of BlogHub.
//! This crate holds the domain types, the ports infrastructure must implement,
//! the tiered fetch orchestrator and the services built on top of them.
//! It has no infrastructure dependencies.

pub mod cache;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod ports;
pub mod services;
pub mod state;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DomainError, RepoError};
pub use fetch::{FallbackPolicy, FetchError, FetchOrchestrator, Fetched, Tier};

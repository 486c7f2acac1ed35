//! Tiered fetching: remote function, then data store, then local cache.

mod error;
mod orchestrator;
mod policy;

pub use error::{FetchError, TierFailure};
pub use orchestrator::{Attempts, FetchOrchestrator, Fetched, TierFuture};
pub use policy::{FallbackPolicy, Tier, TierPolicy};

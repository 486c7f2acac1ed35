//! Fetch errors - one per tier attempt, plus exhaustion.

use std::time::Duration;

use thiserror::Error;

use super::policy::Tier;
use crate::error::RepoError;
use crate::ports::CacheError;

/// Why a tier failed to serve a request.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Transport failed: {0}")]
    Transport(String),

    #[error("Remote function returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Data store error: {0}")]
    Store(#[from] RepoError),

    #[error("Local cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("{tier} timed out after {after:?}")]
    Timeout { tier: Tier, after: Duration },

    #[error("Not found")]
    NotFound,

    #[error("No tier available")]
    Unavailable,

    #[error("All tiers failed for {operation}: {}", summarize(.failures))]
    Exhausted {
        operation: &'static str,
        failures: Vec<TierFailure>,
    },
}

impl FetchError {
    /// True when every attempted tier reported the record as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            FetchError::NotFound => true,
            FetchError::Exhausted { failures, .. } => {
                !failures.is_empty()
                    && failures
                        .iter()
                        .all(|f| matches!(f.error, FetchError::NotFound))
            }
            _ => false,
        }
    }
}

/// A failed attempt at one tier.
#[derive(Debug, Clone)]
pub struct TierFailure {
    pub tier: Tier,
    pub error: FetchError,
}

fn summarize(failures: &[TierFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.tier, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

//! Fetch orchestrator - runs per-tier attempts in policy order.

use std::future::Future;

use futures::future::BoxFuture;

use super::error::{FetchError, TierFailure};
use super::policy::{FallbackPolicy, Tier};

/// A boxed, not-yet-started tier attempt.
pub type TierFuture<'a, T> = BoxFuture<'a, Result<T, FetchError>>;

/// The attempts available for one operation, keyed by tier.
///
/// Futures are lazy: an attempt that the orchestrator never reaches is
/// dropped without running.
pub struct Attempts<'a, T> {
    entries: Vec<(Tier, TierFuture<'a, T>)>,
}

impl<'a, T> Attempts<'a, T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register the attempt for a tier, replacing any earlier one.
    pub fn tier<F>(mut self, tier: Tier, attempt: F) -> Self
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'a,
    {
        self.entries.retain(|(t, _)| *t != tier);
        self.entries.push((tier, Box::pin(attempt)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn take(&mut self, tier: Tier) -> Option<TierFuture<'a, T>> {
        let pos = self.entries.iter().position(|(t, _)| *t == tier)?;
        Some(self.entries.swap_remove(pos).1)
    }
}

impl<T> Default for Attempts<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A value together with the tier that produced it and the failures before it.
#[derive(Debug)]
pub struct Fetched<T> {
    pub value: T,
    pub tier: Tier,
    pub failures: Vec<TierFailure>,
}

impl<T> Fetched<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            tier: self.tier,
            failures: self.failures,
        }
    }

    /// True when a tier earlier in the chain failed.
    pub fn is_fallback(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Runs the fallback chain described by a [`FallbackPolicy`].
///
/// No retries and no backoff: each tier in the policy is attempted at most
/// once, sequentially, and the first success wins.
#[derive(Debug, Clone, Default)]
pub struct FetchOrchestrator {
    policy: FallbackPolicy,
}

impl FetchOrchestrator {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// Run `attempts` in policy order.
    ///
    /// Tiers without an attempt are skipped. If no tier was attempted at all
    /// the result is [`FetchError::Unavailable`]; if every attempted tier
    /// failed it is [`FetchError::Exhausted`].
    pub async fn execute<T>(
        &self,
        operation: &'static str,
        mut attempts: Attempts<'_, T>,
    ) -> Result<Fetched<T>, FetchError> {
        let mut failures = Vec::new();

        for step in self.policy.tiers() {
            let Some(attempt) = attempts.take(step.tier) else {
                tracing::trace!(operation, tier = %step.tier, "No attempt for tier, skipping");
                continue;
            };

            let result = match step.timeout {
                Some(after) => match tokio::time::timeout(after, attempt).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout {
                        tier: step.tier,
                        after,
                    }),
                },
                None => attempt.await,
            };

            match result {
                Ok(value) => {
                    if failures.is_empty() {
                        tracing::debug!(operation, tier = %step.tier, "Served by primary tier");
                    } else {
                        tracing::info!(
                            operation,
                            tier = %step.tier,
                            failed_tiers = failures.len(),
                            "Served by fallback tier"
                        );
                    }
                    return Ok(Fetched {
                        value,
                        tier: step.tier,
                        failures,
                    });
                }
                Err(error) => {
                    tracing::warn!(operation, tier = %step.tier, error = %error, "Tier failed");
                    failures.push(TierFailure {
                        tier: step.tier,
                        error,
                    });
                }
            }
        }

        if failures.is_empty() {
            return Err(FetchError::Unavailable);
        }

        Err(FetchError::Exhausted {
            operation,
            failures,
        })
    }
}

//! Fallback policy - which tiers run, in which order, with which timeout.

use std::fmt;
use std::time::Duration;

/// One step of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Hosted per-operation HTTP function.
    RemoteFunction,
    /// Direct table access on the hosted relational store.
    DataStore,
    /// On-device key-value cache.
    LocalCache,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::RemoteFunction => "remote_function",
            Tier::DataStore => "data_store",
            Tier::LocalCache => "local_cache",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tier together with its own timeout. `None` waits indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    pub tier: Tier,
    pub timeout: Option<Duration>,
}

impl TierPolicy {
    pub fn new(tier: Tier) -> Self {
        Self { tier, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Ordered list of tiers; each tier is attempted at most once per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    tiers: Vec<TierPolicy>,
}

impl FallbackPolicy {
    /// Build a policy. A tier listed twice keeps its first position.
    pub fn new(tiers: impl IntoIterator<Item = TierPolicy>) -> Self {
        let mut ordered: Vec<TierPolicy> = Vec::new();
        for step in tiers {
            if !ordered.iter().any(|s| s.tier == step.tier) {
                ordered.push(step);
            }
        }
        Self { tiers: ordered }
    }

    /// Remote function, then data store, then local cache; no timeouts.
    pub fn standard() -> Self {
        Self::new([
            TierPolicy::new(Tier::RemoteFunction),
            TierPolicy::new(Tier::DataStore),
            TierPolicy::new(Tier::LocalCache),
        ])
    }

    /// Set the timeout of a tier already in the policy.
    pub fn with_timeout(mut self, tier: Tier, timeout: Duration) -> Self {
        if let Some(step) = self.tiers.iter_mut().find(|s| s.tier == tier) {
            step.timeout = Some(timeout);
        }
        self
    }

    /// Drop a tier from the chain.
    pub fn without(mut self, tier: Tier) -> Self {
        self.tiers.retain(|s| s.tier != tier);
        self
    }

    pub fn tiers(&self) -> &[TierPolicy] {
        &self.tiers
    }

    pub fn timeout_for(&self, tier: Tier) -> Option<Duration> {
        self.tiers
            .iter()
            .find(|s| s.tier == tier)
            .and_then(|s| s.timeout)
    }

    pub fn contains(&self, tier: Tier) -> bool {
        self.tiers.iter().any(|s| s.tier == tier)
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order() {
        let order: Vec<Tier> = FallbackPolicy::standard()
            .tiers()
            .iter()
            .map(|s| s.tier)
            .collect();
        assert_eq!(
            order,
            vec![Tier::RemoteFunction, Tier::DataStore, Tier::LocalCache]
        );
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let policy = FallbackPolicy::new([
            TierPolicy::new(Tier::LocalCache),
            TierPolicy::new(Tier::RemoteFunction),
            TierPolicy::new(Tier::LocalCache).with_timeout(Duration::from_secs(1)),
        ]);
        assert_eq!(policy.tiers().len(), 2);
        assert_eq!(policy.tiers()[0].tier, Tier::LocalCache);
        assert_eq!(policy.timeout_for(Tier::LocalCache), None);
    }

    #[test]
    fn test_with_timeout_and_without() {
        let policy = FallbackPolicy::standard()
            .with_timeout(Tier::RemoteFunction, Duration::from_millis(250))
            .without(Tier::DataStore);

        assert_eq!(
            policy.timeout_for(Tier::RemoteFunction),
            Some(Duration::from_millis(250))
        );
        assert!(!policy.contains(Tier::DataStore));
    }
}

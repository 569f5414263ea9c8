//! Rate Limiting Infrastructure
//!
//! Per-client token buckets backed by `governor`. A bucket holds
//! `max_requests` tokens and refills one token every
//! `window / max_requests`, so a client never gets more than one burst
//! back to back.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DashMapStateStore;
use governor::{Quota, RateLimiter};
use thiserror::Error;

/// Checks between sweeps of idle buckets
const PRUNE_EVERY: u64 = 1024;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Bucket capacity, also the number of tokens refilled per window
    pub max_requests: u32,
    /// Time to refill an empty bucket
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Governor quota for this bucket
    ///
    /// Zero values are raised to the smallest usable bucket.
    pub fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.max_requests).unwrap_or(NonZeroU32::MIN);
        let period = (self.window / burst.get()).max(Duration::from_millis(1));

        Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }
}

/// Outcome of a single rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Whole seconds for a `Retry-After` header, at least one
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Allowed { .. } => None,
            Self::Limited { retry_after } => {
                let secs = retry_after.as_millis().div_ceil(1000).max(1);
                Some(u64::try_from(secs).unwrap_or(u64::MAX))
            }
        }
    }
}

/// Rate limit backend failure
#[derive(Debug, Error)]
pub enum RateLimitError {
    /// Bucket storage could not be read or written
    #[error("Rate limit store unavailable: {0}")]
    Unavailable(String),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Take one token from the bucket for `key`
    async fn check(&self, key: &str) -> Result<RateLimitDecision, RateLimitError>;
}

type KeyedLimiter<C> =
    RateLimiter<String, DashMapStateStore<String>, C, StateInformationMiddleware>;

/// Process-local keyed token buckets
pub struct GovernorRateLimitStore<C: Clock = DefaultClock> {
    limiter: KeyedLimiter<C>,
    clock: C,
    quota: Quota,
    checks: AtomicU64,
}

impl GovernorRateLimitStore {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_clock(config, DefaultClock::default())
    }
}

impl<C: Clock + Clone> GovernorRateLimitStore<C> {
    pub fn with_clock(config: &RateLimitConfig, clock: C) -> Self {
        let quota = config.quota();
        let limiter = RateLimiter::dashmap_with_clock(quota, clock.clone())
            .with_middleware::<StateInformationMiddleware>();

        Self {
            limiter,
            clock,
            quota,
            checks: AtomicU64::new(0),
        }
    }

    /// Take one token for `key` at the store's clock
    pub fn check_now(&self, key: &str) -> RateLimitDecision {
        // Full buckets carry no information; drop them now and then
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.limiter.retain_recent();
        }

        match self.limiter.check_key(&key.to_string()) {
            Ok(snapshot) => RateLimitDecision::Allowed {
                remaining: snapshot.remaining_burst_capacity(),
            },
            Err(not_until) => RateLimitDecision::Limited {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        }
    }
}

impl<C: Clock> std::fmt::Debug for GovernorRateLimitStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernorRateLimitStore")
            .field("quota", &self.quota)
            .field("tracked_keys", &self.limiter.len())
            .finish()
    }
}

impl<C> RateLimitStore for GovernorRateLimitStore<C>
where
    C: Clock + Clone + Send + Sync,
{
    async fn check(&self, key: &str) -> Result<RateLimitDecision, RateLimitError> {
        Ok(self.check_now(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;

    fn store(
        max_requests: u32,
        window_secs: u64,
    ) -> (GovernorRateLimitStore<FakeRelativeClock>, FakeRelativeClock) {
        let clock = FakeRelativeClock::default();
        let store = GovernorRateLimitStore::with_clock(
            &RateLimitConfig::new(max_requests, window_secs),
            clock.clone(),
        );
        (store, clock)
    }

    #[test]
    fn test_allows_burst_then_limits() {
        let (store, _) = store(3, 60);

        for expected in [2, 1, 0] {
            assert_eq!(
                store.check_now("10.0.0.1"),
                RateLimitDecision::Allowed { remaining: expected }
            );
        }

        let blocked = store.check_now("10.0.0.1");
        assert!(!blocked.is_allowed());
        assert_eq!(blocked.retry_after_secs(), Some(20));
    }

    #[test]
    fn test_keys_are_independent() {
        let (store, _) = store(1, 60);

        assert!(store.check_now("a").is_allowed());
        assert!(!store.check_now("a").is_allowed());
        assert!(store.check_now("b").is_allowed());
    }

    #[test]
    fn test_refills_one_token_per_period() {
        let (store, clock) = store(3, 60);
        for _ in 0..3 {
            assert!(store.check_now("a").is_allowed());
        }

        clock.advance(Duration::from_secs(20));
        assert!(store.check_now("a").is_allowed());
        assert!(!store.check_now("a").is_allowed());
    }

    #[test]
    fn test_no_double_burst_across_window_edge() {
        let (store, clock) = store(3, 60);

        clock.advance(Duration::from_secs(59));
        for _ in 0..3 {
            assert!(store.check_now("a").is_allowed());
        }

        clock.advance(Duration::from_secs(1));
        assert!(!store.check_now("a").is_allowed());
    }

    #[test]
    fn test_zero_config_uses_smallest_bucket() {
        let (store, _) = store(0, 0);
        assert!(store.check_now("a").is_allowed());
        assert!(!store.check_now("a").is_allowed());
    }

    #[tokio::test]
    async fn test_store_trait() {
        let store = GovernorRateLimitStore::new(&RateLimitConfig::default());
        let decision = RateLimitStore::check(&store, "k").await.unwrap();
        assert_eq!(decision, RateLimitDecision::Allowed { remaining: 9 });
    }
}

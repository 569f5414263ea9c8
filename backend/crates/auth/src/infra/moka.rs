//! In-process Revocation Cache
//!
//! Bounded moka cache with a per-entry time-to-live. Correct for a single
//! instance only; multi-instance deployments use the Postgres store.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;

use crate::domain::repository::RevocationStore;
use crate::error::AuthResult;

/// Default upper bound on tracked revocations
pub const DEFAULT_REVOCATION_CAPACITY: u64 = 10_000;

#[derive(Clone)]
struct RevokedEntry {
    token: String,
    ttl: Duration,
}

/// Each entry lives for the TTL given at its latest `put`
struct PerEntryTtl;

impl Expiry<String, RevokedEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &RevokedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &RevokedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

#[derive(Clone)]
pub struct MokaRevocationStore {
    cache: Cache<String, RevokedEntry>,
}

impl Default for MokaRevocationStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_REVOCATION_CAPACITY)
    }
}

impl MokaRevocationStore {
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .name("revoked-tokens")
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }
}

impl RevocationStore for MokaRevocationStore {
    async fn put(&self, key: &str, token: &str, ttl: Duration) -> AuthResult<()> {
        self.cache
            .insert(
                key.to_string(),
                RevokedEntry {
                    token: token.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.token))
    }
}

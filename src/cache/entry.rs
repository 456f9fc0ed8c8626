//! Cache Entry Module
//!
//! Value plus absolute expiration instant, stored by the TTL cache.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single TTL cache entry. Never handed out by the cache.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Monotonic instant at which the entry stops being readable
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Creates an entry expiring `ttl` after `now`.
    pub fn new(value: V, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` reaches its expiration instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at <= now
    }

    /// Restarts the entry's lifespan from `now`.
    pub fn refresh(&mut self, now: Instant, ttl: Duration) {
        self.expires_at = now + ttl;
    }

    /// Remaining lifespan, zero once expired.
    pub fn ttl_remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

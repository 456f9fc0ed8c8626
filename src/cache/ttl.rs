//! TTL Cache Module
//!
//! Capacity-bounded map whose entries expire a fixed duration after insertion
//! or refresh. Expiration is lazy: reads hide expired entries but only
//! [`TtlCache::evict_expired`] or overflow eviction removes them.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use ::lru::LruCache as OrderedMap;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::entry::CacheEntry;
use crate::cache::CacheStats;
use crate::error::{CacheError, KeyNotFound, Result};

// == TTL Cache ==
/// Time-to-live cache with oldest-position eviction on overflow.
///
/// Time is read from [`tokio::time::Instant`], which is monotonic and follows
/// a paused test clock when one is active.
///
/// Not synchronized. Wrap in a lock to share across threads.
pub struct TtlCache<K, V> {
    /// Entries in insertion/refresh/read order, oldest at the back
    entries: OrderedMap<K, CacheEntry<V>>,
    /// Lookup, eviction and sweep counters
    stats: CacheStats,
    /// Maximum number of entries, expired ones included
    capacity: usize,
    /// Lifespan given to each entry on insert or refresh
    ttl: Duration,
}

impl<K: Hash + Eq, V> TtlCache<K, V> {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Errors
    /// `CacheError::InvalidArgument` if `capacity` or `ttl` is zero.
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidArgument(
                "capacity must be positive".to_string(),
            ));
        }
        if ttl.is_zero() {
            return Err(CacheError::InvalidArgument(
                "ttl must be positive".to_string(),
            ));
        }

        Ok(Self {
            entries: OrderedMap::unbounded(),
            stats: CacheStats::new(),
            capacity,
            ttl,
        })
    }

    // == Get ==
    /// Returns the live value for `key` without extending its lifespan.
    ///
    /// Shorthand for `get_with(key, false)`.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_with(key, false)
    }

    // == Get With ==
    /// Returns the live value for `key`.
    ///
    /// An expired entry reads as `None` and is left in place. A live entry
    /// moves to the most recent position; with `update_expiration` its
    /// lifespan also restarts from now.
    pub fn get_with<Q>(&mut self, key: &Q, update_expiration: bool) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let live = self
            .entries
            .peek(key)
            .is_some_and(|entry| !entry.is_expired_at(now));

        if !live {
            self.stats.record_miss();
            return None;
        }
        self.stats.record_hit();

        let ttl = self.ttl;
        let entry = self.entries.get_mut(key)?;
        if update_expiration {
            entry.refresh(now, ttl);
        }
        Some(&entry.value)
    }

    // == Try Get ==
    /// Like [`get`](Self::get), but a missing or expired key is an error
    /// carrying the key.
    pub fn try_get<Q>(&mut self, key: &Q) -> std::result::Result<&V, KeyNotFound<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        self.get(key).ok_or_else(|| KeyNotFound::new(key.to_owned()))
    }

    // == Set ==
    /// Inserts `key` at the most recent position with a fresh lifespan.
    ///
    /// An existing key is refreshed in place. A new key arriving when the
    /// cache is full evicts the oldest entry by position, whether or not it
    /// has expired.
    pub fn set(&mut self, key: K, value: V) {
        let now = Instant::now();

        if !self.entries.contains(&key) && self.entries.len() >= self.capacity {
            if let Some((_, evicted)) = self.entries.pop_lru() {
                self.stats.record_eviction();
                debug!(
                    capacity = self.capacity,
                    expired = evicted.is_expired_at(now),
                    "TTL cache full, evicted oldest entry"
                );
            }
        }

        self.entries.put(key, CacheEntry::new(value, now, self.ttl));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Delete ==
    /// Removes `key` whether or not it has expired, returning its value.
    pub fn delete<Q>(&mut self, key: &Q) -> std::result::Result<V, KeyNotFound<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let entry = self
            .entries
            .pop(key)
            .ok_or_else(|| KeyNotFound::new(key.to_owned()))?;
        self.stats.set_total_entries(self.entries.len());
        Ok(entry.value)
    }

    // == Evict Expired ==
    /// Removes every expired entry, keeping the order of the survivors.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&mut self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        // One full rotation: each entry is popped from the oldest end and live
        // ones are pushed back at the newest end, so relative order is kept.
        for _ in 0..self.entries.len() {
            let Some((key, entry)) = self.entries.pop_lru() else {
                break;
            };
            if entry.is_expired_at(now) {
                removed += 1;
            } else {
                self.entries.put(key, entry);
            }
        }

        self.stats.record_expired(removed);
        self.stats.set_total_entries(self.entries.len());
        if removed > 0 {
            debug!("TTL sweep: removed {} expired entries", removed);
        }
        removed
    }

    // == Contains ==
    /// Physical membership check.
    ///
    /// Expired entries that have not been swept still count as present, so
    /// `contains` can be true while `get` returns `None`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains(key)
    }

    // == TTL Remaining ==
    /// Remaining lifespan of `key`, zero if expired, `None` if absent.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.entries.peek(key).map(|entry| entry.ttl_remaining(now))
    }

    // == Clear ==
    /// Removes every entry, live or expired. Counters other than the entry
    /// count are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Length ==
    /// Number of entries, counting expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries, expired ones included.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Capacity ==
    /// Maximum number of entries before eviction starts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == TTL ==
    /// Lifespan given to entries on insert and refresh.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }
}

impl<K: Hash + Eq + fmt::Debug, V: fmt::Debug> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<_> = self
            .entries
            .iter()
            .rev()
            .map(|(key, entry)| (key, &entry.value))
            .collect();
        f.debug_struct("TtlCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("len", &self.entries.len())
            .field("entries", &entries)
            .finish()
    }
}

//! LRU Cache Module
//!
//! Capacity-bounded map evicting the least recently used entry on overflow.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use ::lru::LruCache as OrderedMap;
use tracing::debug;

use crate::cache::CacheStats;
use crate::error::{CacheError, KeyNotFound, Result};

// == LRU Cache ==
/// Least-recently-used cache with a fixed entry capacity.
///
/// The backing map is kept in recency order:
/// - Back = least recently used (next eviction victim)
/// - Front = most recently used
///
/// Not synchronized. Wrap in a lock to share across threads.
pub struct LruCache<K, V> {
    /// Recency-ordered storage, unbounded; capacity is enforced here
    entries: OrderedMap<K, V>,
    /// Lookup and eviction counters
    stats: CacheStats,
    /// Maximum number of entries
    capacity: usize,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Errors
    /// `CacheError::InvalidArgument` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidArgument(
                "capacity must be positive".to_string(),
            ));
        }

        Ok(Self {
            entries: OrderedMap::unbounded(),
            stats: CacheStats::new(),
            capacity,
        })
    }

    // == Get ==
    /// Returns the value for `key`, marking it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.get(key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Try Get ==
    /// Like [`get`](Self::get), but a miss is an error carrying the key.
    pub fn try_get<Q>(&mut self, key: &Q) -> std::result::Result<&V, KeyNotFound<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        self.get(key).ok_or_else(|| KeyNotFound::new(key.to_owned()))
    }

    // == Set ==
    /// Inserts or overwrites `key`, marking it most recently used.
    ///
    /// When the insert pushes the size past capacity, exactly one entry is
    /// evicted: the least recently used one.
    pub fn set(&mut self, key: K, value: V) {
        self.entries.put(key, value);

        if self.entries.len() > self.capacity && self.entries.pop_lru().is_some() {
            self.stats.record_eviction();
            debug!(capacity = self.capacity, "LRU cache full, evicted least recently used entry");
        }

        self.stats.set_total_entries(self.entries.len());
    }

    // == Delete ==
    /// Removes `key`, returning its value.
    pub fn delete<Q>(&mut self, key: &Q) -> std::result::Result<V, KeyNotFound<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let value = self
            .entries
            .pop(key)
            .ok_or_else(|| KeyNotFound::new(key.to_owned()))?;
        self.stats.set_total_entries(self.entries.len());
        Ok(value)
    }

    // == Contains ==
    /// Presence check. Does not change recency order.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains(key)
    }

    // == Clear ==
    /// Removes every entry. Counters other than the entry count are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Length ==
    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Capacity ==
    /// Maximum number of entries before eviction starts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }
}

impl<K: Hash + Eq + fmt::Debug, V: fmt::Debug> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Oldest first, matching eviction order
        let entries: Vec<_> = self.entries.iter().rev().collect();
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.len())
            .field("entries", &entries)
            .finish()
    }
}

//! Cache Module
//!
//! Bounded in-memory key-value caches with LRU and TTL eviction.

mod entry;
mod lru;
mod stats;
mod ttl;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use self::lru::LruCache;
pub use stats::CacheStats;
pub use ttl::TtlCache;

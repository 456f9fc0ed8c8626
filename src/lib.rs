//! Power Cache - In-process caching primitives
//!
//! Provides LRU and TTL caches plus sync and async function memoization.
//!
//! None of the caches synchronize internally. The memoized wrappers lock
//! their cache only around lookups and stores.

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod memoize;
pub mod tasks;

pub use cache::{CacheStats, LruCache, TtlCache};
pub use config::Config;
pub use error::{CacheError, KeyNotFound, Result};
pub use key::{build_key, Args, CallArgs, Key, KeyBuilder, KeyValue};
pub use memoize::{AsyncMemoize, AsyncMemoized, CacheKind, Memoize, Memoized};
pub use tasks::{spawn_sweep_task, Sweep};

//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check both caches against a simple ordered model.

use proptest::prelude::*;
use std::time::Duration;

use crate::cache::{LruCache, TtlCache};

// == Test Configuration ==
const LONG_TTL: Duration = Duration::from_secs(3600);

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = u8> {
    0u8..16
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: u8, value: u32 },
    Get { key: u8 },
    Delete { key: u8 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), any::<u32>()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

// == Model ==
/// Reference ordering: oldest at index 0, newest at the end.
#[derive(Default)]
struct OrderModel {
    entries: Vec<(u8, u32)>,
}

impl OrderModel {
    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn touch(&mut self, key: u8) -> Option<u32> {
        let index = self.position(key)?;
        let entry = self.entries.remove(index);
        self.entries.push(entry);
        Some(entry.1)
    }

    fn remove(&mut self, key: u8) -> Option<u32> {
        let index = self.position(key)?;
        Some(self.entries.remove(index).1)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // An LRU cache behaves like a recency-ordered list trimmed from the front
    #[test]
    fn prop_lru_matches_model(
        capacity in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..100)
    ) {
        let mut cache = LruCache::new(capacity).unwrap();
        let mut model = OrderModel::default();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key, value);
                    model.remove(key);
                    model.entries.push((key, value));
                    if model.entries.len() > capacity {
                        model.entries.remove(0);
                    }
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key).copied(), model.touch(key));
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(cache.delete(&key).ok(), model.remove(key));
                }
            }
            prop_assert!(cache.len() <= capacity);
            prop_assert_eq!(cache.len(), model.entries.len());
        }
    }

    // Without expiration in play the TTL cache follows the same ordering
    #[test]
    fn prop_ttl_matches_model_without_expiration(
        capacity in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..100)
    ) {
        let mut cache = TtlCache::new(capacity, LONG_TTL).unwrap();
        let mut model = OrderModel::default();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    if model.remove(key).is_none() && model.entries.len() >= capacity {
                        model.entries.remove(0);
                    }
                    model.entries.push((key, value));
                    cache.set(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key).copied(), model.touch(key));
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(cache.delete(&key).ok(), model.remove(key));
                }
            }
            prop_assert!(cache.len() <= capacity);
            prop_assert_eq!(cache.len(), model.entries.len());
        }
    }

    // Overflowing with distinct keys leaves exactly `capacity` entries and
    // evicts the oldest ones
    #[test]
    fn prop_overflow_keeps_newest(capacity in 1usize..16, extra in 1usize..16) {
        let mut lru = LruCache::new(capacity).unwrap();
        let mut ttl = TtlCache::new(capacity, LONG_TTL).unwrap();
        let total = capacity + extra;

        for key in 0..total {
            lru.set(key, key);
            ttl.set(key, key);
        }

        prop_assert_eq!(lru.len(), capacity);
        prop_assert_eq!(ttl.len(), capacity);
        for key in 0..total {
            let expected = key >= extra;
            prop_assert_eq!(lru.contains(&key), expected);
            prop_assert_eq!(ttl.contains(&key), expected);
        }
        prop_assert_eq!(lru.stats().evictions, extra as u64);
        prop_assert_eq!(ttl.stats().evictions, extra as u64);
    }

    // Round trip: a set is immediately readable
    #[test]
    fn prop_roundtrip(key in any::<u16>(), value in any::<i64>()) {
        let mut lru = LruCache::new(4).unwrap();
        let mut ttl = TtlCache::new(4, LONG_TTL).unwrap();

        lru.set(key, value);
        ttl.set(key, value);

        prop_assert_eq!(lru.get(&key), Some(&value));
        prop_assert_eq!(ttl.get(&key), Some(&value));
    }
}

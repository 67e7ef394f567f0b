//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the byte-budget and recency rules of the LRU store.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::{ByteView, LruCache};

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]{1,3}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..24)
}

#[derive(Debug, Clone)]
enum LruOp {
    Add { key: String, value: Vec<u8> },
    Get { key: String },
}

fn lru_op_strategy() -> impl Strategy<Value = LruOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| LruOp::Add { key, value }),
        key_strategy().prop_map(|key| LruOp::Get { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of adds and gets, used bytes stay within the budget
    // and always equal the sum of live key and value lengths.
    #[test]
    fn prop_budget_and_accounting(
        max_bytes in 1usize..64,
        ops in prop::collection::vec(lru_op_strategy(), 1..100)
    ) {
        let mut lru = LruCache::new(max_bytes);
        let mut live: HashMap<String, usize> = HashMap::new();

        for op in ops {
            match op {
                LruOp::Add { key, value } => {
                    live.insert(key.clone(), value.len());
                    lru.add(&key, ByteView::from(value));
                }
                LruOp::Get { key } => {
                    let _ = lru.get(&key);
                }
            }

            prop_assert!(
                lru.used_bytes() <= max_bytes,
                "used {} exceeds budget {}",
                lru.used_bytes(),
                max_bytes
            );

            live.retain(|key, _| lru.contains(key));
            let expected: usize = live.iter().map(|(k, v)| k.len() + v).sum();
            prop_assert_eq!(lru.used_bytes(), expected, "byte accounting drifted");
            prop_assert_eq!(lru.len(), live.len());
        }
    }

    // Values read back are the last values written for each live key.
    #[test]
    fn prop_last_write_wins(ops in prop::collection::vec(
        (key_strategy(), value_strategy()),
        1..50
    )) {
        let mut lru = LruCache::new(0);
        let mut expected: HashMap<String, Vec<u8>> = HashMap::new();

        for (key, value) in ops {
            expected.insert(key.clone(), value.clone());
            lru.add(&key, ByteView::from(value));
        }

        for (key, value) in expected {
            prop_assert_eq!(lru.get(&key).map(|v| v.to_vec()), Some(value));
        }
    }

    // Filling past the budget with equal-size entries evicts in insertion
    // order, and each evicted key is reported to the callback exactly once.
    #[test]
    fn prop_eviction_order_and_callback(count in 2usize..20, keep in 1usize..5) {
        prop_assume!(keep < count);

        let evicted: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        // Keys "k00".."k19" with 2-byte values: 5 bytes each
        let mut lru = LruCache::with_eviction_callback(
            keep * 5,
            Box::new(move |key, _| sink.lock().unwrap().push(key.to_string())),
        );

        for i in 0..count {
            lru.add(&format!("k{:02}", i), ByteView::from("vv"));
        }

        let expected: Vec<String> = (0..count - keep).map(|i| format!("k{:02}", i)).collect();
        prop_assert_eq!(evicted.lock().unwrap().clone(), expected);
        prop_assert_eq!(lru.len(), keep);
    }

    // Touching the oldest key with get protects it from the next eviction.
    #[test]
    fn prop_touch_protects_oldest(count in 3usize..12) {
        let mut lru = LruCache::new(count * 5);

        for i in 0..count {
            lru.add(&format!("k{:02}", i), ByteView::from("vv"));
        }

        prop_assert!(lru.get("k00").is_some());
        lru.add("new", ByteView::from("vv"));

        prop_assert!(lru.contains("k00"), "touched key was evicted");
        prop_assert!(!lru.contains("k01"), "next-oldest key should be evicted");
        prop_assert!(lru.contains("new"));
    }
}

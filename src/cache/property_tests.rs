//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check TTL, eviction and key-stability properties.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use crate::cache::{hash_input, ResponseCache};
use crate::clock::ManualClock;
use crate::config::CacheConfig;
use crate::models::CallType;
use crate::storage::MemoryStore;

// == Strategies ==
fn call_type_strategy() -> impl Strategy<Value = CallType> {
    prop::sample::select(CallType::ALL.to_vec())
}

fn input_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_ ,|]{1,64}"
}

fn new_cache(config: CacheConfig) -> (ResponseCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let cache = ResponseCache::new(config, Arc::new(MemoryStore::new()), clock.clone());
    (cache, clock)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A value stored and read back within its TTL is returned unchanged.
    #[test]
    fn prop_set_then_get_within_ttl(
        call_type in call_type_strategy(),
        input in input_strategy(),
        value in "[a-zA-Z0-9 ]{0,128}",
        elapsed in 0i64..=1_000,
    ) {
        let config = CacheConfig::default().with_ttl(call_type, 1_000);
        let (mut cache, clock) = new_cache(config);

        cache.set(call_type, &input, &value);
        clock.advance(elapsed);

        prop_assert_eq!(cache.get::<String>(call_type, &input), Some(value));
    }

    // A read past expiry misses and shrinks the cache by exactly one.
    #[test]
    fn prop_expired_get_evicts_exactly_one(
        call_type in call_type_strategy(),
        inputs in prop::collection::hash_set(input_strategy(), 2..10),
    ) {
        let config = CacheConfig::default()
            .with_ttl(call_type, 500)
            .with_max_entries(100);
        let (mut cache, clock) = new_cache(config);
        let inputs: Vec<String> = inputs.into_iter().collect();

        let keys: HashSet<String> = inputs.iter().map(|i| hash_input(call_type, i)).collect();
        prop_assume!(keys.len() == inputs.len());

        for input in &inputs {
            cache.set(call_type, input, &input);
        }
        clock.advance(501);

        let before = cache.stats().size;
        prop_assert!(cache.get::<String>(call_type, &inputs[0]).is_none());
        prop_assert_eq!(cache.stats().size, before - 1);
    }

    // Inserting max_entries + 1 distinct keys drops exactly the oldest one.
    #[test]
    fn prop_eviction_drops_oldest(
        max_entries in 1usize..20,
        call_type in call_type_strategy(),
        seed in input_strategy(),
    ) {
        let config = CacheConfig::default().with_max_entries(max_entries);
        let (mut cache, clock) = new_cache(config);

        let inputs: Vec<String> = (0..=max_entries).map(|i| format!("{}#{}", seed, i)).collect();
        let keys: HashSet<String> = inputs.iter().map(|i| hash_input(call_type, i)).collect();
        prop_assume!(keys.len() == inputs.len());

        for input in &inputs {
            cache.set(call_type, input, &input);
            clock.advance(1);
            prop_assert!(cache.len() <= max_entries);
        }

        prop_assert!(cache.get::<String>(call_type, &inputs[0]).is_none());
        for input in &inputs[1..] {
            prop_assert!(cache.get::<String>(call_type, input).is_some());
        }
    }

    // Hashing is a pure function of (type, input).
    #[test]
    fn prop_hash_is_stable(call_type in call_type_strategy(), input in ".{0,256}") {
        let first = hash_input(call_type, &input);
        let second = hash_input(call_type, &input.clone());
        prop_assert_eq!(first, second);
    }
}

//! Cache Statistics Module
//!
//! Snapshot of cache occupancy per call type plus hit/miss/eviction counters.

use std::collections::BTreeMap;

use serde::Serialize;

// == Cache Stats ==
/// Cache occupancy and performance counters.
///
/// Counters are kept for the life of the process and are not persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Current number of entries in the cache
    pub size: usize,
    /// Entry count per call-type prefix
    pub types: BTreeMap<String, usize>,
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (absent or expired)
    pub misses: u64,
    /// Number of entries evicted to respect the entry bound
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Counts one entry under its type prefix.
    pub fn count_type(&mut self, prefix: &str) {
        *self.types.entry(prefix.to_string()).or_insert(0) += 1;
        self.size += 1;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.size, 0);
        assert!(stats.types.is_empty());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_count_type() {
        let mut stats = CacheStats::new();
        stats.count_type("coaching");
        stats.count_type("coaching");
        stats.count_type("insights");

        assert_eq!(stats.size, 3);
        assert_eq!(stats.types.get("coaching"), Some(&2));
        assert_eq!(stats.types.get("insights"), Some(&1));
    }

    #[test]
    fn test_record_eviction() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.record_eviction();
        assert_eq!(stats.evictions, 2);
    }
}

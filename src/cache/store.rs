//! Response Cache Module
//!
//! TTL-based, type-partitioned, size-bounded cache of AI call results,
//! persisted to a [`KeyValueStore`] after every mutation.
//!
//! Eviction removes the entry with the oldest creation `timestamp`. Reads do
//! not refresh an entry's position, so a lookup never has to write; the cost
//! is that a frequently read but old entry is evicted before a fresher one.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheKey, CacheStats};
use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::error::StorageError;
use crate::models::CallType;
use crate::storage::{KeyValueStore, CACHE_STORAGE_KEY};

// == Response Cache ==
/// Cache of prior call results keyed by `(call type, input digest)`.
pub struct ResponseCache {
    /// Entries keyed by rendered [`CacheKey`]
    entries: HashMap<String, CacheEntry>,
    /// Hit/miss/eviction counters
    stats: CacheStats,
    config: CacheConfig,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates a cache and hydrates it from durable storage.
    ///
    /// Expired or malformed persisted entries are dropped. A storage or
    /// parse failure is logged and the cache starts empty.
    pub fn new(
        config: CacheConfig,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut cache = Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            config,
            storage,
            clock,
        };

        match cache.load() {
            Ok(entries) => {
                debug!("Response cache hydrated with {} entries", entries.len());
                cache.entries = entries;
            }
            Err(e) => warn!(error = %e, "Failed to load response cache, starting empty"),
        }

        cache
    }

    fn load(&self) -> Result<HashMap<String, CacheEntry>, StorageError> {
        let Some(raw) = self.storage.read(CACHE_STORAGE_KEY)? else {
            return Ok(HashMap::new());
        };

        let stored: HashMap<String, Value> = serde_json::from_str(&raw)?;
        let now = self.clock.now_ms();
        let mut entries = HashMap::with_capacity(stored.len());
        let mut discarded = 0usize;

        for (key, value) in stored {
            let entry = match serde_json::from_value::<CacheEntry>(value) {
                Ok(entry) => entry,
                Err(_) => {
                    discarded += 1;
                    continue;
                }
            };
            if CacheKey::parse(&key).is_none() || !entry.is_well_formed() || entry.expires_at <= now
            {
                discarded += 1;
                continue;
            }
            entries.insert(key, entry);
        }

        if discarded > 0 {
            debug!("Discarded {} stale or malformed cache entries on load", discarded);
        }

        // Honour a bound that may have shrunk since the state was written.
        while entries.len() > self.config.max_entries {
            match oldest_key(&entries) {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }

        Ok(entries)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.entries)?;
        self.storage.write(CACHE_STORAGE_KEY, &raw)
    }

    fn persist_or_log(&self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist response cache");
        }
    }

    // == Get ==
    /// Returns the cached value for `(call_type, input)`.
    ///
    /// `None` on a miss, on an expired entry (which is evicted), or when the
    /// stored payload does not deserialize as `T`.
    pub fn get<T: DeserializeOwned>(&mut self, call_type: CallType, input: &str) -> Option<T> {
        let key = CacheKey::new(call_type, input).to_string();
        let now = self.clock.now_ms();

        let Some(entry) = self.entries.get(&key) else {
            self.stats.record_miss();
            debug!(key = %key, "Cache miss");
            return None;
        };

        if entry.is_expired(now) {
            self.entries.remove(&key);
            self.stats.record_miss();
            debug!(key = %key, "Cache entry expired");
            self.persist_or_log();
            return None;
        }

        match serde_json::from_value::<T>(entry.data.clone()) {
            Ok(value) => {
                self.stats.record_hit();
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                self.stats.record_miss();
                warn!(key = %key, error = %e, "Cached payload has unexpected shape");
                None
            }
        }
    }

    // == Set ==
    /// Stores `data` for `(call_type, input)` with the type's TTL.
    ///
    /// When inserting a new key into a full cache, the entry with the
    /// smallest creation timestamp is evicted first. Overwriting an existing
    /// key never evicts.
    pub fn set<T: Serialize>(&mut self, call_type: CallType, input: &str, data: &T) {
        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    call_type = %call_type,
                    error = %e,
                    "Refusing to cache unserializable payload"
                );
                return;
            }
        };

        let key = CacheKey::new(call_type, input).to_string();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_entries {
            if let Some(evicted) = oldest_key(&self.entries) {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "Evicted oldest cache entry");
            }
        }

        let entry = CacheEntry::new(value, self.clock.now_ms(), self.config.ttl_ms(call_type));
        self.entries.insert(key, entry);
        self.persist_or_log();
    }

    // == Remove ==
    /// Invalidates one entry. Returns true if it existed.
    pub fn remove(&mut self, call_type: CallType, input: &str) -> bool {
        let key = CacheKey::new(call_type, input).to_string();
        let removed = self.entries.remove(&key).is_some();
        if removed {
            self.persist_or_log();
        }
        removed
    }

    // == Clear ==
    /// Empties the cache and deletes its durable copy.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.storage.remove(CACHE_STORAGE_KEY) {
            warn!(error = %e, "Failed to remove persisted response cache");
        }
    }

    // == Stats ==
    /// Returns occupancy per type plus lookup counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            hits: self.stats.hits,
            misses: self.stats.misses,
            evictions: self.stats.evictions,
            ..CacheStats::default()
        };
        for key in self.entries.keys() {
            let prefix = key.split_once('_').map_or(key.as_str(), |(prefix, _)| prefix);
            stats.count_type(prefix);
        }
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Key of the entry with the smallest creation timestamp.
fn oldest_key(entries: &HashMap<String, CacheEntry>) -> Option<String> {
    entries
        .iter()
        .min_by_key(|(_, entry)| entry.timestamp)
        .map(|(key, _)| key.clone())
}

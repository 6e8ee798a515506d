//! Rate Limiter Module
//!
//! Fixed-window request counters per call type plus one global window. A
//! call is allowed only while both its type window and the global window
//! have budget left.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::{RateLimit, RateLimitConfig};
use crate::error::StorageError;
use crate::limiter::{RateLimitEntry, RateLimitStatus, RateScope, UsageSnapshot};
use crate::models::CallType;
use crate::storage::{KeyValueStore, RATE_LIMIT_STORAGE_KEY};

// == Rate Limiter ==
/// Two-tier fixed-window rate limiter persisted to a [`KeyValueStore`].
pub struct RateLimiter {
    entries: HashMap<RateScope, RateLimitEntry>,
    config: RateLimitConfig,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    // == Constructor ==
    /// Creates a limiter and hydrates live windows from durable storage.
    pub fn new(
        config: RateLimitConfig,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut limiter = Self {
            entries: HashMap::new(),
            config,
            storage,
            clock,
        };

        match limiter.load() {
            Ok(entries) => limiter.entries = entries,
            Err(e) => warn!(error = %e, "Failed to load rate limits, starting fresh"),
        }

        limiter
    }

    fn load(&self) -> Result<HashMap<RateScope, RateLimitEntry>, StorageError> {
        let Some(raw) = self.storage.read(RATE_LIMIT_STORAGE_KEY)? else {
            return Ok(HashMap::new());
        };

        let stored: HashMap<String, Value> = serde_json::from_str(&raw)?;
        let now = self.clock.now_ms();
        let mut entries = HashMap::new();

        for (name, value) in stored {
            let Ok(scope) = name.parse::<RateScope>() else {
                debug!(scope = %name, "Ignoring unknown rate limit scope");
                continue;
            };
            match serde_json::from_value::<RateLimitEntry>(value) {
                Ok(entry) if !entry.is_stale(now) => {
                    entries.insert(scope, entry);
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(scope = %name, error = %e, "Discarding malformed rate limit entry")
                }
            }
        }

        Ok(entries)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let named: BTreeMap<&str, &RateLimitEntry> = self
            .entries
            .iter()
            .map(|(scope, entry)| (scope.as_str(), entry))
            .collect();
        let raw = serde_json::to_string(&named)?;
        self.storage.write(RATE_LIMIT_STORAGE_KEY, &raw)
    }

    fn persist_or_log(&self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist rate limits");
        }
    }

    fn limit_for(&self, scope: RateScope) -> RateLimit {
        match scope {
            RateScope::Call(call_type) => self.config.limit(call_type),
            RateScope::Global => self.config.global,
        }
    }

    /// Current window for `scope`, opening a fresh one when absent or stale.
    fn current_window(&mut self, scope: RateScope, now: i64) -> RateLimitEntry {
        let window_ms = self.limit_for(scope).window_ms;
        let entry = self
            .entries
            .entry(scope)
            .or_insert_with(|| RateLimitEntry::fresh(now, window_ms));
        if entry.is_stale(now) {
            debug!(scope = %scope, "Rate limit window rolled over");
            *entry = RateLimitEntry::fresh(now, window_ms);
        }
        *entry
    }

    // == Check ==
    /// Reports whether a `call_type` call would be allowed right now.
    ///
    /// Never spends budget; only opens or rolls over windows. Safe to call
    /// repeatedly for display.
    pub fn check(&mut self, call_type: CallType) -> RateLimitStatus {
        let now = self.clock.now_ms();
        let typed = self.current_window(RateScope::Call(call_type), now);
        let global = self.current_window(RateScope::Global, now);

        let type_remaining = self
            .config
            .limit(call_type)
            .max_requests
            .saturating_sub(typed.count);
        let global_remaining = self.config.global.max_requests.saturating_sub(global.count);
        let remaining = type_remaining.min(global_remaining);

        RateLimitStatus {
            allowed: remaining > 0,
            remaining,
            reset_in_ms: typed.reset_in_ms(now).min(global.reset_in_ms(now)),
        }
    }

    // == Consume ==
    /// Spends one unit of both the type and the global budget.
    ///
    /// Returns false, without spending anything, when either budget is
    /// exhausted. Call exactly once per real call attempt.
    pub fn consume(&mut self, call_type: CallType) -> bool {
        let status = self.check(call_type);
        if !status.allowed {
            warn!(
                call_type = %call_type,
                reset_in_ms = status.reset_in_ms,
                "Rate limit reached"
            );
            return false;
        }

        for scope in [RateScope::Call(call_type), RateScope::Global] {
            if let Some(entry) = self.entries.get_mut(&scope) {
                entry.count += 1;
            }
        }
        self.persist_or_log();
        true
    }

    // == Usage ==
    /// Read-only usage of every scope, including `global`.
    ///
    /// Scopes without a live window report zero usage and a full window.
    pub fn usage(&self) -> BTreeMap<RateScope, UsageSnapshot> {
        let now = self.clock.now_ms();
        RateScope::all()
            .map(|scope| {
                let limit = self.limit_for(scope);
                let snapshot = match self.entries.get(&scope) {
                    Some(entry) if !entry.is_stale(now) => UsageSnapshot {
                        used: entry.count,
                        max: limit.max_requests,
                        reset_in_ms: entry.reset_in_ms(now),
                    },
                    _ => UsageSnapshot {
                        used: 0,
                        max: limit.max_requests,
                        reset_in_ms: limit.window_ms,
                    },
                };
                (scope, snapshot)
            })
            .collect()
    }

    // == Reset ==
    /// Clears every counter and the durable copy.
    pub fn reset(&mut self) {
        self.entries.clear();
        if let Err(e) = self.storage.remove(RATE_LIMIT_STORAGE_KEY) {
            warn!(error = %e, "Failed to remove persisted rate limits");
        }
    }
}

//! Rate Limit Entry Module
//!
//! Fixed-window counter and the scopes counters are kept for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::models::CallType;

// == Rate Scope ==
/// What a counter is counting: one call type, or every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RateScope {
    Call(CallType),
    Global,
}

impl RateScope {
    /// Every scope the limiter tracks: each call type, then global.
    pub fn all() -> impl Iterator<Item = RateScope> {
        CallType::ALL
            .into_iter()
            .map(RateScope::Call)
            .chain(std::iter::once(RateScope::Global))
    }

    /// Persisted name: the call type name, or `"global"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RateScope::Call(call_type) => call_type.as_str(),
            RateScope::Global => "global",
        }
    }
}

impl fmt::Display for RateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "global" {
            Ok(RateScope::Global)
        } else {
            s.parse().map(RateScope::Call)
        }
    }
}

impl Serialize for RateScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<CallType> for RateScope {
    fn from(call_type: CallType) -> Self {
        RateScope::Call(call_type)
    }
}

// == Rate Limit Entry ==
/// Request count for the window ending at `reset_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitEntry {
    /// Requests spent in the current window
    pub count: u32,
    /// Window end (Unix milliseconds)
    pub reset_at: i64,
}

impl RateLimitEntry {
    /// A new, unspent window starting at `now_ms`.
    pub fn fresh(now_ms: i64, window_ms: u64) -> Self {
        let window = i64::try_from(window_ms).unwrap_or(i64::MAX);
        Self {
            count: 0,
            reset_at: now_ms.saturating_add(window),
        }
    }

    /// Once past `reset_at` the window is over and must be replaced.
    pub fn is_stale(&self, now_ms: i64) -> bool {
        now_ms > self.reset_at
    }

    /// Milliseconds until the window resets, clamped at 0.
    pub fn reset_in_ms(&self, now_ms: i64) -> u64 {
        u64::try_from(self.reset_at.saturating_sub(now_ms)).unwrap_or(0)
    }
}

//! Rate limit status and usage snapshots returned to callers.

use serde::Serialize;

/// Outcome of an allowance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    /// True when both the type budget and the global budget have room
    pub allowed: bool,
    /// Binding (smaller) of the type and global remaining budgets
    pub remaining: u32,
    /// Milliseconds until the sooner of the two windows resets
    pub reset_in_ms: u64,
}

impl RateLimitStatus {
    /// "Xm Ys" rendering of `reset_in_ms`.
    pub fn wait_label(&self) -> String {
        format_wait(self.reset_in_ms)
    }
}

/// Read-only usage of one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub used: u32,
    pub max: u32,
    pub reset_in_ms: u64,
}

impl UsageSnapshot {
    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.used)
    }
}

/// Formats a wait as `"Xm Ys"`, rounding seconds up.
pub fn format_wait(ms: u64) -> String {
    let secs = ms.div_ceil(1000);
    format!("{}m {}s", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_wait() {
        assert_eq!(format_wait(0), "0m 0s");
        assert_eq!(format_wait(1), "0m 1s");
        assert_eq!(format_wait(90_500), "1m 31s");
        assert_eq!(format_wait(3_600_000), "60m 0s");
    }

    #[test]
    fn test_usage_remaining() {
        let usage = UsageSnapshot {
            used: 7,
            max: 5,
            reset_in_ms: 0,
        };
        assert_eq!(usage.remaining(), 0);
    }
}

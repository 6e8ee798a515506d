//! Call type taxonomy
//!
//! Every mediated call belongs to one closed category that selects both its
//! cache TTL and its rate-limit budget.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category of AI operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    /// Short motivational coaching messages
    Coaching,
    /// Habit suggestions for a set of goals
    Suggestions,
    /// Insights drawn from completion patterns
    Insights,
    /// Breaking a goal down into milestones
    Decomposition,
}

impl CallType {
    /// All call types, in declaration order.
    pub const ALL: [CallType; 4] = [
        CallType::Coaching,
        CallType::Suggestions,
        CallType::Insights,
        CallType::Decomposition,
    ];

    /// Stable lowercase name used in cache keys and persisted limiter state.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Coaching => "coaching",
            CallType::Suggestions => "suggestions",
            CallType::Insights => "insights",
            CallType::Decomposition => "decomposition",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CallType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown call type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for ty in CallType::ALL {
            assert_eq!(ty.as_str().parse::<CallType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert!("global".parse::<CallType>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&CallType::Decomposition).unwrap();
        assert_eq!(json, "\"decomposition\"");
    }
}

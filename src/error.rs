//! Error types for the AI call mediation layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Storage Error Enum ==
/// Failure of the durable key-value store.
///
/// Never escapes the public cache or limiter API: callers log it and carry on
/// with in-memory state.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying I/O failure (file-backed stores)
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// == AI Error Enum ==
/// Unified error type for mediated AI calls.
#[derive(Error, Debug)]
pub enum AiError {
    /// Synthesized locally when the rate limiter denies a call
    #[error("Rate limit exceeded. Please try again in {} minute(s).", wait_minutes(.reset_in_ms))]
    RateLimitExceeded {
        /// Milliseconds until the earliest window reset
        reset_in_ms: u64,
    },

    /// Network or HTTP failure talking to the AI service
    #[error("AI transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The AI service answered but reported a failure
    #[error("AI provider error: {0}")]
    Provider(String),

    /// The AI service answered with a payload of the wrong shape
    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    /// Payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AiError {
    /// Returns true for the locally synthesized rate-limit condition.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AiError::RateLimitExceeded { .. })
    }
}

/// Whole minutes until a reset, rounded up.
pub fn minutes_until(reset_in_ms: u64) -> u64 {
    reset_in_ms.div_ceil(60_000)
}

fn wait_minutes(reset_in_ms: &u64) -> u64 {
    minutes_until(*reset_in_ms)
}

// == Result Type Alias ==
/// Convenience Result type for mediated calls.
pub type Result<T> = std::result::Result<T, AiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_message_rounds_up() {
        let err = AiError::RateLimitExceeded { reset_in_ms: 61_000 };
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded. Please try again in 2 minute(s)."
        );
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_minutes_until() {
        assert_eq!(minutes_until(0), 0);
        assert_eq!(minutes_until(1), 1);
        assert_eq!(minutes_until(60_000), 1);
        assert_eq!(minutes_until(60_001), 2);
    }

    #[test]
    fn test_provider_error_is_not_rate_limited() {
        let err = AiError::Provider("quota".to_string());
        assert!(!err.is_rate_limited());
        assert_eq!(err.to_string(), "AI provider error: quota");
    }
}

//! Request DTOs sent to the AI service

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/ai/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Body of `POST /api/ai/decompose`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecomposeRequest {
    /// Goal in the user's words
    pub goal: String,
    /// Days available to reach the goal
    pub timeframe_days: u32,
    /// Free-form context about the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl DecomposeRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.goal.trim().is_empty() {
            return Some("Goal cannot be empty".to_string());
        }
        if self.timeframe_days == 0 {
            return Some("Timeframe must be at least one day".to_string());
        }
        None
    }
}

/// Body of `POST /api/ai/suggestions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    /// Kind of suggestions wanted, e.g. `"habits"`
    #[serde(rename = "type")]
    pub kind: String,
    pub context: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_serializes_lowercase_role() {
        let json = serde_json::to_value(ChatMessage::system("be brief")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "system", "content": "be brief"}));
    }

    #[test]
    fn test_decompose_request_camel_case() {
        let req = DecomposeRequest {
            goal: "Run a marathon".to_string(),
            timeframe_days: 90,
            context: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"goal": "Run a marathon", "timeframeDays": 90}));
    }

    #[test]
    fn test_decompose_request_validate() {
        let mut req = DecomposeRequest {
            goal: "  ".to_string(),
            timeframe_days: 30,
            context: None,
        };
        assert!(req.validate().is_some());

        req.goal = "Read 12 books".to_string();
        assert!(req.validate().is_none());

        req.timeframe_days = 0;
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_suggestion_request_type_field() {
        let req = SuggestionRequest {
            kind: "habits".to_string(),
            context: serde_json::json!({"goals": ["sleep"]}),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "habits");
    }
}

//! Coaching messages

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::client::{completion_decile, extract_json_object, AiClient};
use crate::error::{AiError, Result};
use crate::mediator::{CallOptions, Mediated};
use crate::models::{CallType, ChatMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Morning is 05:00-11:59, afternoon 12:00-16:59, evening otherwise.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }
}

/// Direction of recent completion rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        }
    }
}

/// What the user is doing right now, as far as coaching cares.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachingContext {
    pub user_name: Option<String>,
    pub time_of_day: TimeOfDay,
    pub trend: Trend,
    /// Share of today's habits completed, 0.0..=1.0
    pub completion_rate: f64,
    pub current_streak: u32,
    pub habits_due: Vec<String>,
}

impl CoachingContext {
    /// `"{time_of_day}_{trend}_{decile}"`, e.g. `morning_stable_7`.
    ///
    /// Name, streak and habit list are left out on purpose so similar days
    /// share an entry.
    pub fn cache_key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.time_of_day.as_str(),
            self.trend.as_str(),
            completion_decile(self.completion_rate)
        )
    }

    fn name(&self) -> &str {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("there")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoachingKind {
    #[default]
    Motivation,
    Celebration,
    Nudge,
    Reflection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachingMessage {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: CoachingKind,
}

impl AiClient {
    /// A short coaching message for the user's current situation.
    ///
    /// Never fails: any error yields a locally composed message.
    pub async fn coaching_message(&self, ctx: &CoachingContext) -> Mediated<CoachingMessage> {
        self.coaching_message_with_options(ctx, CallOptions::default()).await
    }

    /// Same as [`AiClient::coaching_message`] with explicit cache and rate-limit switches.
    pub async fn coaching_message_with_options(
        &self,
        ctx: &CoachingContext,
        options: CallOptions,
    ) -> Mediated<CoachingMessage> {
        let transport = self.transport.clone();
        let messages = coaching_prompt(ctx);

        let result = self
            .mediator
            .call(
                CallType::Coaching,
                &ctx.cache_key(),
                || async move {
                    let text = transport.chat(messages).await?;
                    parse_coaching_reply(&text)
                },
                options,
            )
            .await;

        result.unwrap_or_else(|e| {
            warn!(error = %e, "Coaching call failed, using local message");
            Mediated::fresh(fallback_coaching(ctx))
        })
    }
}

fn coaching_prompt(ctx: &CoachingContext) -> Vec<ChatMessage> {
    let system = "You are a warm, concise habit coach. Reply with JSON only: \
                  {\"message\": string under 40 words, \
                  \"type\": \"motivation\" | \"celebration\" | \"nudge\" | \"reflection\"}.";
    let habits = if ctx.habits_due.is_empty() {
        "none".to_string()
    } else {
        ctx.habits_due.join(", ")
    };
    let user = format!(
        "Time of day: {}. Trend: {}. Completion today: {}%. Current streak: {} days. \
         Habits still due: {}.",
        ctx.time_of_day.as_str(),
        ctx.trend.as_str(),
        u32::from(completion_decile(ctx.completion_rate)) * 10,
        ctx.current_streak,
        habits
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Structured reply when the text carries a JSON object with a `message`,
/// otherwise the raw text as the message.
fn parse_coaching_reply(text: &str) -> Result<CoachingMessage> {
    if let Some(object) = extract_json_object(text) {
        if let Some(message) = object.get("message").and_then(Value::as_str) {
            let kind = object
                .get("type")
                .cloned()
                .and_then(|t| serde_json::from_value(t).ok())
                .unwrap_or_default();
            return Ok(CoachingMessage {
                message: message.trim().to_string(),
                kind,
            });
        }
    }

    let raw = text.trim();
    if raw.is_empty() {
        return Err(AiError::MalformedResponse("empty coaching reply".to_string()));
    }
    Ok(CoachingMessage {
        message: raw.to_string(),
        kind: CoachingKind::default(),
    })
}

fn fallback_coaching(ctx: &CoachingContext) -> CoachingMessage {
    let name = ctx.name();
    let decile = completion_decile(ctx.completion_rate);

    if decile >= 10 {
        return CoachingMessage {
            message: format!(
                "Everything done for today, {}! Enjoy the rest of your {}.",
                name,
                ctx.time_of_day.as_str()
            ),
            kind: CoachingKind::Celebration,
        };
    }
    if ctx.current_streak >= 7 {
        return CoachingMessage {
            message: format!(
                "{} days in a row, {}! That consistency is turning into a habit.",
                ctx.current_streak, name
            ),
            kind: CoachingKind::Celebration,
        };
    }
    if ctx.trend == Trend::Declining {
        let next = ctx
            .habits_due
            .first()
            .map(|h| format!("Start with \"{}\"", h))
            .unwrap_or_else(|| "Pick one small habit".to_string());
        return CoachingMessage {
            message: format!("Small steps still count, {}. {} and build from there.", name, next),
            kind: CoachingKind::Nudge,
        };
    }

    let message = match ctx.time_of_day {
        TimeOfDay::Morning => format!(
            "Good morning, {}! A fresh day is a fresh chance to show up for yourself.",
            name
        ),
        TimeOfDay::Afternoon => format!(
            "Keep the momentum going this afternoon, {}. You're {}% of the way there.",
            name,
            u32::from(decile) * 10
        ),
        TimeOfDay::Evening => format!(
            "Take a moment this evening, {}, to notice what went well today.",
            name
        ),
    };
    let kind = if ctx.time_of_day == TimeOfDay::Evening {
        CoachingKind::Reflection
    } else {
        CoachingKind::Motivation
    };
    CoachingMessage { message, kind }
}

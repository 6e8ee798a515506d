//! Habit suggestions

use serde_json::json;
use tracing::warn;

use crate::client::{normalize_text, AiClient};
use crate::error::AiError;
use crate::mediator::{CallOptions, Mediated};
use crate::models::{CallType, Suggestion, SuggestionRequest};

const SUGGESTION_KIND: &str = "habits";
const MAX_FALLBACK_SUGGESTIONS: usize = 3;

/// Goals and current habits to suggest around.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionContext {
    pub goals: Vec<String>,
    pub existing_habits: Vec<String>,
}

impl SuggestionContext {
    /// Sorted, de-duplicated, normalized goals joined by `,`, then `|` and a
    /// coarse bucket of how many habits already exist.
    pub fn cache_key(&self) -> String {
        let mut goals: Vec<String> = self
            .goals
            .iter()
            .map(|g| normalize_text(g))
            .filter(|g| !g.is_empty())
            .collect();
        goals.sort();
        goals.dedup();

        let bucket = match self.existing_habits.len() {
            0 => "none",
            1..=3 => "few",
            4..=7 => "some",
            _ => "many",
        };
        format!("{}|{}", goals.join(","), bucket)
    }
}

impl AiClient {
    /// Habit suggestions for the user's goals.
    ///
    /// Never fails and never returns an empty list.
    pub async fn habit_suggestions(&self, ctx: &SuggestionContext) -> Mediated<Vec<Suggestion>> {
        self.habit_suggestions_with_options(ctx, CallOptions::default()).await
    }

    /// Same as [`AiClient::habit_suggestions`] with explicit cache and rate-limit switches.
    pub async fn habit_suggestions_with_options(
        &self,
        ctx: &SuggestionContext,
        options: CallOptions,
    ) -> Mediated<Vec<Suggestion>> {
        let transport = self.transport.clone();
        let request = SuggestionRequest {
            kind: SUGGESTION_KIND.to_string(),
            context: json!({
                "goals": ctx.goals,
                "existingHabits": ctx.existing_habits,
            }),
        };

        let result = self
            .mediator
            .call(
                CallType::Suggestions,
                &ctx.cache_key(),
                || async move {
                    let suggestions = transport.suggestions(request).await?;
                    if suggestions.is_empty() {
                        return Err(AiError::MalformedResponse(
                            "no suggestions returned".to_string(),
                        ));
                    }
                    Ok(suggestions)
                },
                options,
            )
            .await;

        result.unwrap_or_else(|e| {
            warn!(error = %e, "Suggestion call failed, using local suggestions");
            Mediated::fresh(fallback_suggestions(ctx))
        })
    }
}

fn suggestion(title: &str, description: &str, category: &str, frequency: &str) -> Suggestion {
    Suggestion {
        title: title.to_string(),
        description: description.to_string(),
        category: Some(category.to_string()),
        frequency: Some(frequency.to_string()),
    }
}

/// Template suggestion for one normalized goal, chosen by keyword.
fn suggestion_for_goal(goal: &str) -> Suggestion {
    let has = |words: &[&str]| words.iter().any(|w| goal.contains(w));

    if has(&["fit", "exercise", "run", "gym", "weight", "health"]) {
        suggestion(
            "Take a 20-minute walk",
            "Low-effort movement that is easy to repeat every day.",
            "fitness",
            "daily",
        )
    } else if has(&["sleep", "rest", "tired"]) {
        suggestion(
            "Screens off 30 minutes before bed",
            "A wind-down routine makes falling asleep easier.",
            "sleep",
            "daily",
        )
    } else if has(&["read", "learn", "study", "book"]) {
        suggestion(
            "Read 10 pages",
            "Small, steady reading adds up to several books a year.",
            "learning",
            "daily",
        )
    } else if has(&["stress", "calm", "mind", "anxiety", "focus"]) {
        suggestion(
            "Five minutes of deep breathing",
            "A short pause to reset your attention.",
            "mindfulness",
            "daily",
        )
    } else if has(&["money", "save", "budget", "finance"]) {
        suggestion(
            "Log today's spending",
            "Knowing where money goes is the first step to saving it.",
            "finance",
            "daily",
        )
    } else {
        Suggestion {
            title: format!("Spend 10 minutes on \"{}\"", goal),
            description: "A small daily block keeps the goal moving forward.".to_string(),
            category: None,
            frequency: Some("daily".to_string()),
        }
    }
}

fn default_suggestions() -> Vec<Suggestion> {
    vec![
        suggestion(
            "Drink a glass of water after waking up",
            "An easy win to start the day.",
            "health",
            "daily",
        ),
        suggestion(
            "Plan tomorrow's top task",
            "Two minutes in the evening saves time in the morning.",
            "productivity",
            "daily",
        ),
        suggestion(
            "Take a 20-minute walk",
            "Low-effort movement that is easy to repeat every day.",
            "fitness",
            "3x per week",
        ),
    ]
}

fn fallback_suggestions(ctx: &SuggestionContext) -> Vec<Suggestion> {
    let existing: Vec<String> = ctx.existing_habits.iter().map(|h| normalize_text(h)).collect();
    let is_new = |s: &Suggestion| !existing.contains(&normalize_text(&s.title));

    let mut goals: Vec<String> = ctx
        .goals
        .iter()
        .map(|g| normalize_text(g))
        .filter(|g| !g.is_empty())
        .collect();
    goals.sort();
    goals.dedup();

    let mut picked: Vec<Suggestion> = Vec::new();
    for candidate in goals.iter().map(|g| suggestion_for_goal(g)).chain(default_suggestions()) {
        if picked.len() >= MAX_FALLBACK_SUGGESTIONS {
            break;
        }
        if is_new(&candidate) && !picked.iter().any(|p| p.title == candidate.title) {
            picked.push(candidate);
        }
    }

    if picked.is_empty() {
        picked.push(suggestion(
            "Reflect on one thing that went well today",
            "A one-line journal entry to close the day.",
            "mindfulness",
            "daily",
        ));
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::ScriptedTransport;
    use crate::mediator::CallMediator;
    use std::sync::Arc;

    fn context(goals: &[&str], habits: &[&str]) -> SuggestionContext {
        SuggestionContext {
            goals: goals.iter().map(|s| s.to_string()).collect(),
            existing_habits: habits.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_cache_key_ignores_order_case_and_spacing() {
        let a = context(&["Sleep better", "run  a 5k"], &["Walk"]);
        let b = context(&["Run a 5K", " sleep better", "sleep better"], &["Read"]);
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), "run a 5k,sleep better|few");
    }

    #[test]
    fn test_cache_key_habit_buckets() {
        assert!(context(&["x"], &[]).cache_key().ends_with("|none"));
        assert!(context(&["x"], &["a"; 5]).cache_key().ends_with("|some"));
        assert!(context(&["x"], &["a"; 9]).cache_key().ends_with("|many"));
    }

    #[test]
    fn test_fallback_matches_goal_keywords() {
        let picked = fallback_suggestions(&context(&["Get fit", "Read more books"], &[]));
        assert_eq!(picked.len(), 3);
        assert_eq!(picked[0].category.as_deref(), Some("fitness"));
        assert_eq!(picked[1].category.as_deref(), Some("learning"));
    }

    #[test]
    fn test_fallback_skips_existing_habits() {
        let picked = fallback_suggestions(&context(&["exercise"], &["take a 20-minute walk"]));
        assert!(picked.iter().all(|s| s.title != "Take a 20-minute walk"));
        assert!(!picked.is_empty());
    }

    #[test]
    fn test_fallback_without_goals_uses_defaults() {
        let picked = fallback_suggestions(&SuggestionContext::default());
        assert_eq!(picked, default_suggestions());
    }

    #[test]
    fn test_fallback_generic_goal() {
        let picked = fallback_suggestions(&context(&["Learn Portuguese"], &[]));
        assert_eq!(picked[0].category.as_deref(), Some("learning"));

        let picked = fallback_suggestions(&context(&["Garden"], &[]));
        assert_eq!(picked[0].title, "Spend 10 minutes on \"garden\"");
    }

    #[tokio::test]
    async fn test_remote_suggestions_are_cached() {
        let remote = vec![Suggestion {
            title: "Stretch".to_string(),
            description: String::new(),
            category: None,
            frequency: None,
        }];
        let transport = Arc::new(ScriptedTransport {
            suggestions: Some(remote.clone()),
            ..ScriptedTransport::default()
        });
        let client = AiClient::new(CallMediator::in_memory(), transport.clone());

        let first = client.habit_suggestions(&context(&["Flexibility"], &[])).await;
        let second = client.habit_suggestions(&context(&["flexibility "], &[])).await;

        assert_eq!(first.data, remote);
        assert!(second.from_cache);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_skip_cache_calls_every_time() {
        let transport = Arc::new(ScriptedTransport {
            suggestions: Some(vec![Suggestion {
                title: "Stretch".to_string(),
                description: String::new(),
                category: None,
                frequency: None,
            }]),
            ..ScriptedTransport::default()
        });
        let client = AiClient::new(CallMediator::in_memory(), transport.clone());
        let ctx = context(&["Flexibility"], &[]);

        for _ in 0..2 {
            let result = client
                .habit_suggestions_with_options(&ctx, CallOptions::skip_cache())
                .await;
            assert!(!result.from_cache);
        }

        assert_eq!(transport.calls(), 2);
        assert_eq!(client.mediator().cache_stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_empty_remote_list_falls_back() {
        let transport = Arc::new(ScriptedTransport {
            suggestions: Some(vec![]),
            ..ScriptedTransport::default()
        });
        let client = AiClient::new(CallMediator::in_memory(), transport);

        let result = client.habit_suggestions(&context(&["sleep"], &[])).await;

        assert!(!result.from_cache);
        assert_eq!(result.data[0].category.as_deref(), Some("sleep"));
        assert_eq!(client.mediator().cache_stats().await.size, 0);
    }
}

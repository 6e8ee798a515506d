//! Pattern insights drawn from completion history

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{completion_decile, extract_json_object, AiClient};
use crate::error::{AiError, Result};
use crate::mediator::{CallOptions, Mediated};
use crate::models::{CallType, ChatMessage};

/// Summary statistics the insights are derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightContext {
    /// Completion ratio over the analysed period, 0.0..=1.0
    pub completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub best_day: Option<Weekday>,
    pub worst_day: Option<Weekday>,
    pub total_habits: usize,
}

impl InsightContext {
    /// `"{decile}_{best day}_{streak weeks}w"`, e.g. `6_Mon_2w`.
    pub fn cache_key(&self) -> String {
        let best = self
            .best_day
            .map(|d| d.to_string())
            .unwrap_or_else(|| "none".to_string());
        format!(
            "{}_{}_{}w",
            completion_decile(self.completion_rate),
            best,
            self.current_streak / 7
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Strength,
    Opportunity,
    #[default]
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternInsight {
    pub title: String,
    pub description: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: InsightKind,
}

/// Unknown or missing kinds read as the default instead of rejecting the item.
fn lenient_kind<'de, D>(deserializer: D) -> std::result::Result<InsightKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl PatternInsight {
    fn new(kind: InsightKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind,
        }
    }
}

impl AiClient {
    /// Insights about the user's completion patterns.
    ///
    /// Never fails and never returns an empty list.
    pub async fn pattern_insights(&self, ctx: &InsightContext) -> Mediated<Vec<PatternInsight>> {
        self.pattern_insights_with_options(ctx, CallOptions::default()).await
    }

    /// Same as [`AiClient::pattern_insights`] with explicit cache and rate-limit switches.
    pub async fn pattern_insights_with_options(
        &self,
        ctx: &InsightContext,
        options: CallOptions,
    ) -> Mediated<Vec<PatternInsight>> {
        let transport = self.transport.clone();
        let messages = insight_prompt(ctx);

        let result = self
            .mediator
            .call(
                CallType::Insights,
                &ctx.cache_key(),
                || async move {
                    let text = transport.chat(messages).await?;
                    parse_insights_reply(&text)
                },
                options,
            )
            .await;

        result.unwrap_or_else(|e| {
            warn!(error = %e, "Insight call failed, using local insights");
            Mediated::fresh(fallback_insights(ctx))
        })
    }
}

fn insight_prompt(ctx: &InsightContext) -> Vec<ChatMessage> {
    let system = "You analyse habit-tracking statistics. Reply with JSON only: \
                  {\"insights\": [{\"title\": string, \"description\": string, \
                  \"type\": \"strength\" | \"opportunity\" | \"pattern\"}]} with at most 3 items.";
    let day = |d: Option<Weekday>| {
        d.map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    };
    let user = format!(
        "Completion rate: {}%. Current streak: {} days. Longest streak: {} days. \
         Best day: {}. Worst day: {}. Habits tracked: {}.",
        u32::from(completion_decile(ctx.completion_rate)) * 10,
        ctx.current_streak,
        ctx.longest_streak,
        day(ctx.best_day),
        day(ctx.worst_day),
        ctx.total_habits
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Parses `{"insights": [...]}`, skipping items of the wrong shape. Falls
/// back to a single insight carrying the raw text.
fn parse_insights_reply(text: &str) -> Result<Vec<PatternInsight>> {
    if let Some(items) = extract_json_object(text)
        .as_ref()
        .and_then(|o| o.get("insights"))
        .and_then(Value::as_array)
    {
        let insights: Vec<PatternInsight> = items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect();
        if insights.len() < items.len() {
            debug!("Dropped {} malformed insights", items.len() - insights.len());
        }
        if !insights.is_empty() {
            return Ok(insights);
        }
    }

    let raw = text.trim();
    if raw.is_empty() {
        return Err(AiError::MalformedResponse("empty insights reply".to_string()));
    }
    Ok(vec![PatternInsight::new(InsightKind::Pattern, "Insight", raw)])
}

fn fallback_insights(ctx: &InsightContext) -> Vec<PatternInsight> {
    let mut insights = Vec::new();
    let percent = u32::from(completion_decile(ctx.completion_rate)) * 10;

    if let Some(day) = ctx.best_day {
        insights.push(PatternInsight::new(
            InsightKind::Strength,
            format!("{} is your strongest day", day),
            format!("You complete the most habits on {}. Schedule harder habits there.", day),
        ));
    }
    if let Some(day) = ctx.worst_day.filter(|d| Some(*d) != ctx.best_day) {
        insights.push(PatternInsight::new(
            InsightKind::Opportunity,
            format!("{} needs attention", day),
            format!("Completions dip on {}. Try a lighter routine that day.", day),
        ));
    }

    if percent >= 80 {
        insights.push(PatternInsight::new(
            InsightKind::Strength,
            "High completion rate",
            format!("You're completing about {}% of your habits. Excellent consistency.", percent),
        ));
    } else if percent < 50 && ctx.total_habits > 3 {
        insights.push(PatternInsight::new(
            InsightKind::Opportunity,
            "Too many habits at once?",
            format!(
                "You're tracking {} habits at about {}% completion. Focusing on fewer may help.",
                ctx.total_habits, percent
            ),
        ));
    }

    if ctx.longest_streak > 0 && ctx.current_streak >= ctx.longest_streak {
        insights.push(PatternInsight::new(
            InsightKind::Strength,
            "Personal best streak",
            format!("{} days is your longest streak yet.", ctx.current_streak),
        ));
    }

    if insights.is_empty() {
        insights.push(PatternInsight::new(
            InsightKind::Pattern,
            "Keep tracking",
            "A few more days of check-ins will reveal clearer patterns.",
        ));
    }
    insights
}

//! Goal decomposition into milestones

use tracing::warn;

use crate::client::{normalize_text, AiClient};
use crate::error::AiError;
use crate::mediator::{CallOptions, Mediated};
use crate::models::{CallType, DecomposeRequest, GoalPlan, Milestone};

const FALLBACK_PHASES: [(&str, &str); 4] = [
    ("Get started", "Define what done looks like and take the first small step."),
    ("Build momentum", "Make the work a routine with fixed days and times."),
    ("Push through the middle", "Review progress, adjust the plan and keep going."),
    ("Finish strong", "Close the remaining gaps and celebrate reaching"),
];

/// `"{normalized goal}|{weeks}w"`; context text is not part of the key.
fn cache_key(request: &DecomposeRequest) -> String {
    format!(
        "{}|{}w",
        normalize_text(&request.goal),
        request.timeframe_days.div_ceil(7)
    )
}

impl AiClient {
    /// Breaks a goal into milestones.
    ///
    /// Invalid requests and failed calls both yield an evenly spaced local
    /// plan; the network is not touched for an invalid request.
    pub async fn decompose_goal(&self, request: &DecomposeRequest) -> Mediated<GoalPlan> {
        self.decompose_goal_with_options(request, CallOptions::default()).await
    }

    /// Same as [`AiClient::decompose_goal`] with explicit cache and rate-limit switches.
    pub async fn decompose_goal_with_options(
        &self,
        request: &DecomposeRequest,
        options: CallOptions,
    ) -> Mediated<GoalPlan> {
        if let Some(reason) = request.validate() {
            warn!(reason = %reason, "Invalid decomposition request, using local plan");
            return Mediated::fresh(fallback_plan(request));
        }

        let transport = self.transport.clone();
        let owned = request.clone();

        let result = self
            .mediator
            .call(
                CallType::Decomposition,
                &cache_key(request),
                || async move {
                    let mut plan = transport.decompose_goal(owned).await?;
                    if plan.milestones.is_empty() {
                        return Err(AiError::MalformedResponse(
                            "plan has no milestones".to_string(),
                        ));
                    }
                    plan.milestones.sort_by_key(|m| m.due_in_days);
                    Ok(plan)
                },
                options,
            )
            .await;

        result.unwrap_or_else(|e| {
            warn!(error = %e, "Decomposition call failed, using local plan");
            Mediated::fresh(fallback_plan(request))
        })
    }
}

/// Up to four phases spread evenly over the timeframe; the last one lands on
/// the final day.
fn fallback_plan(request: &DecomposeRequest) -> GoalPlan {
    let days = request.timeframe_days.max(1);
    let phases = FALLBACK_PHASES.len().min(days as usize) as u32;
    let goal = request.goal.trim();
    let goal = if goal.is_empty() { "your goal" } else { goal };

    let milestones = FALLBACK_PHASES
        .iter()
        .take(phases as usize)
        .enumerate()
        .map(|(i, (title, description))| {
            let step = i as u32 + 1;
            let description = if step == phases {
                format!("{} \"{}\".", FALLBACK_PHASES[3].1, goal)
            } else {
                description.to_string()
            };
            Milestone {
                title: title.to_string(),
                description,
                due_in_days: spread_day(days, step, phases),
            }
        })
        .collect();

    GoalPlan { milestones }
}

/// Day `ceil(days * step / phases)`, computed wide so long timeframes cannot
/// overflow. Never exceeds `days` while `step <= phases`.
fn spread_day(days: u32, step: u32, phases: u32) -> u32 {
    let day = (u64::from(days) * u64::from(step)).div_ceil(u64::from(phases));
    u32::try_from(day).unwrap_or(days)
}

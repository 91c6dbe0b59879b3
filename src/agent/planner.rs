//! Planner agent (Think step).
//!
//! Inspects the evaluation state and produces the next [`ActionPlan`].
//! Decoding is strict: the response must match the plan schema exactly
//! and pass [`ActionPlan::validate`]. The caller decides what to do on
//! failure.

use async_trait::async_trait;
use serde_json::error::Category;

use super::config::AgentConfig;
use super::message::TokenUsage;
use super::prompt::{ThinkingContext, build_thinking_prompt};
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::core::ActionPlan;
use crate::error::AgentError;

/// Agent that chooses the next action of the evaluation loop.
pub struct PlannerAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl PlannerAgent {
    /// Creates a new planner with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.planner_model.clone(),
            max_tokens: config.planner_max_tokens,
            system_prompt,
        }
    }

    /// Asks the model for the next plan and decodes it.
    ///
    /// Usage is returned even when decoding fails, since the reply was
    /// billed; it is zero only when the service call itself failed.
    ///
    /// The plan is the provider's error on service failure,
    /// [`AgentError::ResponseParse`] if the response is not JSON, and
    /// [`AgentError::PlanValidation`] if it is JSON of the wrong shape.
    pub async fn plan(
        &self,
        provider: &dyn LlmProvider,
        ctx: &ThinkingContext<'_>,
    ) -> (Result<ActionPlan, AgentError>, TokenUsage) {
        match self.execute(provider, &build_thinking_prompt(ctx)).await {
            Ok(response) => (Self::parse_plan(&response.content), response.usage),
            Err(e) => (Err(e), TokenUsage::default()),
        }
    }

    /// Parses the agent's JSON response into an action plan.
    fn parse_plan(content: &str) -> Result<ActionPlan, AgentError> {
        let trimmed = content.trim();

        // Handle markdown code blocks
        let json_str = if trimmed.starts_with("```") {
            trimmed
                .trim_start_matches("```json")
                .trim_start_matches("```")
                .trim_end_matches("```")
                .trim()
        } else {
            trimmed
        };

        let plan = serde_json::from_str::<ActionPlan>(json_str).map_err(|e| {
            if e.classify() == Category::Data {
                AgentError::PlanValidation {
                    message: format!("Invalid action plan: {e}"),
                }
            } else {
                AgentError::ResponseParse {
                    message: format!("Failed to parse action plan: {e}"),
                    content: content.to_string(),
                }
            }
        })?;

        plan.validate()?;
        Ok(plan)
    }
}

#[async_trait]
impl Agent for PlannerAgent {
    fn name(&self) -> &'static str {
        "planner"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn temperature(&self) -> f32 {
        0.1
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

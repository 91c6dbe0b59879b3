//! Evaluator agent for the Finalize step.
//!
//! Takes the analyses gathered by the loop and produces the free-text
//! evaluation returned to the caller.

use async_trait::async_trait;

use super::config::AgentConfig;
use super::traits::Agent;

/// Agent that writes the final evaluation.
pub struct EvaluatorAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl EvaluatorAgent {
    /// Creates a new evaluator with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.evaluator_model.clone(),
            max_tokens: config.evaluator_max_tokens,
            system_prompt,
        }
    }
}

#[async_trait]
impl Agent for EvaluatorAgent {
    fn name(&self) -> &'static str {
        "evaluator"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        0.1
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_properties() {
        use super::super::prompt::EVALUATOR_SYSTEM_PROMPT;
        let config = AgentConfig::builder()
            .api_key("test")
            .evaluator_model("gpt-4o")
            .evaluator_max_tokens(4096)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let agent = EvaluatorAgent::new(&config, EVALUATOR_SYSTEM_PROMPT.to_string());
        assert_eq!(agent.name(), "evaluator");
        assert_eq!(agent.model(), "gpt-4o");
        assert!(!agent.json_mode());
        assert!((agent.temperature() - 0.1).abs() < f32::EPSILON);
        assert_eq!(agent.max_tokens(), 4096);
    }
}

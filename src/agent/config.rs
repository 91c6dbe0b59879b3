//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! The environment is only consulted when [`AgentConfigBuilder::from_env`] is called.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default Think/Act/Observe iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 3;
/// Default confidence needed to stop the loop early.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
/// Default planner max tokens. Plans are small JSON objects.
const DEFAULT_PLANNER_MAX_TOKENS: u32 = 512;
/// Default vision max tokens.
const DEFAULT_VISION_MAX_TOKENS: u32 = 1000;
/// Default text analysis max tokens.
const DEFAULT_TEXT_MAX_TOKENS: u32 = 800;
/// Default evaluator max tokens.
const DEFAULT_EVALUATOR_MAX_TOKENS: u32 = 2048;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default model for planning.
const DEFAULT_PLANNER_MODEL: &str = "gpt-4o-mini";
/// Default model for image analysis. Must accept image input.
const DEFAULT_VISION_MODEL: &str = "gpt-4o";
/// Default model for text analysis.
const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
/// Default model for the final evaluation.
const DEFAULT_EVALUATOR_MODEL: &str = "gpt-4o-mini";

/// Configuration for the agent system.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for the planner (Think step).
    pub planner_model: String,
    /// Model for the image collaborator.
    pub vision_model: String,
    /// Model for the text collaborator.
    pub text_model: String,
    /// Model for the final evaluation.
    pub evaluator_model: String,
    /// Maximum tokens for planner responses.
    pub planner_max_tokens: u32,
    /// Maximum tokens for image analysis responses.
    pub vision_max_tokens: u32,
    /// Maximum tokens for text analysis responses.
    pub text_max_tokens: u32,
    /// Maximum tokens for the final evaluation.
    pub evaluator_max_tokens: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum Think/Act/Observe iterations per session.
    pub max_iterations: usize,
    /// Confidence at or above which the loop may stop early.
    pub confidence_threshold: f64,
    /// Directory containing prompt template files.
    ///
    /// When set, system prompts are loaded from markdown files in this
    /// directory, falling back to compiled-in defaults for any missing
    /// files.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    planner_model: Option<String>,
    vision_model: Option<String>,
    text_model: Option<String>,
    evaluator_model: Option<String>,
    planner_max_tokens: Option<u32>,
    vision_max_tokens: Option<u32>,
    text_max_tokens: Option<u32>,
    evaluator_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    max_iterations: Option<usize>,
    confidence_threshold: Option<f64>,
    prompt_dir: Option<PathBuf>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("MAMARIA_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("MAMARIA_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("MAMARIA_BASE_URL"))
                .ok();
        }
        if self.planner_model.is_none() {
            self.planner_model = std::env::var("MAMARIA_PLANNER_MODEL").ok();
        }
        if self.vision_model.is_none() {
            self.vision_model = std::env::var("MAMARIA_VISION_MODEL").ok();
        }
        if self.text_model.is_none() {
            self.text_model = std::env::var("MAMARIA_TEXT_MODEL").ok();
        }
        if self.evaluator_model.is_none() {
            self.evaluator_model = std::env::var("MAMARIA_EVALUATOR_MODEL").ok();
        }
        if self.max_iterations.is_none() {
            self.max_iterations = std::env::var("MAMARIA_MAX_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.timeout.is_none() {
            self.timeout = std::env::var("MAMARIA_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("MAMARIA_PROMPT_DIR")
                .ok()
                .map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the planner model.
    #[must_use]
    pub fn planner_model(mut self, model: impl Into<String>) -> Self {
        self.planner_model = Some(model.into());
        self
    }

    /// Sets the vision model.
    #[must_use]
    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = Some(model.into());
        self
    }

    /// Sets the text analysis model.
    #[must_use]
    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = Some(model.into());
        self
    }

    /// Sets the evaluator model.
    #[must_use]
    pub fn evaluator_model(mut self, model: impl Into<String>) -> Self {
        self.evaluator_model = Some(model.into());
        self
    }

    /// Sets the planner max tokens.
    #[must_use]
    pub const fn planner_max_tokens(mut self, n: u32) -> Self {
        self.planner_max_tokens = Some(n);
        self
    }

    /// Sets the vision max tokens.
    #[must_use]
    pub const fn vision_max_tokens(mut self, n: u32) -> Self {
        self.vision_max_tokens = Some(n);
        self
    }

    /// Sets the text analysis max tokens.
    #[must_use]
    pub const fn text_max_tokens(mut self, n: u32) -> Self {
        self.text_max_tokens = Some(n);
        self
    }

    /// Sets the evaluator max tokens.
    #[must_use]
    pub const fn evaluator_max_tokens(mut self, n: u32) -> Self {
        self.evaluator_max_tokens = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub const fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Sets the early-exit confidence threshold.
    #[must_use]
    pub const fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// An iteration cap of zero is raised to one so every session gets at
    /// least one planning pass.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            planner_model: self
                .planner_model
                .unwrap_or_else(|| DEFAULT_PLANNER_MODEL.to_string()),
            vision_model: self
                .vision_model
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            text_model: self
                .text_model
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            evaluator_model: self
                .evaluator_model
                .unwrap_or_else(|| DEFAULT_EVALUATOR_MODEL.to_string()),
            planner_max_tokens: self
                .planner_max_tokens
                .unwrap_or(DEFAULT_PLANNER_MAX_TOKENS),
            vision_max_tokens: self.vision_max_tokens.unwrap_or(DEFAULT_VISION_MAX_TOKENS),
            text_max_tokens: self.text_max_tokens.unwrap_or(DEFAULT_TEXT_MAX_TOKENS),
            evaluator_max_tokens: self
                .evaluator_max_tokens
                .unwrap_or(DEFAULT_EVALUATOR_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_iterations: self
                .max_iterations
                .unwrap_or(DEFAULT_MAX_ITERATIONS)
                .max(1),
            confidence_threshold: self
                .confidence_threshold
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            prompt_dir: self.prompt_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert!((config.confidence_threshold - DEFAULT_CONFIDENCE_THRESHOLD).abs() < f64::EPSILON);
        assert_eq!(config.planner_model, "gpt-4o-mini");
        assert_eq!(config.vision_model, "gpt-4o");
        assert!(config.prompt_dir.is_none());
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = AgentConfig::builder().build();
        assert!(matches!(result, Err(AgentError::ApiKeyMissing)));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .api_key("key")
            .provider("custom")
            .planner_model("planner-x")
            .evaluator_model("evaluator-x")
            .max_iterations(5)
            .confidence_threshold(0.9)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.planner_model, "planner-x");
        assert_eq!(config.evaluator_model, "evaluator-x");
        assert_eq!(config.max_iterations, 5);
        assert!((config.confidence_threshold - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_zero_iterations_raised_to_one() {
        let config = AgentConfig::builder()
            .api_key("key")
            .max_iterations(0)
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.max_iterations, 1);
    }
}

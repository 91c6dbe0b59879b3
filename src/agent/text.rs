//! Text analyst for the case query.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::analysis::build_text_report;
use super::collaborator::{TextCollaborator, non_empty_content};
use super::config::AgentConfig;
use super::prompt::build_text_prompt;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::core::AnalysisReport;
use crate::error::AgentError;

/// Model-backed [`TextCollaborator`].
pub struct TextAnalyzer {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl TextAnalyzer {
    /// Creates a new text analyzer.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            provider,
            model: config.text_model.clone(),
            max_tokens: config.text_max_tokens,
            system_prompt,
        }
    }
}

#[async_trait]
impl Agent for TextAnalyzer {
    fn name(&self) -> &'static str {
        "text_analyst"
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

#[async_trait]
impl TextCollaborator for TextAnalyzer {
    async fn analyze(&self, text: &str) -> Result<AnalysisReport, AgentError> {
        if text.trim().is_empty() {
            debug!("text input is blank; skipping model call");
            return Ok(AnalysisReport::empty_text());
        }

        let response = self
            .execute(self.provider.as_ref(), &build_text_prompt(text))
            .await?;
        let content = non_empty_content(
            "text",
            response.content,
            response.finish_reason.as_deref(),
            self.max_tokens,
        )?;

        let report = build_text_report(&content, text, response.usage.total_tokens);
        info!(
            findings = report.findings.len(),
            urgency = %report.urgency_level,
            "text analysis completed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::{ChatRequest, ChatResponse, TokenUsage};
    use crate::core::{AnalysisStatus, Level};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        content: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ChatResponse {
                content: self.content.to_string(),
                usage: TokenUsage::default(),
                finish_reason: Some("stop".to_string()),
            })
        }
    }

    fn analyzer(provider: Arc<FixedProvider>) -> TextAnalyzer {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        TextAnalyzer::new(provider, &config, "text prompt".to_string())
    }

    #[tokio::test]
    async fn test_blank_text_skips_model() {
        let provider = Arc::new(FixedProvider {
            content: "unused",
            calls: AtomicUsize::new(0),
        });
        let report = analyzer(Arc::clone(&provider))
            .analyze("   ")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(report.status, AnalysisStatus::EmptyInput);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_structures_report() {
        let provider = Arc::new(FixedProvider {
            content: "Breast pain with tenderness is reported. This is urgent and needs immediate imaging.",
            calls: AtomicUsize::new(0),
        });
        let report = analyzer(Arc::clone(&provider))
            .analyze("left breast pain for two weeks")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(report.is_completed());
        assert_eq!(report.symptoms.len(), 1);
        assert_eq!(report.urgency_level, Level::High);
        assert_eq!(
            report.original_input.as_deref(),
            Some("left breast pain for two weeks")
        );
        assert_eq!(report.medical_terms, vec!["Breast"]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_model_output_is_error() {
        let provider = Arc::new(FixedProvider {
            content: "",
            calls: AtomicUsize::new(0),
        });
        let result = analyzer(provider).analyze("lump").await;
        assert!(matches!(
            result,
            Err(AgentError::Collaborator {
                collaborator: "text",
                ..
            })
        ));
    }
}

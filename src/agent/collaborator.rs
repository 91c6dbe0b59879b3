//! Narrow interfaces the orchestrator uses for the Act step.
//!
//! The model-backed implementations are [`ImageAnalyzer`](super::ImageAnalyzer)
//! and [`TextAnalyzer`](super::TextAnalyzer); tests substitute their own.

use async_trait::async_trait;

use crate::core::AnalysisReport;
use crate::error::AgentError;

/// Analyzes a case image.
#[async_trait]
pub trait ImageCollaborator: Send + Sync {
    /// Analyzes the image behind `image_ref`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Collaborator`] for an invalid or missing image
    /// and the provider's error when the model call fails.
    async fn analyze(&self, image_ref: &str) -> Result<AnalysisReport, AgentError>;
}

/// Analyzes the case text.
#[async_trait]
pub trait TextCollaborator: Send + Sync {
    /// Analyzes `text`. Blank input yields an
    /// [`AnalysisStatus::EmptyInput`](crate::core::AnalysisStatus::EmptyInput)
    /// report without calling the model.
    ///
    /// # Errors
    ///
    /// Returns the provider's error when the model call fails.
    async fn analyze(&self, text: &str) -> Result<AnalysisReport, AgentError>;
}

/// Rejects a blank model response.
///
/// When generation stopped on the token limit the message says so.
pub(crate) fn non_empty_content(
    collaborator: &'static str,
    content: String,
    finish_reason: Option<&str>,
    max_tokens: u32,
) -> Result<String, AgentError> {
    if !content.trim().is_empty() {
        return Ok(content);
    }
    let message = if finish_reason == Some("length") {
        format!("model returned no content (finish_reason=length, max_tokens={max_tokens})")
    } else {
        "model returned no content".to_string()
    };
    Err(AgentError::Collaborator {
        collaborator,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_content_passes_through() {
        let content = non_empty_content("text", "analysis".to_string(), None, 800);
        assert_eq!(content.unwrap_or_default(), "analysis");
    }

    #[test]
    fn test_blank_content_mentions_truncation() {
        let err = non_empty_content("image", "  ".to_string(), Some("length"), 1000);
        match err {
            Err(AgentError::Collaborator {
                collaborator,
                message,
            }) => {
                assert_eq!(collaborator, "image");
                assert!(message.contains("max_tokens=1000"));
            }
            _ => unreachable!(),
        }
    }
}

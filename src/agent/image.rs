//! Image analyst: reads the case image, sends it to a vision model, and
//! structures the answer with the keyword heuristics.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info};

use super::analysis::build_report;
use super::collaborator::{ImageCollaborator, non_empty_content};
use super::config::AgentConfig;
use super::message::{ImageAttachment, user_image_message};
use super::prompt::build_image_prompt;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::core::{AnalysisReport, AnalysisSource};
use crate::error::AgentError;

const COLLABORATOR: &str = "image";

/// Fallback MIME type when the magic bytes are not recognized.
const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Model-backed [`ImageCollaborator`].
pub struct ImageAnalyzer {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl ImageAnalyzer {
    /// Creates a new image analyzer.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            provider,
            model: config.vision_model.clone(),
            max_tokens: config.vision_max_tokens,
            system_prompt,
        }
    }

    /// Reads and encodes the image at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Collaborator`] if the path is missing, not a
    /// regular file, empty, or unreadable.
    pub async fn load_image(path: &Path) -> Result<ImageAttachment, AgentError> {
        let invalid = |message: String| AgentError::Collaborator {
            collaborator: COLLABORATOR,
            message,
        };

        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| invalid(format!("invalid or missing image {}: {e}", path.display())))?;
        if !meta.is_file() {
            return Err(invalid(format!(
                "invalid or missing image {}: not a file",
                path.display()
            )));
        }
        if meta.len() == 0 {
            return Err(invalid(format!(
                "invalid or missing image {}: file is empty",
                path.display()
            )));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| invalid(format!("failed to read image {}: {e}", path.display())))?;

        let mime_type = detect_mime_type(&bytes).unwrap_or(DEFAULT_MIME_TYPE);
        Ok(ImageAttachment {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(&bytes),
        })
    }
}

/// Detects an image MIME type from its magic bytes.
#[must_use]
pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if data.starts_with(b"\xff\xd8\xff") {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if data.starts_with(b"RIFF") && data.len() >= 12 && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

#[async_trait]
impl Agent for ImageAnalyzer {
    fn name(&self) -> &'static str {
        "image_analyst"
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
impl ImageCollaborator for ImageAnalyzer {
    async fn analyze(&self, image_ref: &str) -> Result<AnalysisReport, AgentError> {
        let attachment = Self::load_image(Path::new(image_ref)).await?;
        debug!(
            image = image_ref,
            mime_type = %attachment.mime_type,
            encoded_bytes = attachment.data.len(),
            "image loaded"
        );

        let message = user_image_message(&build_image_prompt(), attachment);
        let response = self.execute_message(self.provider.as_ref(), message).await?;
        let content = non_empty_content(
            COLLABORATOR,
            response.content,
            response.finish_reason.as_deref(),
            self.max_tokens,
        )?;

        let report = build_report(
            &content,
            AnalysisSource::Image {
                path: image_ref.to_string(),
            },
            response.usage.total_tokens,
        );
        info!(
            image = image_ref,
            findings = report.findings.len(),
            confidence = %report.confidence_level,
            "image analysis completed"
        );
        Ok(report)
    }
}

//! Structured output of the image and text collaborators.

use serde::{Deserialize, Serialize};

use super::Level;

/// Whether a collaborator actually analyzed something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// The model produced an analysis.
    Completed,
    /// The input was blank; no model call was made.
    EmptyInput,
}

/// What was analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisSource {
    /// An image file.
    Image {
        /// Path or handle of the image.
        path: String,
    },
    /// The free-text case query.
    Text,
}

/// Best-effort structured summary of one collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Outcome status.
    pub status: AnalysisStatus,
    /// What was analyzed.
    pub source: AnalysisSource,
    /// Unmodified model output.
    #[serde(default)]
    pub raw_analysis: String,
    /// Lines that mention a finding indicator.
    #[serde(default)]
    pub findings: Vec<String>,
    /// Sentence carrying the risk statement, if any.
    #[serde(default)]
    pub risk_assessment: Option<String>,
    /// Sentences mentioning risk factors.
    #[serde(default)]
    pub risk_factors: Vec<String>,
    /// Sentences mentioning symptoms.
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Lines carrying recommendations.
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Sentences with urgent or concerning language.
    #[serde(default)]
    pub urgent_flags: Vec<String>,
    /// How confident the analysis sounds.
    #[serde(default)]
    pub confidence_level: Level,
    /// How urgent the analysis sounds.
    #[serde(default)]
    pub urgency_level: Level,
    /// Short summary of the analysis.
    #[serde(default)]
    pub summary: Option<String>,
    /// Tokens consumed producing this report.
    #[serde(default)]
    pub tokens_used: u32,
    /// Capitalized phrases and hyphenated terms from a text analysis.
    #[serde(default)]
    pub medical_terms: Vec<String>,
    /// The text that was analyzed. Only set for text reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_input: Option<String>,
}

impl AnalysisReport {
    /// Creates an empty report for the given source and status.
    #[must_use]
    pub fn new(status: AnalysisStatus, source: AnalysisSource) -> Self {
        Self {
            status,
            source,
            raw_analysis: String::new(),
            findings: Vec::new(),
            risk_assessment: None,
            risk_factors: Vec::new(),
            symptoms: Vec::new(),
            recommendations: Vec::new(),
            urgent_flags: Vec::new(),
            confidence_level: Level::Medium,
            urgency_level: Level::Medium,
            summary: None,
            tokens_used: 0,
            medical_terms: Vec::new(),
            original_input: None,
        }
    }

    /// Report for a blank text input.
    #[must_use]
    pub fn empty_text() -> Self {
        let mut report = Self::new(AnalysisStatus::EmptyInput, AnalysisSource::Text);
        report.confidence_level = Level::Low;
        report.summary = Some("No text was provided for analysis.".to_string());
        report
    }

    /// Returns `true` if the model produced an analysis.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == AnalysisStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_report() {
        let report = AnalysisReport::empty_text();
        assert_eq!(report.status, AnalysisStatus::EmptyInput);
        assert_eq!(report.source, AnalysisSource::Text);
        assert!(!report.is_completed());
        assert_eq!(report.confidence_level, Level::Low);
    }

    #[test]
    fn test_source_serialization() {
        let source = AnalysisSource::Image {
            path: "scan.png".to_string(),
        };
        let json = serde_json::to_string(&source).unwrap_or_default();
        assert!(json.contains("\"kind\":\"image\""));
        assert!(json.contains("scan.png"));
    }

    #[test]
    fn test_report_deserialization_defaults() {
        let json = r#"{"status": "completed", "source": {"kind": "text"}}"#;
        let report: AnalysisReport =
            serde_json::from_str(json).unwrap_or_else(|_| unreachable!());
        assert!(report.findings.is_empty());
        assert!(report.medical_terms.is_empty());
        assert!(report.original_input.is_none());
        assert_eq!(report.urgency_level, Level::Medium);
    }
}

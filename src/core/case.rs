//! Case inputs, per-iteration records, and final evaluation results.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::action::ActionKind;
use super::report::AnalysisReport;

/// Message attached to every clarification request.
pub const CLARIFICATION_MESSAGE: &str =
    "Additional information is required to complete the evaluation.";

/// One evaluation request.
///
/// Deserializes from `{"query": ..., "image": ..., <any other keys>}`;
/// `username` is accepted as an alias for `query`, and unknown keys land in
/// [`metadata`](CaseInput::metadata).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseInput {
    /// Free-text description of the case. May be empty when an image is given.
    #[serde(default, alias = "username")]
    pub query: String,
    /// Path or handle of the case image. Opaque to the orchestrator.
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// Caller-supplied metadata, passed through to the final evaluation prompt.
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl CaseInput {
    /// Creates a text-only case.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            image_ref: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Attaches an image reference.
    #[must_use]
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns the image reference, treating a blank one as absent.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image_ref
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns `true` if an image is attached.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image().is_some()
    }

    /// Returns `true` if the case has something to evaluate.
    #[must_use]
    pub fn is_evaluable(&self) -> bool {
        !self.query.trim().is_empty() || self.has_image()
    }
}

/// What the Act step produced in one iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActOutcome {
    /// The image collaborator returned a report.
    ImageAnalyzed {
        /// The report.
        report: AnalysisReport,
    },
    /// The text collaborator returned a report.
    TextAnalyzed {
        /// The report.
        report: AnalysisReport,
    },
    /// The planner asked for more information.
    InfoRequested {
        /// Fields the planner asked for.
        fields: Vec<String>,
    },
    /// The planner declared readiness for the final evaluation.
    ReadyToEvaluate,
    /// The action could not be carried out.
    Failed {
        /// Why it failed.
        reason: String,
    },
}

impl ActOutcome {
    /// Returns `true` for [`ActOutcome::Failed`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// One pass through Think, Act, and Observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based iteration number.
    pub iteration: usize,
    /// Action that was executed.
    pub action: ActionKind,
    /// Planner's stated reason.
    pub reason: String,
    /// What the action produced.
    pub outcome: ActOutcome,
    /// Running confidence after this iteration was observed.
    pub confidence_after: f64,
    /// The planner's output was unusable and the fallback plan ran instead.
    #[serde(default)]
    pub fallback: bool,
}

/// Request for more information, issued when the loop runs out of iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationRequest {
    /// Fields still missing.
    pub missing_fields: Vec<String>,
    /// Human-readable message.
    pub message: String,
    /// Confidence when the request was made.
    pub confidence_at_request: f64,
}

impl ClarificationRequest {
    /// Creates a request with the standard message.
    #[must_use]
    pub fn new(missing_fields: Vec<String>, confidence_at_request: f64) -> Self {
        Self {
            missing_fields,
            message: CLARIFICATION_MESSAGE.to_string(),
            confidence_at_request,
        }
    }
}

/// Terminal status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    /// The final evaluation was produced.
    Completed,
    /// The final evaluation failed or the case could not be evaluated.
    Error,
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Completed => "completed",
            Self::Error => "error",
        })
    }
}

/// Final output of one evaluation session.
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    /// Terminal status.
    pub status: CaseStatus,
    /// Accumulated confidence (not clamped).
    pub confidence: f64,
    /// Free-text evaluation from the final model call.
    pub evaluation_text: Option<String>,
    /// Image report, if the image was analyzed.
    pub image_analysis: Option<AnalysisReport>,
    /// Text report, if the query was analyzed.
    pub text_analysis: Option<AnalysisReport>,
    /// Recommendations gathered from the reports.
    pub recommendations: Vec<String>,
    /// Number of Think/Act/Observe iterations executed.
    pub iterations_used: usize,
    /// Set when the loop ran out of iterations without enough evidence.
    pub clarification: Option<ClarificationRequest>,
    /// Failure message when `status` is [`CaseStatus::Error`].
    pub error: Option<String>,
    /// Per-iteration trace.
    pub iteration_log: Vec<IterationRecord>,
    /// Tokens consumed across every model call in the session.
    pub total_tokens: u32,
    /// Wall-clock duration of the session.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

impl CaseResult {
    /// Returns `true` if the final evaluation was produced.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == CaseStatus::Completed
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(d.as_secs_f64())
}

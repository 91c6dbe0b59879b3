//! Action plans produced by the Think step.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Reason recorded on the plan substituted when planning fails.
pub const FALLBACK_REASON: &str = "fallback";

/// The closed set of actions the orchestrator can take in one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Run the image collaborator on the case image.
    AnalyzeImage,
    /// Run the text collaborator on the case query.
    AnalyzeText,
    /// Ask the caller for specific missing fields.
    RequestInfo,
    /// Declare readiness for the final evaluation.
    Evaluate,
}

impl ActionKind {
    /// All variants, in prompt order.
    pub const ALL: [Self; 4] = [
        Self::AnalyzeImage,
        Self::AnalyzeText,
        Self::RequestInfo,
        Self::Evaluate,
    ];

    /// Returns the wire name (`analyze_image`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AnalyzeImage => "analyze_image",
            Self::AnalyzeText => "analyze_text",
            Self::RequestInfo => "request_info",
            Self::Evaluate => "evaluate",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The next step chosen by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    /// Action to execute.
    pub action: ActionKind,
    /// Planner's justification.
    pub reason: String,
    /// Fields to ask the caller for. Only non-empty for
    /// [`ActionKind::RequestInfo`].
    #[serde(default)]
    pub required_fields: Vec<String>,
}

impl ActionPlan {
    /// Creates a plan with no required fields.
    #[must_use]
    pub fn new(action: ActionKind, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
            required_fields: Vec::new(),
        }
    }

    /// Creates a [`ActionKind::RequestInfo`] plan for the given fields.
    #[must_use]
    pub fn request_info(reason: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            action: ActionKind::RequestInfo,
            reason: reason.into(),
            required_fields: fields,
        }
    }

    /// The plan used whenever the Think step cannot produce a valid one.
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(ActionKind::Evaluate, FALLBACK_REASON)
    }

    /// Returns `true` if this is the substituted fallback plan.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.action == ActionKind::Evaluate
            && self.reason == FALLBACK_REASON
            && self.required_fields.is_empty()
    }

    /// Checks the plan invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::PlanValidation`] when `required_fields` is set
    /// on anything but a `request_info` plan.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.action != ActionKind::RequestInfo && !self.required_fields.is_empty() {
            return Err(AgentError::PlanValidation {
                message: format!(
                    "required_fields must be empty for action '{}' (got {:?})",
                    self.action, self.required_fields
                ),
            });
        }
        Ok(())
    }
}

//! Per-session working memory of the evaluation loop.
//!
//! An [`EvaluationState`] is created by one `evaluate` call, mutated only
//! by that call, and dropped when it returns.

use crate::core::{
    ActOutcome, ActionPlan, AnalysisReport, CaseInput, ClarificationRequest, IterationRecord,
};

/// Confidence gained when the image collaborator succeeds.
pub const IMAGE_DELTA: f64 = 0.3;
/// Confidence gained when the text collaborator succeeds.
pub const TEXT_DELTA: f64 = 0.3;
/// Confidence change when the planner asks for more information.
pub const REQUEST_INFO_DELTA: f64 = -0.2;
/// Confidence gained when the planner declares readiness.
pub const EVALUATE_DELTA: f64 = 0.4;

/// Slack for comparing the accumulator against the threshold.
const CONFIDENCE_EPSILON: f64 = 1e-9;

/// Mutable working memory for one session.
#[derive(Debug, Clone)]
pub struct EvaluationState<'a> {
    /// The case being evaluated.
    pub input: &'a CaseInput,
    /// Latest image report.
    pub image_analysis: Option<AnalysisReport>,
    /// Latest text report.
    pub text_analysis: Option<AnalysisReport>,
    /// Fields the planner last asked for.
    pub missing_fields: Vec<String>,
    /// Running confidence. Never clamped.
    pub confidence: f64,
    /// One record per completed iteration.
    pub iteration_log: Vec<IterationRecord>,
    /// Set once, when the loop runs out of iterations.
    pub clarification: Option<ClarificationRequest>,
}

impl<'a> EvaluationState<'a> {
    /// Starts a session with zero confidence.
    #[must_use]
    pub const fn new(input: &'a CaseInput) -> Self {
        Self {
            input,
            image_analysis: None,
            text_analysis: None,
            missing_fields: Vec::new(),
            confidence: 0.0,
            iteration_log: Vec::new(),
            clarification: None,
        }
    }

    /// Number of iterations observed so far.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iteration_log.len()
    }

    /// Applies an Act outcome and appends the iteration record.
    ///
    /// Failed actions are recorded without touching confidence.
    pub fn observe(&mut self, plan: &ActionPlan, outcome: ActOutcome) {
        match &outcome {
            ActOutcome::ImageAnalyzed { report } => {
                self.image_analysis = Some(report.clone());
                self.confidence += IMAGE_DELTA;
            }
            ActOutcome::TextAnalyzed { report } => {
                self.text_analysis = Some(report.clone());
                self.confidence += TEXT_DELTA;
            }
            ActOutcome::InfoRequested { fields } => {
                self.missing_fields.clone_from(fields);
                self.confidence += REQUEST_INFO_DELTA;
            }
            ActOutcome::ReadyToEvaluate => {
                self.confidence += EVALUATE_DELTA;
            }
            ActOutcome::Failed { .. } => {}
        }

        self.iteration_log.push(IterationRecord {
            iteration: self.iteration_log.len() + 1,
            action: plan.action,
            reason: plan.reason.clone(),
            outcome,
            confidence_after: self.confidence,
            fallback: plan.is_fallback(),
        });
    }

    /// Returns `true` when the loop may stop: confidence at or above
    /// `threshold`, at least one analysis present, and nothing missing.
    #[must_use]
    pub fn is_sufficient(&self, threshold: f64) -> bool {
        self.confidence + CONFIDENCE_EPSILON >= threshold
            && (self.image_analysis.is_some() || self.text_analysis.is_some())
            && self.missing_fields.is_empty()
    }

    /// Records the clarification request. Later calls are ignored.
    pub fn request_clarification(&mut self) {
        if self.clarification.is_none() {
            self.clarification = Some(ClarificationRequest::new(
                self.missing_fields.clone(),
                self.confidence,
            ));
        }
    }

    /// Union of the reports' recommendations, image first, without duplicates.
    #[must_use]
    pub fn recommendations(&self) -> Vec<String> {
        let mut merged: Vec<String> = Vec::new();
        let reports = [self.image_analysis.as_ref(), self.text_analysis.as_ref()];
        for rec in reports.into_iter().flatten().flat_map(|r| &r.recommendations) {
            if !merged.contains(rec) {
                merged.push(rec.clone());
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionKind, AnalysisSource, AnalysisStatus};

    const THRESHOLD: f64 = 0.7;

    fn text_report(recommendations: &[&str]) -> AnalysisReport {
        let mut report = AnalysisReport::new(AnalysisStatus::Completed, AnalysisSource::Text);
        report.recommendations = recommendations.iter().map(|s| (*s).to_string()).collect();
        report
    }

    #[test]
    fn test_image_then_evaluate_reaches_threshold() {
        let input = CaseInput::new("").with_image("scan.jpg");
        let mut state = EvaluationState::new(&input);

        let mut report = text_report(&[]);
        report.source = AnalysisSource::Image {
            path: "scan.jpg".to_string(),
        };
        state.observe(
            &ActionPlan::new(ActionKind::AnalyzeImage, "image present"),
            ActOutcome::ImageAnalyzed { report },
        );
        assert!((state.confidence - 0.3).abs() < 1e-9);
        assert!(!state.is_sufficient(THRESHOLD));

        state.observe(
            &ActionPlan::new(ActionKind::Evaluate, "ready"),
            ActOutcome::ReadyToEvaluate,
        );
        assert!((state.confidence - 0.7).abs() < 1e-9);
        assert!(state.is_sufficient(THRESHOLD));
        assert_eq!(state.iterations(), 2);
        assert_eq!(state.iteration_log[1].iteration, 2);
    }

    #[test]
    fn test_fallback_plan_is_flagged_in_log() {
        let input = CaseInput::new("pain");
        let mut state = EvaluationState::new(&input);
        state.observe(
            &ActionPlan::new(ActionKind::Evaluate, "enough"),
            ActOutcome::ReadyToEvaluate,
        );
        state.observe(&ActionPlan::fallback(), ActOutcome::ReadyToEvaluate);

        assert!(!state.iteration_log[0].fallback);
        assert!(state.iteration_log[1].fallback);
    }

    #[test]
    fn test_failed_action_keeps_confidence() {
        let input = CaseInput::new("pain");
        let mut state = EvaluationState::new(&input);
        state.observe(
            &ActionPlan::new(ActionKind::AnalyzeImage, "try image"),
            ActOutcome::Failed {
                reason: "no image".to_string(),
            },
        );
        assert!(state.confidence.abs() < f64::EPSILON);
        assert!(state.image_analysis.is_none());
        assert_eq!(state.iterations(), 1);
    }

    #[test]
    fn test_request_info_replaces_missing_fields() {
        let input = CaseInput::new("pain");
        let mut state = EvaluationState::new(&input);
        for fields in [vec!["age", "history"], vec!["age"]] {
            let fields: Vec<String> = fields.into_iter().map(String::from).collect();
            state.observe(
                &ActionPlan::request_info("need info", fields.clone()),
                ActOutcome::InfoRequested { fields },
            );
        }
        assert_eq!(state.missing_fields, vec!["age"]);
        assert!((state.confidence + 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_missing_fields_block_sufficiency() {
        let input = CaseInput::new("pain");
        let mut state = EvaluationState::new(&input);
        state.text_analysis = Some(text_report(&[]));
        state.confidence = 1.5;
        state.missing_fields.push("age".to_string());
        assert!(!state.is_sufficient(THRESHOLD));
        state.missing_fields.clear();
        assert!(state.is_sufficient(THRESHOLD));
    }

    #[test]
    fn test_confidence_without_analysis_is_not_sufficient() {
        let input = CaseInput::new("pain");
        let mut state = EvaluationState::new(&input);
        state.confidence = 1.2;
        assert!(!state.is_sufficient(THRESHOLD));
    }

    #[test]
    fn test_clarification_set_once() {
        let input = CaseInput::new("pain");
        let mut state = EvaluationState::new(&input);
        state.missing_fields = vec!["age".to_string()];
        state.confidence = -0.2;
        state.request_clarification();
        state.missing_fields.clear();
        state.request_clarification();
        let clarification = state.clarification.unwrap_or_else(|| unreachable!());
        assert_eq!(clarification.missing_fields, vec!["age"]);
    }

    #[test]
    fn test_recommendations_deduplicated() {
        let input = CaseInput::new("pain");
        let mut state = EvaluationState::new(&input);
        state.image_analysis = Some(text_report(&["Biopsy advised.", "Ultrasound."]));
        state.text_analysis = Some(text_report(&["Ultrasound.", "Follow up in 6 months."]));
        assert_eq!(
            state.recommendations(),
            vec!["Biopsy advised.", "Ultrasound.", "Follow up in 6 months."]
        );
    }
}

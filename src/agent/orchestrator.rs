//! Orchestrator for the Think → Act → Observe evaluation loop.
//!
//! Each session plans one action per iteration, runs it, folds the outcome
//! into the running confidence, and stops once enough evidence is in or the
//! iteration cap is hit. A final model call writes the evaluation. Every
//! failure is absorbed into the returned [`CaseResult`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, debug, info, info_span, warn};

use super::collaborator::{ImageCollaborator, TextCollaborator};
use super::config::AgentConfig;
use super::evaluator::EvaluatorAgent;
use super::image::ImageAnalyzer;
use super::ledger::{ConversationLedger, LedgerEntry};
use super::planner::PlannerAgent;
use super::prompt::{PromptSet, ThinkingContext, build_evaluation_prompt};
use super::provider::LlmProvider;
use super::state::EvaluationState;
use super::text::TextAnalyzer;
use super::traits::Agent;
use crate::core::{ActOutcome, ActionKind, ActionPlan, CaseInput, CaseResult, CaseStatus};
use crate::error::AgentError;

/// Drives evaluation sessions and keeps their history.
///
/// One instance may serve many sessions, sequentially or concurrently; each
/// session owns its own [`EvaluationState`] and only the ledger is shared.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    planner: PlannerAgent,
    evaluator: EvaluatorAgent,
    image: Arc<dyn ImageCollaborator>,
    text: Arc<dyn TextCollaborator>,
    ledger: ConversationLedger,
}

impl Orchestrator {
    /// Creates a new orchestrator with the given provider and configuration.
    ///
    /// Loads prompt templates from the directory specified in
    /// [`AgentConfig::prompt_dir`], falling back to compiled-in defaults,
    /// and wires the model-backed image and text analyzers to `provider`.
    pub fn new(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        let image: Arc<dyn ImageCollaborator> = Arc::new(ImageAnalyzer::new(
            Arc::clone(&provider),
            &config,
            prompts.image.clone(),
        ));
        let text: Arc<dyn TextCollaborator> = Arc::new(TextAnalyzer::new(
            Arc::clone(&provider),
            &config,
            prompts.text.clone(),
        ));
        Self::with_collaborators(provider, config, &prompts, image, text)
    }

    /// Creates an orchestrator with caller-supplied collaborators.
    ///
    /// `provider` still serves the Think and Finalize steps.
    pub fn with_collaborators(
        provider: Arc<dyn LlmProvider>,
        config: AgentConfig,
        prompts: &PromptSet,
        image: Arc<dyn ImageCollaborator>,
        text: Arc<dyn TextCollaborator>,
    ) -> Self {
        Self {
            planner: PlannerAgent::new(&config, prompts.planner.clone()),
            evaluator: EvaluatorAgent::new(&config, prompts.evaluator.clone()),
            provider,
            config,
            image,
            text,
            ledger: ConversationLedger::new(),
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Runs one evaluation session.
    ///
    /// Never fails: service, parse, and collaborator errors degrade the
    /// affected step and surface in the result. The result is appended to
    /// the history before it is returned.
    pub async fn evaluate(&self, input: CaseInput) -> CaseResult {
        let span = info_span!(
            "evaluate",
            has_image = input.has_image(),
            query_len = input.query.len()
        );
        let result = self.run_session(&input).instrument(span).await;

        self.ledger.append(LedgerEntry {
            input,
            iterations_used: result.iterations_used,
            result: result.clone(),
        });
        result
    }

    /// Returns every completed session in insertion order.
    #[must_use]
    pub fn history(&self) -> Vec<LedgerEntry> {
        self.ledger.all()
    }

    /// Clears the session history.
    pub fn reset_history(&self) {
        self.ledger.reset();
    }

    async fn run_session(&self, input: &CaseInput) -> CaseResult {
        let start = Instant::now();

        if !input.is_evaluable() {
            let error = AgentError::InvalidCase {
                message: "neither query text nor an image to evaluate".to_string(),
            };
            warn!(%error, "skipping session");
            return CaseResult {
                status: CaseStatus::Error,
                confidence: 0.0,
                evaluation_text: None,
                image_analysis: None,
                text_analysis: None,
                recommendations: Vec::new(),
                iterations_used: 0,
                clarification: None,
                error: Some(error.to_string()),
                iteration_log: Vec::new(),
                total_tokens: 0,
                elapsed: start.elapsed(),
            };
        }

        let mut state = EvaluationState::new(input);
        let mut total_tokens: u32 = 0;
        let max_iterations = self.config.max_iterations;

        for iteration in 1..=max_iterations {
            let plan = self.think(&state, iteration, &mut total_tokens).await;
            let outcome = self.act(&plan, input, &mut total_tokens).await;
            state.observe(&plan, outcome);

            debug!(
                iteration,
                action = %plan.action,
                fallback = plan.is_fallback(),
                confidence = state.confidence,
                "iteration observed"
            );

            if state.is_sufficient(self.config.confidence_threshold) {
                info!(
                    iteration,
                    confidence = state.confidence,
                    "enough evidence gathered"
                );
                break;
            }

            if iteration == max_iterations {
                state.request_clarification();
                info!(
                    missing = ?state.missing_fields,
                    confidence = state.confidence,
                    "iteration cap reached; clarification requested"
                );
            }
        }

        self.finalize(state, total_tokens, start).await
    }

    /// Think: asks the planner for the next action, substituting the
    /// fallback plan on any failure.
    async fn think(
        &self,
        state: &EvaluationState<'_>,
        iteration: usize,
        total_tokens: &mut u32,
    ) -> ActionPlan {
        let ctx = ThinkingContext {
            query: &state.input.query,
            has_image: state.input.has_image(),
            image_analyzed: state.image_analysis.is_some(),
            text_analyzed: state.text_analysis.is_some(),
            confidence: state.confidence,
            missing_fields: &state.missing_fields,
            iteration,
            max_iterations: self.config.max_iterations,
        };

        let (plan, usage) = self.planner.plan(self.provider.as_ref(), &ctx).await;
        *total_tokens = total_tokens.saturating_add(usage.total_tokens);

        match plan {
            Ok(plan) => {
                info!(iteration, action = %plan.action, reason = %plan.reason, "plan chosen");
                plan
            }
            Err(e) => {
                warn!(
                    iteration,
                    error = %e,
                    service_error = e.is_service_error(),
                    "planning failed; using fallback plan"
                );
                ActionPlan::fallback()
            }
        }
    }

    /// Act: executes the planned action.
    async fn act(&self, plan: &ActionPlan, input: &CaseInput, total_tokens: &mut u32) -> ActOutcome {
        match plan.action {
            ActionKind::AnalyzeImage => {
                let Some(image_ref) = input.image() else {
                    warn!("image analysis planned but no image is attached");
                    return ActOutcome::Failed {
                        reason: "invalid or missing image: no image attached to the case"
                            .to_string(),
                    };
                };
                match self.image.analyze(image_ref).await {
                    Ok(report) => {
                        *total_tokens = total_tokens.saturating_add(report.tokens_used);
                        ActOutcome::ImageAnalyzed { report }
                    }
                    Err(e) => {
                        warn!(error = %e, "image analysis failed");
                        ActOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }
            ActionKind::AnalyzeText => match self.text.analyze(&input.query).await {
                Ok(report) => {
                    *total_tokens = total_tokens.saturating_add(report.tokens_used);
                    ActOutcome::TextAnalyzed { report }
                }
                Err(e) => {
                    warn!(error = %e, "text analysis failed");
                    ActOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            },
            ActionKind::RequestInfo => ActOutcome::InfoRequested {
                fields: plan.required_fields.clone(),
            },
            ActionKind::Evaluate => ActOutcome::ReadyToEvaluate,
        }
    }

    /// Finalize: writes the evaluation and assembles the result.
    async fn finalize(
        &self,
        state: EvaluationState<'_>,
        mut total_tokens: u32,
        start: Instant,
    ) -> CaseResult {
        let prompt = build_evaluation_prompt(
            &state.input.query,
            &state.input.metadata,
            state.image_analysis.as_ref(),
            state.text_analysis.as_ref(),
            state.confidence,
            &state.missing_fields,
        );

        let (status, evaluation_text, error) =
            match self.evaluator.execute(self.provider.as_ref(), &prompt).await {
                Ok(response) => {
                    total_tokens = total_tokens.saturating_add(response.usage.total_tokens);
                    (CaseStatus::Completed, Some(response.content), None)
                }
                Err(e) => {
                    let service_error = e.is_service_error();
                    warn!(error = %e, service_error, "final evaluation failed");
                    let message = if service_error {
                        format!("model service unavailable: {e}")
                    } else {
                        e.to_string()
                    };
                    (CaseStatus::Error, None, Some(message))
                }
            };

        let recommendations = state.recommendations();
        let iterations_used = state.iterations();
        let result = CaseResult {
            status,
            confidence: state.confidence,
            evaluation_text,
            image_analysis: state.image_analysis,
            text_analysis: state.text_analysis,
            recommendations,
            iterations_used,
            clarification: state.clarification,
            error,
            iteration_log: state.iteration_log,
            total_tokens,
            elapsed: start.elapsed(),
        };

        info!(
            status = %result.status,
            iterations = result.iterations_used,
            confidence = result.confidence,
            tokens = result.total_tokens,
            elapsed_ms = u64::try_from(result.elapsed.as_millis()).unwrap_or(u64::MAX),
            "evaluation finished"
        );
        result
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .field("sessions", &self.ledger.len())
            .finish_non_exhaustive()
    }
}

//! Agentic evaluation system for mamaria.
//!
//! Provides an LLM-powered Think → Act → Observe loop that gathers image
//! and text evidence for a case and writes a final evaluation. Uses a
//! pluggable provider abstraction backed by OpenAI-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! CaseInput → Orchestrator
//!   ├── loop (≤ max_iterations)
//!   │   ├── Think:   PlannerAgent → ActionPlan (fallback: evaluate)
//!   │   ├── Act:     ImageCollaborator | TextCollaborator | request info | ready
//!   │   └── Observe: EvaluationState confidence deltas, termination check
//!   ├── clarification request if the cap was hit without enough evidence
//!   ├── Finalize: EvaluatorAgent → evaluation text
//!   └── ConversationLedger.append → CaseResult
//! ```

pub mod analysis;
pub mod client;
pub mod collaborator;
pub mod config;
pub mod evaluator;
pub mod image;
pub mod ledger;
pub mod message;
pub mod orchestrator;
pub mod planner;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod state;
pub mod text;
pub mod traits;

// Re-export key types
pub use client::create_provider;
pub use collaborator::{ImageCollaborator, TextCollaborator};
pub use config::AgentConfig;
pub use evaluator::EvaluatorAgent;
pub use image::ImageAnalyzer;
pub use ledger::{ConversationLedger, LedgerEntry};
pub use message::{ChatMessage, ChatRequest, ChatResponse, ImageAttachment, Role, TokenUsage};
pub use orchestrator::Orchestrator;
pub use planner::PlannerAgent;
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use state::EvaluationState;
pub use text::TextAnalyzer;
pub use traits::{Agent, AgentResponse};

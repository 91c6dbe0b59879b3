//! # mamaria
//!
//! A Think-Act-Observe orchestrator that drives an OpenAI-compatible
//! multimodal model through image and text analysis of a case and
//! produces a final evaluation.
//!
//! Each call to [`Orchestrator::evaluate`] runs one bounded session:
//!
//! 1. **Think**: a planner model picks the next action (analyze the image,
//!    analyze the text, request missing information, or evaluate).
//! 2. **Act**: the matching collaborator runs and returns a structured
//!    [`AnalysisReport`](core::AnalysisReport).
//! 3. **Observe**: a running confidence score is updated and the loop
//!    stops once the evidence is sufficient or the iteration cap is hit.
//!
//! The session always ends with a final evaluation call and a
//! [`CaseResult`]; failures are folded into the result rather than
//! returned as errors.
//!
//! ## Quick start
//!
//! ```no_run
//! use mamaria::{AgentConfig, CaseInput, Orchestrator, create_provider};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AgentConfig::from_env()?;
//! let provider = create_provider(&config)?;
//! let orchestrator = Orchestrator::new(provider, config);
//!
//! let case = CaseInput::new("Palpable lump in the left breast")
//!     .with_image("scans/left-cc.png")
//!     .with_metadata("age", 52);
//! let result = orchestrator.evaluate(case).await;
//! println!("{}: {:.2}", result.status, result.confidence);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod error;

pub use agent::{AgentConfig, ConversationLedger, LlmProvider, Orchestrator, create_provider};
pub use core::{CaseInput, CaseResult, CaseStatus};
pub use error::{AgentError, CommandError, Error, Result};

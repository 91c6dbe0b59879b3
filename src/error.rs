//! Error types for mamaria.
//!
//! [`AgentError`] covers everything that can go wrong while talking to the
//! model service or running a collaborator. The orchestrator never lets one
//! escape [`Orchestrator::evaluate`](crate::agent::Orchestrator::evaluate);
//! each is folded into the iteration log or the final
//! [`CaseResult`](crate::core::CaseResult). [`CommandError`] and the
//! top-level [`Error`] exist for the CLI layer.

use thiserror::Error;

/// Result alias used by the CLI layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Agent or model-service failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Errors raised by agents, providers, and collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// No API key was configured.
    #[error("API key not configured (set OPENAI_API_KEY or MAMARIA_API_KEY)")]
    ApiKeyMissing,

    /// The configured provider name has no implementation.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name from configuration.
        name: String,
    },

    /// The model service rejected or failed the request.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Service error message.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// The model service did not answer within the configured timeout.
    #[error("API request timed out after {seconds}s")]
    Timeout {
        /// Timeout that elapsed.
        seconds: u64,
    },

    /// The response could not be decoded.
    #[error("failed to parse response: {message}")]
    ResponseParse {
        /// Decoder diagnostic.
        message: String,
        /// Raw response content.
        content: String,
    },

    /// A decoded action plan violates its invariants.
    #[error("invalid action plan: {message}")]
    PlanValidation {
        /// What was wrong with the plan.
        message: String,
    },

    /// An image or text collaborator failed.
    #[error("{collaborator} analysis failed: {message}")]
    Collaborator {
        /// Which collaborator failed (`"image"` or `"text"`).
        collaborator: &'static str,
        /// Failure description.
        message: String,
    },

    /// The case input cannot be evaluated at all.
    #[error("invalid case input: {message}")]
    InvalidCase {
        /// What is missing.
        message: String,
    },
}

impl AgentError {
    /// Returns `true` for failures of the remote service itself.
    #[must_use]
    pub const fn is_service_error(&self) -> bool {
        matches!(self, Self::ApiRequest { .. } | Self::Timeout { .. })
    }
}

/// Errors raised by CLI commands.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command could not complete.
    #[error("{0}")]
    ExecutionFailed(String),

    /// A flag or argument value is unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output could not be rendered.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),
}

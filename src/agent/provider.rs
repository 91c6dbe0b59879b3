//! Pluggable LLM provider trait.
//!
//! Implementations translate provider-agnostic [`ChatRequest`]/[`ChatResponse`]
//! into provider-specific SDK calls. This keeps all agent logic decoupled
//! from any particular LLM vendor.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// Trait for LLM provider backends.
///
/// Each call is a single bounded request: implementations apply their own
/// timeout and never retry on their own.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// When `request.json_mode` is set the service guarantees syntactically
    /// valid JSON; the caller still validates its shape.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] or [`AgentError::Timeout`] on
    /// network, auth, quota, or latency failures.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}

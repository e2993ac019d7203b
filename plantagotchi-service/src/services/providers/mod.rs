//! Chat-completion provider abstractions and implementations.
//!
//! Handlers only see the `ChatProvider` trait, so the OpenAI backend can be
//! swapped for the scripted mock in tests.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A function the model is forced to call, with its JSON schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: serde_json::Value,
}

/// Provider-neutral chat request: one system and one user message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub function: Option<FunctionSpec>,
}

/// What the model answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Arguments of a function call, as the serialized JSON string the API returns.
    Structured { name: String, arguments: String },

    /// Free-form message content.
    Text(String),
}

/// Trait for chat-completion providers (e.g., OpenAI).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run a single completion.
    async fn complete(&self, request: &ChatRequest) -> Result<Completion, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

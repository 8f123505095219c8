//! Content generator port
//!
//! Defines the interface for producing text from a prompt, typically a
//! language model behind an HTTP API.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while generating content
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Text generator used by the refinement loop
///
/// One call per prompt; no idempotence is assumed, so the caller never
/// repeats a call except for its explicit correction retry.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

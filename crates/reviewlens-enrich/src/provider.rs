//! LLM provider trait definition

use async_trait::async_trait;
use reviewlens_core::ChatMessage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Options for a completion request
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: Some(300),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A completion returned by a provider
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// Errors that can occur when interacting with an LLM provider
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Request timeout")]
    Timeout,

    #[error("API key not set: environment variable {0} is empty or missing")]
    MissingApiKey(String),
}

impl LlmError {
    /// Whether another attempt could succeed. Bad requests and auth failures
    /// fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => !matches!(status, 400 | 401 | 403),
            Self::MissingApiKey(_) => false,
            Self::Connection(_) | Self::InvalidResponse(_) | Self::RateLimited | Self::Timeout => {
                true
            }
        }
    }

    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Api { .. } => "api",
            Self::InvalidResponse(_) => "invalid_response",
            Self::RateLimited => "rate_limited",
            Self::Timeout => "timeout",
            Self::MissingApiKey(_) => "missing_api_key",
        }
    }
}

/// Trait for LLM providers.
///
/// Implementations connect to a chat-completion backend; the enrichment job
/// treats them as opaque and possibly failing.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// Model being used
    fn model(&self) -> &str;

    /// Complete a conversation
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(LlmError::Timeout.is_retryable());
        assert!(LlmError::RateLimited.is_retryable());
        assert!(LlmError::InvalidResponse("x".into()).is_retryable());
        assert!(LlmError::Api {
            status: 500,
            message: String::new()
        }
        .is_retryable());
        for status in [400, 401, 403] {
            assert!(!LlmError::Api {
                status,
                message: String::new()
            }
            .is_retryable());
        }
        assert!(!LlmError::MissingApiKey("KEY".into()).is_retryable());
    }
}

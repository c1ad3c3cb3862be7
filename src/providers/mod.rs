/*!
 * Text-generation providers.
 *
 * This module contains client implementations for the supported LLM APIs:
 * - OpenAI: chat completions (also used for LM Studio's compatible server)
 * - Anthropic: messages API
 * - Mock: scripted provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{ProviderConfig, ProviderKind};
use crate::errors::ProviderError;

/// A single prompt submitted to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Prompt text, sent as one user message
    pub prompt: String,
    /// Maximum number of generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_tokens: 256,
            temperature: 0.0,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Text returned by a provider
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Prompt tokens reported by the API
    pub prompt_tokens: Option<u64>,
    /// Completion tokens reported by the API
    pub completion_tokens: Option<u64>,
}

/// Token usage summed over provider responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Usage accumulated after `earlier` was taken
    pub fn since(&self, earlier: &TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens.saturating_sub(earlier.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_sub(earlier.completion_tokens),
        }
    }
}

/// Common trait for all LLM providers
///
/// Implementations are constructed once with their credentials and shared by
/// reference, so tests can swap in a fake with the same contract.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<CompletionResponse, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self, model: &str) -> Result<(), ProviderError>;
}

/// Build the configured provider
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let provider: Arc<dyn Provider> = match config.kind {
        ProviderKind::OpenAI | ProviderKind::LMStudio => Arc::new(openai::OpenAI::new(
            config.get_api_key(),
            config.get_endpoint(),
            config.timeout_secs,
        )?),
        ProviderKind::Anthropic => Arc::new(anthropic::Anthropic::new(
            config.get_api_key(),
            config.get_endpoint(),
            config.timeout_secs,
        )?),
    };
    Ok(provider)
}

/// Map a transport error to a provider error
pub(crate) fn map_reqwest_error(error: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Map a non-success HTTP status to a provider error
pub(crate) fn map_status_error(status: reqwest::StatusCode, message: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(message),
        code => ProviderError::ApiError {
            status_code: code,
            message,
        },
    }
}

pub mod openai;
pub mod anthropic;
pub mod mock;

//! LLM Provider trait — the model invocation boundary.
//!
//! The agent loop calls [`LlmProvider::complete`] once per turn with a single
//! prompt string. Transport failures never propagate: providers fold them into
//! the response text.

use async_trait::async_trait;
use ollascout_core::types::{LlmResponse, Message};

/// Configuration passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    ///
    /// On API errors, returns `LlmResponse::error(...)` instead of propagating.
    async fn chat(&self, messages: &[Message], model: &str, config: &LlmRequestConfig)
        -> LlmResponse;

    /// Send one prompt as a single user message.
    async fn complete(&self, prompt: &str, model: &str, config: &LlmRequestConfig) -> LlmResponse {
        self.chat(&[Message::user(prompt)], model, config).await
    }

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

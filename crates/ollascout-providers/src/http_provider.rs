//! Generic HTTP-based LLM provider for OpenAI-compatible APIs.
//!
//! Talks to any `/chat/completions` endpoint: a local Ollama server, OpenAI,
//! OpenRouter, Groq, DeepSeek.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use ollascout_core::config::ProviderConfig;
use ollascout_core::types::{ChatCompletionRequest, ChatCompletionResponse, LlmResponse, Message};

use crate::registry::{find_by_name, resolve_api_base, resolve_api_key, ProviderSpec};
use crate::traits::{LlmProvider, LlmRequestConfig};

/// Request timeout for model calls. Local models can be slow on first load.
const REQUEST_TIMEOUT_SECS: u64 = 300;

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A generic LLM provider that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"http://localhost:11434/v1"`).
    api_base: String,
    /// API key for Bearer authentication; local servers may have none.
    api_key: Option<String>,
    /// Default model for this provider instance.
    default_model: String,
    /// Extra headers to send with each request.
    extra_headers: HeaderMap,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl HttpProvider {
    /// Create a new HttpProvider from a provider config and spec.
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec, model: &str) -> Self {
        let api_base = resolve_api_base(config, spec);
        let api_key = resolve_api_key(config, spec);

        let mut extra_headers = HeaderMap::new();
        if let Some(ref headers) = config.extra_headers {
            for (key, value) in headers {
                if let (Ok(name), Ok(val)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    extra_headers.insert(name, val);
                } else {
                    warn!("Invalid header: {}={}", key, value);
                }
            }
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        HttpProvider {
            client,
            api_base,
            api_key,
            default_model: model.to_string(),
            extra_headers,
            spec,
        }
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn chat(
        &self,
        messages: &[Message],
        model: &str,
        config: &LlmRequestConfig,
    ) -> LlmResponse {
        debug!(
            provider = self.spec.display_name,
            model = %model,
            messages = messages.len(),
            "Calling LLM"
        );

        let request_body = ChatCompletionRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
            stream: false,
        };

        let mut request = self
            .client
            .post(self.completions_url())
            .headers(self.extra_headers.clone())
            .json(&request_body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(provider = self.spec.display_name, error = %e, "HTTP request failed");
                return LlmResponse::error(format!("Error calling LLM: {}", e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                provider = self.spec.display_name,
                status = %status,
                body = %error_text,
                "API error"
            );
            return LlmResponse::error(format!("Error calling LLM: {} — {}", status, error_text));
        }

        match response.json::<ChatCompletionResponse>().await {
            Ok(chat_resp) => {
                let llm_resp: LlmResponse = chat_resp.into();
                debug!(
                    provider = self.spec.display_name,
                    has_content = llm_resp.content.is_some(),
                    finish_reason = llm_resp.finish_reason.as_deref().unwrap_or("?"),
                    "LLM response received"
                );
                llm_resp
            }
            Err(e) => {
                error!(
                    provider = self.spec.display_name,
                    error = %e,
                    "Failed to parse LLM response"
                );
                LlmResponse::error(format!("Error parsing LLM response: {}", e))
            }
        }
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn display_name(&self) -> &str {
        self.spec.display_name
    }
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build an HttpProvider from the provider section of the config.
///
/// Fails when the provider name is unknown, or when a hosted provider has no
/// API key in config or environment.
pub fn create_provider(config: &ProviderConfig, model: &str) -> anyhow::Result<HttpProvider> {
    let spec = find_by_name(&config.name).ok_or_else(|| {
        let known: Vec<&str> = crate::registry::PROVIDERS.iter().map(|s| s.name).collect();
        anyhow::anyhow!(
            "Unknown provider '{}'. Supported: {}",
            config.name,
            known.join(", ")
        )
    })?;

    if !spec.is_local && resolve_api_key(config, spec).is_none() {
        anyhow::bail!(
            "No API key configured for {}. Set provider.apiKey or {}.",
            spec.display_name,
            spec.env_key
        );
    }

    debug!(
        provider = spec.display_name,
        model = model,
        api_base = config.api_base.as_deref().unwrap_or(spec.default_api_base),
        "Creating LLM provider"
    );

    Ok(HttpProvider::new(config, spec, model))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_config(name: &str, api_key: &str, api_base: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            name: name.to_string(),
            api_key: api_key.to_string(),
            api_base: api_base.map(String::from),
            extra_headers: None,
        }
    }

    fn ok_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{
                "message": { "content": content },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 5,
                "total_tokens": 15
            }
        })
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let spec = find_by_name("openai").unwrap();
        let config = make_config("openai", "key", Some("https://api.openai.com/v1/"));
        let provider = HttpProvider::new(&config, spec, "gpt-4o");
        assert_eq!(
            provider.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_api_base_for_ollama() {
        let spec = find_by_name("ollama").unwrap();
        let config = make_config("ollama", "", None);
        let provider = HttpProvider::new(&config, spec, "llama3.1");
        assert_eq!(provider.api_base, "http://localhost:11434/v1");
        assert!(provider.api_key.is_none());
        assert_eq!(provider.display_name(), "Ollama");
        assert_eq!(provider.default_model(), "llama3.1");
    }

    #[test]
    fn test_extra_headers() {
        let spec = find_by_name("openrouter").unwrap();
        let mut headers = HashMap::new();
        headers.insert("X-Title".to_string(), "ollascout".to_string());
        let config = ProviderConfig {
            name: "openrouter".into(),
            api_key: "key".into(),
            api_base: None,
            extra_headers: Some(headers),
        };
        let provider = HttpProvider::new(&config, spec, "meta-llama/llama-3");
        assert!(provider.extra_headers.contains_key("x-title"));
    }

    #[test]
    fn test_create_provider_unknown_name() {
        let config = make_config("mystery", "", None);
        let err = create_provider(&config, "m").unwrap_err();
        assert!(err.to_string().contains("Unknown provider 'mystery'"));
    }

    #[test]
    fn test_create_provider_hosted_requires_key() {
        std::env::remove_var("GROQ_API_KEY");
        let config = make_config("groq", "", None);
        let err = create_provider(&config, "llama-3.3-70b").unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_create_provider_local_without_key() {
        let config = make_config("ollama", "", None);
        let provider = create_provider(&config, "llama3.1").unwrap();
        assert_eq!(provider.display_name(), "Ollama");
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "stream": false,
                "messages": [{"role": "user", "content": "What is llama3?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("llama3 is a model by Meta")))
            .mount(&mock_server)
            .await;

        let spec = find_by_name("openai").unwrap();
        let config = make_config("openai", "test-key-123", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, spec, "gpt-4o");

        let resp = provider
            .complete("What is llama3?", "gpt-4o", &LlmRequestConfig::default())
            .await;

        assert!(!resp.is_error());
        assert_eq!(resp.content.as_deref(), Some("llama3 is a model by Meta"));
        assert_eq!(resp.usage.as_ref().unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_complete_local_without_auth() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("ok")))
            .mount(&mock_server)
            .await;

        let spec = find_by_name("ollama").unwrap();
        let config = make_config("ollama", "", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, spec, "llama3.1");

        let resp = provider
            .complete("hi", "llama3.1", &LlmRequestConfig::default())
            .await;
        assert_eq!(resp.into_text(), "ok");
    }

    #[tokio::test]
    async fn test_chat_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "message": "Rate limit exceeded" }
            })))
            .mount(&mock_server)
            .await;

        let spec = find_by_name("openai").unwrap();
        let config = make_config("openai", "key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, spec, "gpt-4o");

        let resp = provider
            .chat(&[Message::user("Hello")], "gpt-4o", &LlmRequestConfig::default())
            .await;

        assert!(resp.is_error());
        let content = resp.into_text();
        assert!(content.contains("Error calling LLM"));
        assert!(content.contains("429"));
    }

    #[tokio::test]
    async fn test_chat_network_error() {
        let spec = find_by_name("ollama").unwrap();
        let config = make_config("ollama", "", Some("http://127.0.0.1:1"));
        let provider = HttpProvider::new(&config, spec, "llama3.1");

        let resp = provider
            .complete("Hello", "llama3.1", &LlmRequestConfig::default())
            .await;

        assert!(resp.into_text().contains("Error calling LLM"));
    }

    #[tokio::test]
    async fn test_chat_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let spec = find_by_name("ollama").unwrap();
        let config = make_config("ollama", "", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, spec, "llama3.1");

        let resp = provider
            .complete("Hello", "llama3.1", &LlmRequestConfig::default())
            .await;

        assert!(resp.is_error());
        assert!(resp.into_text().contains("Error parsing LLM response"));
    }
}

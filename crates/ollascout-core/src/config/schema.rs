//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProviderConfig`, `ToolsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default number of model ↔ tool steps per question.
pub const DEFAULT_MAX_STEPS: usize = 4;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.ollascout/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub provider: ProviderConfig,
    pub tools: ToolsConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Agent loop settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Step bound: the loop body runs at most this many times before finalizing.
    pub max_steps: usize,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "llama3.1".to_string(),
            max_steps: DEFAULT_MAX_STEPS,
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Connection settings for the LLM provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// Provider name from the provider table (e.g. `"ollama"`, `"openai"`).
    pub name: String,
    /// API key for authentication. Falls back to the provider's env var when empty.
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "ollama".to_string(),
            api_key: String::new(),
            api_base: None,
            extra_headers: None,
        }
    }
}

impl ProviderConfig {
    /// Whether an API key is set in the config itself.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Settings for the built-in Ollama library tools.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    /// Base URL of the Ollama model library site.
    pub ollama_base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum number of models returned by a search.
    pub max_search_results: usize,
    /// Directory where `--save` writes scraped results.
    pub output_dir: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: "https://ollama.com".to_string(),
            timeout_secs: 10,
            max_search_results: 5,
            output_dir: "~/.ollascout/results".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.agent.max_steps, 4);
        assert_eq!(config.provider.name, "ollama");
        assert!(!config.provider.has_api_key());
        assert_eq!(config.tools.max_search_results, 5);
        assert_eq!(config.tools.timeout_secs, 10);
    }

    #[test]
    fn test_camel_case_round_trip() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json["agent"].get("maxSteps").is_some());
        assert!(json["tools"].get("ollamaBaseUrl").is_some());
        assert!(json["provider"].get("apiBase").is_none());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"agent": {"model": "qwen2.5"}}"#).unwrap();
        assert_eq!(config.agent.model, "qwen2.5");
        assert_eq!(config.agent.max_steps, DEFAULT_MAX_STEPS);
        assert_eq!(config.tools.ollama_base_url, "https://ollama.com");
    }
}

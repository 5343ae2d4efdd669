//! Provider registry — static specs for the supported LLM backends.
//!
//! Each `ProviderSpec` describes how to reach one OpenAI-compatible API:
//! default base URL, the env var holding its key, and whether a key is needed.

use ollascout_core::config::ProviderConfig;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static description of one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"ollama"`), matched against `provider.name` in config.
    pub name: &'static str,
    /// Environment variable for the API key. E.g. `"OPENROUTER_API_KEY"`.
    pub env_key: &'static str,
    /// Human-readable name for logs.
    pub display_name: &'static str,
    /// Default API base URL, up to (not including) `/chat/completions`.
    pub default_api_base: &'static str,
    /// Whether this is a local/self-hosted server that accepts unauthenticated requests.
    pub is_local: bool,
}

/// Supported providers. The first entry is the default.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "ollama",
        env_key: "OLLAMA_API_KEY",
        display_name: "Ollama",
        default_api_base: "http://localhost:11434/v1",
        is_local: true,
    },
    ProviderSpec {
        name: "openai",
        env_key: "OPENAI_API_KEY",
        display_name: "OpenAI",
        default_api_base: "https://api.openai.com/v1",
        is_local: false,
    },
    ProviderSpec {
        name: "openrouter",
        env_key: "OPENROUTER_API_KEY",
        display_name: "OpenRouter",
        default_api_base: "https://openrouter.ai/api/v1",
        is_local: false,
    },
    ProviderSpec {
        name: "groq",
        env_key: "GROQ_API_KEY",
        display_name: "Groq",
        default_api_base: "https://api.groq.com/openai/v1",
        is_local: false,
    },
    ProviderSpec {
        name: "deepseek",
        env_key: "DEEPSEEK_API_KEY",
        display_name: "DeepSeek",
        default_api_base: "https://api.deepseek.com/v1",
        is_local: false,
    },
];

// ─────────────────────────────────────────────
// Lookup
// ─────────────────────────────────────────────

/// Find a provider spec by exact name (case-insensitive).
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    let name = name.trim().to_lowercase();
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Resolve the API key: config first, then the provider's env var.
pub fn resolve_api_key(config: &ProviderConfig, spec: &ProviderSpec) -> Option<String> {
    if config.has_api_key() {
        return Some(config.api_key.clone());
    }
    std::env::var(spec.env_key).ok().filter(|k| !k.is_empty())
}

/// Resolve the API base: config override, then the provider default.
pub fn resolve_api_base(config: &ProviderConfig, spec: &ProviderSpec) -> String {
    config
        .api_base
        .clone()
        .unwrap_or_else(|| spec.default_api_base.to_string())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

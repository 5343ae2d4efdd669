//! Config loader — reads `~/.ollascout/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.ollascout/config.json`
//! 3. Environment variables `OLLASCOUT_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `OLLASCOUT_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `OLLASCOUT_AGENT__MODEL`, `OLLASCOUT_AGENT__MAX_STEPS`,
///   `OLLASCOUT_AGENT__MAX_TOKENS`, `OLLASCOUT_AGENT__TEMPERATURE`
/// - `OLLASCOUT_PROVIDER__NAME`, `OLLASCOUT_PROVIDER__API_KEY`,
///   `OLLASCOUT_PROVIDER__API_BASE`
/// - `OLLASCOUT_TOOLS__OLLAMA_BASE_URL`, `OLLASCOUT_TOOLS__TIMEOUT_SECS`,
///   `OLLASCOUT_TOOLS__OUTPUT_DIR`
fn apply_env_overrides(mut config: Config) -> Config {
    // Agent
    if let Ok(val) = std::env::var("OLLASCOUT_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Ok(val) = std::env::var("OLLASCOUT_AGENT__MAX_STEPS") {
        if let Ok(n) = val.parse::<usize>() {
            config.agent.max_steps = n;
        }
    }
    if let Ok(val) = std::env::var("OLLASCOUT_AGENT__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.agent.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("OLLASCOUT_AGENT__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.agent.temperature = t;
        }
    }

    // Provider
    if let Ok(val) = std::env::var("OLLASCOUT_PROVIDER__NAME") {
        config.provider.name = val;
    }
    if let Ok(val) = std::env::var("OLLASCOUT_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Ok(val) = std::env::var("OLLASCOUT_PROVIDER__API_BASE") {
        config.provider.api_base = Some(val);
    }

    // Tools
    if let Ok(val) = std::env::var("OLLASCOUT_TOOLS__OLLAMA_BASE_URL") {
        config.tools.ollama_base_url = val;
    }
    if let Ok(val) = std::env::var("OLLASCOUT_TOOLS__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.tools.timeout_secs = n;
        }
    }
    if let Ok(val) = std::env::var("OLLASCOUT_TOOLS__OUTPUT_DIR") {
        config.tools.output_dir = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.agent.max_tokens, 2048);
        assert_eq!(config.tools.max_search_results, 5);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "agent": {
                "maxSteps": 6,
                "maxTokens": 1024
            },
            "provider": {
                "name": "openrouter",
                "apiBase": "https://proxy.example/v1"
            }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.agent.max_steps, 6);
        assert_eq!(config.agent.max_tokens, 1024);
        assert_eq!(config.provider.name, "openrouter");
        assert_eq!(
            config.provider.api_base.as_deref(),
            Some("https://proxy.example/v1")
        );
        // Default preserved
        assert_eq!(config.agent.temperature, 0.2);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.agent.max_tokens, 2048);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.agent.max_steps = 2;
        config.provider.api_key = "sk-test".to_string();

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert_eq!(reloaded.agent.max_steps, 2);
        assert_eq!(reloaded.provider.api_key, "sk-test");
    }

    #[test]
    fn test_env_override_max_steps() {
        std::env::set_var("OLLASCOUT_AGENT__MAX_STEPS", "7");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.agent.max_steps, 7);
        std::env::remove_var("OLLASCOUT_AGENT__MAX_STEPS");
    }

    #[test]
    fn test_env_override_ignores_unparseable() {
        std::env::set_var("OLLASCOUT_TOOLS__TIMEOUT_SECS", "soon");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.tools.timeout_secs, 10);
        std::env::remove_var("OLLASCOUT_TOOLS__TIMEOUT_SECS");
    }
}

//! Config loader — reads `~/.agentrelay/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.agentrelay/config.json`
//! 3. Environment variables `AGENTRELAY_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default path) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
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
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `AGENTRELAY_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `AGENTRELAY_AGENT__MODEL`
/// - `AGENTRELAY_AGENT__MAX_TOKENS`
/// - `AGENTRELAY_AGENT__TEMPERATURE`
/// - `AGENTRELAY_AGENT__MAX_TOOL_ITERATIONS`
/// - `AGENTRELAY_AGENT__PARALLEL_TOOL_CALLS`
/// - `AGENTRELAY_AGENT__SUMMARIZE_TOOLS`
/// - `AGENTRELAY_AGENT__SYSTEM_PROMPT`
/// - `AGENTRELAY_PROVIDER__API_KEY`
/// - `AGENTRELAY_PROVIDER__API_BASE`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("AGENTRELAY_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Ok(val) = std::env::var("AGENTRELAY_AGENT__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.agent.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("AGENTRELAY_AGENT__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.agent.temperature = t;
        }
    }
    if let Ok(val) = std::env::var("AGENTRELAY_AGENT__MAX_TOOL_ITERATIONS") {
        if let Ok(n) = val.parse::<u32>() {
            config.agent.max_tool_iterations = n;
        }
    }
    if let Ok(val) = std::env::var("AGENTRELAY_AGENT__PARALLEL_TOOL_CALLS") {
        config.agent.parallel_tool_calls = val == "true" || val == "1";
    }
    if let Ok(val) = std::env::var("AGENTRELAY_AGENT__SUMMARIZE_TOOLS") {
        config.agent.summarize_tools = val == "true" || val == "1";
    }
    if let Ok(val) = std::env::var("AGENTRELAY_AGENT__SYSTEM_PROMPT") {
        config.agent.system_prompt = Some(val);
    }

    if let Ok(val) = std::env::var("AGENTRELAY_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Ok(val) = std::env::var("AGENTRELAY_PROVIDER__API_BASE") {
        config.provider.api_base = Some(val);
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

//! Config loader: reads `~/.wayfarer/config.json`, merges env vars, and
//! applies legacy migrations.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.wayfarer/config.json`
//! 3. Environment variables `WAYFARER_<SECTION>__<FIELD>` (override JSON)

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
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return Config::default();
        }
    };

    migrate_config(&mut raw);

    match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            Config::default()
        }
    }
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

/// Apply legacy config migrations.
///
/// Renames `agent.maxIterations` → `agent.maxSteps`.
fn migrate_config(raw: &mut serde_json::Value) {
    if let Some(agent) = raw.get_mut("agent").and_then(|a| a.as_object_mut()) {
        if !agent.contains_key("maxSteps") {
            if let Some(old) = agent.remove("maxIterations") {
                agent.insert("maxSteps".to_string(), old);
                debug!("Migrated agent.maxIterations → agent.maxSteps");
            }
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `WAYFARER_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `WAYFARER_AGENT__MODEL`, `__MAX_TOKENS`, `__TEMPERATURE`, `__MAX_STEPS`,
///   `__MAX_MESSAGES`, `__TERMINATE_TOOL`
/// - `WAYFARER_PROVIDER__API_KEY`, `WAYFARER_PROVIDER__API_BASE`
/// - `WAYFARER_TOOLS__WORKSPACE`, `__RESTRICT_TO_WORKSPACE`, `__CATALOG_PATH`
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_with(config, |key| std::env::var(key).ok())
}

/// Same as [`apply_env_overrides`] with a pluggable variable lookup.
fn apply_overrides_with(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    // Agent
    if let Some(val) = lookup("WAYFARER_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Some(n) = parse_var(&lookup, "WAYFARER_AGENT__MAX_TOKENS") {
        config.agent.max_tokens = n;
    }
    if let Some(t) = parse_var(&lookup, "WAYFARER_AGENT__TEMPERATURE") {
        config.agent.temperature = t;
    }
    if let Some(n) = parse_var(&lookup, "WAYFARER_AGENT__MAX_STEPS") {
        config.agent.max_steps = n;
    }
    if let Some(n) = parse_var(&lookup, "WAYFARER_AGENT__MAX_MESSAGES") {
        config.agent.max_messages = n;
    }
    if let Some(val) = lookup("WAYFARER_AGENT__TERMINATE_TOOL") {
        config.agent.terminate_tool = val;
    }

    // Provider
    if let Some(val) = lookup("WAYFARER_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Some(val) = lookup("WAYFARER_PROVIDER__API_BASE") {
        config.provider.api_base = Some(val);
    }

    // Tools
    if let Some(val) = lookup("WAYFARER_TOOLS__WORKSPACE") {
        config.tools.workspace = val;
    }
    if let Some(val) = lookup("WAYFARER_TOOLS__RESTRICT_TO_WORKSPACE") {
        config.tools.restrict_to_workspace = val == "true" || val == "1";
    }
    if let Some(val) = lookup("WAYFARER_TOOLS__CATALOG_PATH") {
        config.tools.catalog_path = Some(val);
    }

    config
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = key, value = %raw, "ignoring unparsable env override");
            None
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

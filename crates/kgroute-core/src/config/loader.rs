//! Config loader — reads `~/.kgroute/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.kgroute/config.json`
//! 3. Environment variables `KGROUTE_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderKind};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
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

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON {}: {}", path.display(), e);
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

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `KGROUTE_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `KGROUTE_KNOWLEDGE__ENABLE` → `knowledge.enable` (`true`/`1`)
/// - `KGROUTE_KNOWLEDGE__PROVIDER` → `knowledge.provider`
/// - `KGROUTE_KNOWLEDGE__ID` → `knowledge.id`
/// - `KGROUTE_KNOWLEDGE__KEY` → `knowledge.key`
/// - `KGROUTE_KNOWLEDGE__MODEL` → `knowledge.model`
/// - `KGROUTE_KNOWLEDGE__API_BASE` → `knowledge.api_base`
/// - `KGROUTE_KNOWLEDGE__TIMEOUT_SECS` → `knowledge.timeout_secs`
/// - `KGROUTE_TRANSCRIPTION__API_KEY` → `transcription.api_key`
/// - `KGROUTE_TRANSCRIPTION__API_URL` → `transcription.api_url`
/// - `KGROUTE_TRANSCRIPTION__MODEL` → `transcription.model`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |name| std::env::var(name).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    let knowledge = &mut config.knowledge;
    if let Some(val) = var("KGROUTE_KNOWLEDGE__ENABLE") {
        knowledge.enable = val == "true" || val == "1";
    }
    if let Some(val) = var("KGROUTE_KNOWLEDGE__PROVIDER") {
        knowledge.provider = ProviderKind::parse(&val);
    }
    if let Some(val) = var("KGROUTE_KNOWLEDGE__ID") {
        knowledge.id = val;
    }
    if let Some(val) = var("KGROUTE_KNOWLEDGE__KEY") {
        knowledge.key = val;
    }
    if let Some(val) = var("KGROUTE_KNOWLEDGE__MODEL") {
        knowledge.model = val;
    }
    if let Some(val) = var("KGROUTE_KNOWLEDGE__API_BASE") {
        knowledge.api_base = Some(val);
    }
    if let Some(val) = var("KGROUTE_KNOWLEDGE__TIMEOUT_SECS") {
        match val.parse::<u64>() {
            Ok(secs) => knowledge.timeout_secs = secs,
            Err(_) => warn!("Ignoring invalid KGROUTE_KNOWLEDGE__TIMEOUT_SECS={val}"),
        }
    }

    let transcription = &mut config.transcription;
    if let Some(val) = var("KGROUTE_TRANSCRIPTION__API_KEY") {
        transcription.api_key = val;
    }
    if let Some(val) = var("KGROUTE_TRANSCRIPTION__API_URL") {
        transcription.api_url = val;
    }
    if let Some(val) = var("KGROUTE_TRANSCRIPTION__MODEL") {
        transcription.model = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

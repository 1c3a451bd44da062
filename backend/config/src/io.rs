//! Config file location and loading.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Env var naming an explicit config file.
pub const ENV_CONFIG_PATH: &str = "FRAMEGRAB_CONFIG";

/// Resolve the framegrab config directory: `<config_dir>/framegrab`, or
/// `./.framegrab` when the platform has no config directory.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("framegrab"))
        .unwrap_or_else(|| PathBuf::from(".framegrab"))
}

/// Resolve the config file to load.
/// Priority: explicit path > `FRAMEGRAB_CONFIG` > `<config_dir>/config.yaml`.
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    config_dir().join(CONFIG_FILE_NAME)
}

/// Load the config file as an untyped value tree, ready for `${VAR}`
/// substitution.
///
/// Returns an empty mapping if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<Value> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    // An empty file parses as null.
    Ok(if value.is_null() { Value::Object(Default::default()) } else { value })
}

//! `framegrab-config`: framegrab runtime configuration.
//!
//! Provides:
//! - Typed config schema with per-field defaults
//! - YAML loading from an explicit path, `FRAMEGRAB_CONFIG`, or the user config dir
//! - `${ENV_VAR}` substitution and fixed env overrides
//! - Config redaction for safe display
//! - Range validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides_with, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config};
pub use redact::redact;
pub use schema::{FlowConfig, FramegrabConfig, LoggingConfig, MediaConfig, SessionsConfig, TelegramConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env vars, apply overrides and defaults, and validate a
/// config file.
///
/// This is the main entry point for loading a config at runtime. The report
/// is returned rather than logged so callers can install logging first.
pub async fn load_and_prepare(path: &Path) -> Result<(FramegrabConfig, ValidationReport)> {
    let raw = load_config(path).await?;
    let env: HashMap<String, String> = std::env::vars().collect();
    prepare(&raw, &env).with_context(|| format!("Failed to prepare config from {}", path.display()))
}

/// The pure part of [`load_and_prepare`], with the environment passed in.
pub fn prepare(raw: &Value, env: &HashMap<String, String>) -> Result<(FramegrabConfig, ValidationReport)> {
    let value = resolve_env_vars_with(raw, env)?;
    let config: FramegrabConfig =
        serde_json::from_value(value).context("Failed to deserialize config after env substitution")?;
    let config = apply_env_overrides_with(config, env);
    let config = apply_all_defaults(config);
    let report = validate(&config);
    Ok((config, report))
}

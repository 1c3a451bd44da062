//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside string values, resolved at load time
//!   (only uppercase `[A-Z_][A-Z0-9_]*` names; `$${VAR}` escapes to a
//!   literal `${VAR}`).
//! - A fixed set of override variables applied after parsing.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use crate::schema::FramegrabConfig;

/// `${VAR}` with an optional leading `$` marking an escape.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_FFMPEG: &str = "FRAMEGRAB_FFMPEG";
pub const ENV_FFPROBE: &str = "FRAMEGRAB_FFPROBE";
pub const ENV_WORK_DIR: &str = "FRAMEGRAB_WORK_DIR";
pub const ENV_LOG_LEVEL: &str = "FRAMEGRAB_LOG_LEVEL";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config value tree using the given
/// environment.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    Ok(substitute_value(value, env, "")?)
}

fn substitute_value(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in ENV_VAR_PATTERN.captures_iter(s) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        out.push_str(&s[last..whole.start]);
        last = whole.end;

        let name = &caps[2];
        if !caps[1].is_empty() {
            out.push_str(&format!("${{{name}}}"));
            continue;
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => out.push_str(val),
            _ => {
                return Err(MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
            }
        }
    }
    out.push_str(&s[last..]);
    Ok(out)
}

/// Apply the fixed override variables from `env`. Empty values are ignored.
pub fn apply_env_overrides_with(
    mut config: FramegrabConfig,
    env: &HashMap<String, String>,
) -> FramegrabConfig {
    let get = |name: &str| env.get(name).filter(|v| !v.trim().is_empty()).cloned();

    if let Some(token) = get(ENV_BOT_TOKEN) {
        debug!(var = ENV_BOT_TOKEN, "Bot token taken from environment");
        config.telegram.bot_token = Some(token);
    }
    if let Some(path) = get(ENV_FFMPEG) {
        config.media.ffmpeg_path = PathBuf::from(path);
    }
    if let Some(path) = get(ENV_FFPROBE) {
        config.media.ffprobe_path = PathBuf::from(path);
    }
    if let Some(dir) = get(ENV_WORK_DIR) {
        config.media.work_dir = Some(PathBuf::from(dir));
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    config
}

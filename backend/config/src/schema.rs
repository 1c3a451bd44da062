//! framegrab runtime configuration schema.
//!
//! Every section is optional in the YAML file; missing sections and fields
//! take the values from [`crate::defaults`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::defaults::*;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FramegrabConfig {
    /// Telegram bot settings
    pub telegram: TelegramConfig,

    /// ffmpeg / ffprobe invocation
    pub media: MediaConfig,

    /// Conversational flow limits
    pub flow: FlowConfig,

    /// Session file-path table
    pub sessions: SessionsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Telegram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelegramConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    pub download_dir: PathBuf,
    pub random_presets: Vec<u32>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            random_presets: DEFAULT_RANDOM_PRESETS.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    /// Filled in by [`crate::defaults::apply_all_defaults`] when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
    /// ffmpeg `-q:v`, 2 (best) to 31.
    pub jpeg_quality: u8,
    pub extraction_timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            work_dir: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            extraction_timeout_secs: DEFAULT_EXTRACTION_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowConfig {
    pub reply_timeout_secs: u64,
    pub media_group_size: usize,
    pub invalid_preview: usize,
    pub error_max_chars: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            reply_timeout_secs: DEFAULT_REPLY_TIMEOUT_SECS,
            media_group_size: MAX_MEDIA_GROUP_SIZE,
            invalid_preview: DEFAULT_INVALID_PREVIEW,
            error_max_chars: DEFAULT_ERROR_MAX_CHARS,
        }
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionsConfig {
    pub ttl_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self { ttl_secs: DEFAULT_SESSION_TTL_SECS }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
    /// JSON lines on the console instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            json: false,
        }
    }
}

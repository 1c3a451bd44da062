//! Config defaults: constants for every tunable, plus the values that can
//! only be decided at load time.

use std::path::PathBuf;

use crate::schema::FramegrabConfig;

pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

pub const DEFAULT_RANDOM_PRESETS: [u32; 4] = [5, 10, 15, 20];

/// ffmpeg `-q:v` for extracted JPEGs.
pub const DEFAULT_JPEG_QUALITY: u8 = 2;

pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 120;

/// Telegram albums hold at most ten items.
pub const MAX_MEDIA_GROUP_SIZE: usize = 10;

pub const DEFAULT_INVALID_PREVIEW: usize = 3;

pub const DEFAULT_ERROR_MAX_CHARS: usize = 200;

/// Keeps an error status inside Telegram's 4096-character message limit.
pub const MAX_ERROR_CHARS: usize = 4000;

pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_LOG_DIR: &str = "logs";

/// Work directory used when none is configured.
pub fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("framegrab")
}

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: FramegrabConfig) -> FramegrabConfig {
    let config = apply_media_defaults(config);
    apply_telegram_defaults(config)
}

fn apply_media_defaults(mut config: FramegrabConfig) -> FramegrabConfig {
    if config.media.work_dir.is_none() {
        config.media.work_dir = Some(default_work_dir());
    }
    config
}

/// A blank token is the same as no token.
fn apply_telegram_defaults(mut config: FramegrabConfig) -> FramegrabConfig {
    if config.telegram.bot_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
        config.telegram.bot_token = None;
    }
    config
}

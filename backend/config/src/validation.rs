//! Config validation: range checks with user-friendly error messages.

use crate::defaults::{MAX_ERROR_CHARS, MAX_MEDIA_GROUP_SIZE};
use crate::schema::FramegrabConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Log every finding at the matching level.
    pub fn log(&self) {
        for warning in &self.warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
        for error in &self.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
    }

    /// Fail with the first error, if any.
    pub fn ensure_valid(&self) -> anyhow::Result<()> {
        match self.errors.first() {
            None => Ok(()),
            Some(first) => anyhow::bail!("{first} ({} error(s) total)", self.errors.len()),
        }
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &FramegrabConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_telegram(config, &mut report);
    validate_media(config, &mut report);
    validate_flow(config, &mut report);
    validate_sessions(config, &mut report);
    report
}

fn validate_telegram(config: &FramegrabConfig, report: &mut ValidationReport) {
    let tg = &config.telegram;
    if tg.bot_token.is_none() {
        report.warn(
            "telegram.botToken",
            "No bot token configured; `serve` needs one (or TELEGRAM_BOT_TOKEN)",
        );
    }
    if tg.random_presets.is_empty() {
        report.error("telegram.randomPresets", "At least one preset is required");
    }
    if tg.random_presets.contains(&0) {
        report.error("telegram.randomPresets", "Presets must be >= 1");
    }
}

fn validate_media(config: &FramegrabConfig, report: &mut ValidationReport) {
    let media = &config.media;
    if !(2..=31).contains(&media.jpeg_quality) {
        report.error(
            "media.jpegQuality",
            format!("jpegQuality {} is outside 2..=31", media.jpeg_quality),
        );
    }
    if media.extraction_timeout_secs == 0 {
        report.error("media.extractionTimeoutSecs", "extractionTimeoutSecs must be > 0");
    }
}

fn validate_flow(config: &FramegrabConfig, report: &mut ValidationReport) {
    let flow = &config.flow;
    if flow.reply_timeout_secs == 0 {
        report.error("flow.replyTimeoutSecs", "replyTimeoutSecs must be > 0");
    }
    if !(1..=MAX_MEDIA_GROUP_SIZE).contains(&flow.media_group_size) {
        report.error(
            "flow.mediaGroupSize",
            format!("mediaGroupSize must be between 1 and {MAX_MEDIA_GROUP_SIZE}"),
        );
    }
    if flow.invalid_preview == 0 {
        report.error("flow.invalidPreview", "invalidPreview must be >= 1");
    }
    if !(1..=MAX_ERROR_CHARS).contains(&flow.error_max_chars) {
        report.error(
            "flow.errorMaxChars",
            format!("errorMaxChars must be between 1 and {MAX_ERROR_CHARS}"),
        );
    }
}

fn validate_sessions(config: &FramegrabConfig, report: &mut ValidationReport) {
    if config.sessions.ttl_secs == 0 {
        report.error("sessions.ttlSecs", "ttlSecs must be > 0");
    }
}

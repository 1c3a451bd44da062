//! Wiring from the loaded configuration to runtime components.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use framegrab_channels::TelegramSettings;
use framegrab_commands::{FlowSettings, ScreenshotService};
use framegrab_config::FramegrabConfig;
use framegrab_core::FilePathTable;
use media::{FfmpegExtractor, FfprobeDuration};

pub fn work_dir(config: &FramegrabConfig) -> PathBuf {
    config
        .media
        .work_dir
        .clone()
        .unwrap_or_else(framegrab_config::defaults::default_work_dir)
}

pub fn flow_settings(config: &FramegrabConfig) -> FlowSettings {
    FlowSettings {
        reply_timeout: Duration::from_secs(config.flow.reply_timeout_secs),
        media_group_size: config.flow.media_group_size,
        invalid_preview: config.flow.invalid_preview,
        error_max_chars: config.flow.error_max_chars,
    }
}

pub fn telegram_settings(config: &FramegrabConfig) -> TelegramSettings {
    TelegramSettings {
        download_dir: config.telegram.download_dir.clone(),
        random_presets: config.telegram.random_presets.clone(),
    }
}

pub fn probe(config: &FramegrabConfig) -> FfprobeDuration {
    FfprobeDuration::new(&config.media.ffprobe_path)
}

pub fn extractor(config: &FramegrabConfig) -> FfmpegExtractor {
    FfmpegExtractor::new(&config.media.ffmpeg_path, work_dir(config))
        .with_quality(config.media.jpeg_quality)
        .with_timeout(Duration::from_secs(config.media.extraction_timeout_secs))
}

/// The screenshot service every surface drives.
pub fn build_service(config: &FramegrabConfig) -> ScreenshotService {
    ScreenshotService::new(
        Arc::new(probe(config)),
        Arc::new(extractor(config)),
        FilePathTable::new(Duration::from_secs(config.sessions.ttl_secs)),
        flow_settings(config),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_settings_follow_config() {
        let mut cfg = FramegrabConfig::default();
        cfg.flow.reply_timeout_secs = 45;
        cfg.flow.media_group_size = 4;
        let settings = flow_settings(&cfg);
        assert_eq!(settings.reply_timeout, Duration::from_secs(45));
        assert_eq!(settings.media_group_size, 4);
        assert_eq!(settings.invalid_preview, 3);
        assert_eq!(settings.error_max_chars, 200);
    }

    #[test]
    fn service_uses_configured_ttl_and_work_dir() {
        let mut cfg = FramegrabConfig::default();
        cfg.sessions.ttl_secs = 90;
        cfg.media.work_dir = Some(PathBuf::from("/tmp/fg-work"));
        let service = build_service(&cfg);
        assert_eq!(service.sessions().ttl(), Duration::from_secs(90));
        assert_eq!(extractor(&cfg).work_dir(), std::path::Path::new("/tmp/fg-work"));
    }

    #[test]
    fn telegram_settings_copy_presets() {
        let cfg = FramegrabConfig::default();
        assert_eq!(telegram_settings(&cfg).random_presets, vec![5, 10, 15, 20]);
    }
}

//! Structured Logger
//!
//! Console output plus a daily rolling NDJSON file, with `RUST_LOG`
//! taking precedence over the configured level.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps the background file writer alive; flushes on drop.
pub struct LoggerGuard {
    _file: WorkerGuard,
}

/// Initialize the global logger. Hold the returned guard for the lifetime
/// of the process.
///
/// `json_console` switches the console layer to JSON as well, for running
/// under a log collector.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str, json_console: bool) -> LoggerGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // `logs/framegrab.log.YYYY-MM-DD`
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "framegrab.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(file_writer).with_ansi(false);

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);

    let _ = if json_console {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(true),
            )
            .try_init()
    };

    LoggerGuard { _file: file_guard }
}

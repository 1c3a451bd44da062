mod config;
mod console;
mod doctor_cmd;
mod terminal_output;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use framegrab_channels::{ChannelAdapter, TelegramAdapter};
use framegrab_config::FramegrabConfig;
use framegrab_core::{DurationProbe, Timestamp};

use console::ConsoleConversation;
use terminal_output::{note_error, note_success, note_warn};

#[derive(Parser)]
#[command(name = "framegrab")]
#[command(about = "framegrab: video screenshots on demand, in chat or in the terminal")]
#[command(version)]
struct Cli {
    /// Config file (default: $FRAMEGRAB_CONFIG or <config dir>/framegrab/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Serve,
    /// Print a video's duration
    Probe {
        file: PathBuf,
    },
    /// Grab screenshots from a local video
    Grab {
        file: PathBuf,
        /// Comma-separated timestamps, e.g. "00:01:23, 01:23, 45"
        #[arg(long, conflicts_with = "random")]
        at: Option<String>,
        /// Number of random screenshots
        #[arg(long)]
        random: Option<u32>,
        /// Directory the screenshots are copied into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Print the effective configuration with secrets redacted
    Config,
    /// Check ffmpeg, ffprobe and directories
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = framegrab_config::config_file_path(cli.config.as_deref());
    let (config, report) = framegrab_config::load_and_prepare(&config_path).await?;

    // Initialize structured logging
    let _log_guard = logging::init_logger(
        &config.logging.dir,
        &config.logging.level,
        config.logging.json,
    );
    report.log();
    report.ensure_valid()?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Probe { file } => probe(&config, &file).await?,
        Commands::Grab { file, at, random, out } => grab(&config, &file, at, random, out).await?,
        Commands::Config => print_config(&config, &config_path)?,
        Commands::Doctor => {
            if !doctor_cmd::run(&config).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn serve(config: FramegrabConfig) -> Result<()> {
    let Some(token) = config.telegram.bot_token.clone() else {
        bail!("No Telegram bot token: set telegram.botToken or TELEGRAM_BOT_TOKEN");
    };

    info!(
        work_dir = %config::work_dir(&config).display(),
        ttl_secs = config.sessions.ttl_secs,
        "Starting framegrab bot"
    );

    let service = Arc::new(config::build_service(&config));
    let adapter = TelegramAdapter::new(token, service, config::telegram_settings(&config));
    info!(adapter = adapter.name(), "Channel adapter ready");
    adapter.start().await
}

async fn probe(config: &FramegrabConfig, file: &Path) -> Result<()> {
    let seconds = config::probe(config)
        .duration(file)
        .await
        .with_context(|| format!("probing {}", file.display()))?;
    println!("{seconds:.3}s ({})", Timestamp::hms_from_secs_f64(seconds));
    Ok(())
}

async fn grab(
    config: &FramegrabConfig,
    file: &Path,
    at: Option<String>,
    random: Option<u32>,
    out: PathBuf,
) -> Result<()> {
    if !file.is_file() {
        bail!("{} is not a file", file.display());
    }
    let mime = media::detect_mime_type(file);
    if !media::is_video(mime) {
        note_warn(&format!("{} does not look like a video ({mime}); trying anyway", file.display()));
    }

    let service = config::build_service(config);
    let interactive = std::io::stdin().is_terminal();
    let conv = ConsoleConversation::new(&out, at, interactive);

    match random {
        Some(count) => {
            let session_id = service.sessions().register(file).await;
            service.random_screenshots(&conv, count, session_id).await;
        }
        None => service.custom_screenshots(&conv, file).await,
    }

    if conv.saved() > 0 {
        note_success(&format!("{} screenshot(s) saved to {}", conv.saved(), out.display()));
    } else {
        note_error("No screenshots saved");
    }
    Ok(())
}

fn print_config(config: &FramegrabConfig, path: &Path) -> Result<()> {
    let value = serde_json::to_value(config).context("serializing config")?;
    let yaml = serde_yaml::to_string(&framegrab_config::redact(&value)).context("rendering config")?;
    println!("# {}", path.display());
    print!("{yaml}");
    Ok(())
}

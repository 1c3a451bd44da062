//! CLI Doctor Command
//!
//! Checks that the external tools and directories framegrab relies on are
//! usable with the current configuration.

use std::path::Path;

use anyhow::Result;
use framegrab_config::FramegrabConfig;
use tokio::process::Command;

use crate::config::work_dir;

/// Executes the full doctor diagnosis. Returns whether every required check
/// passed.
pub async fn run(config: &FramegrabConfig) -> Result<bool> {
    println!("\n🔍 Running framegrab doctor...\n");

    let mut ok = true;
    println!("Checking external tools:");
    ok &= check_tool("ffmpeg", &config.media.ffmpeg_path).await;
    ok &= check_tool("ffprobe", &config.media.ffprobe_path).await;

    println!("Checking directories:");
    ok &= check_dir("work dir", &work_dir(config)).await;
    ok &= check_dir("download dir", &config.telegram.download_dir).await;

    println!("Checking Telegram:");
    if config.telegram.bot_token.is_some() {
        println!("  🟢 bot token is set");
    } else {
        println!("  🟡 bot token is missing (needed for `serve` only)");
    }

    println!();
    if ok {
        println!("✅ All checks passed! framegrab is ready.");
    } else {
        println!("❌ Some checks failed! Please fix the errors above.");
    }
    Ok(ok)
}

async fn check_tool(name: &str, path: &Path) -> bool {
    match Command::new(path).arg("-version").output().await {
        Ok(out) if out.status.success() => {
            let first = String::from_utf8_lossy(&out.stdout);
            let version = first.lines().next().unwrap_or("").trim().to_string();
            println!("  🟢 {name}: {version}");
            true
        }
        Ok(out) => {
            println!("  🔴 {name} at {} exited with {}", path.display(), out.status);
            false
        }
        Err(e) => {
            println!("  🔴 {name} not runnable at {}: {e}", path.display());
            false
        }
    }
}

async fn check_dir(label: &str, dir: &Path) -> bool {
    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => {
            println!("  🟢 {label} {} is usable", dir.display());
            true
        }
        Err(e) => {
            println!("  🔴 {label} {} cannot be created: {e}", dir.display());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_tool_fails_check() {
        assert!(!check_tool("ffmpeg", Path::new("/nonexistent/framegrab/ffmpeg")).await);
    }

    #[tokio::test]
    async fn creatable_dir_passes_check() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_dir("work dir", &dir.path().join("a/b")).await);
    }
}

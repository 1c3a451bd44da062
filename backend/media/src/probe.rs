use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use framegrab_core::{DurationProbe, GrabError};
use tokio::process::Command;
use tracing::{debug, warn};

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Duration lookup via `ffprobe`.
///
/// The first video stream's duration is preferred over the container's, which
/// runs past the last frame when the audio track is longer.
pub struct FfprobeDuration {
    ffprobe: PathBuf,
}

impl FfprobeDuration {
    pub fn new(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }
}

impl Default for FfprobeDuration {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl DurationProbe for FfprobeDuration {
    async fn duration(&self, source: &Path) -> Result<f64, GrabError> {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "error"])
            .args(["-select_streams", "v:0"])
            .args(["-show_entries", "stream=duration:format=duration"])
            .args(["-of", "compact"])
            .arg(source)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(PROBE_TIMEOUT, cmd.output())
            .await
            .map_err(|_| GrabError::DurationUnavailable("ffprobe timed out".into()))?
            .map_err(|e| GrabError::DurationUnavailable(format!("Failed to run ffprobe: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(source = %source.display(), stderr = %stderr.trim(), "ffprobe failed");
            return Err(GrabError::DurationUnavailable(format!(
                "ffprobe failed: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let duration = parse_duration(&stdout).ok_or_else(|| {
            GrabError::DurationUnavailable(format!("ffprobe: could not parse duration {:?}", stdout.trim()))
        })?;
        debug!(source = %source.display(), duration, "Probed duration");
        Ok(duration)
    }
}

/// Parse ffprobe's compact output (`stream|duration=..` and
/// `format|duration=..` lines). The stream value wins when usable; `N/A`,
/// zero, negative and non-finite values are rejected.
pub fn parse_duration(stdout: &str) -> Option<f64> {
    let section = |name: &str| {
        stdout.lines().find_map(|line| {
            let value = line.trim().strip_prefix(name)?.strip_prefix("|duration=")?;
            let value: f64 = value.parse().ok()?;
            (value.is_finite() && value > 0.0).then_some(value)
        })
    };
    section("stream").or_else(|| section("format"))
}

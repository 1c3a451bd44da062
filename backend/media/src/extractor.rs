//! Batch frame extraction with a single ffmpeg invocation.
//!
//! All requested timestamps go into one `select` filter. Frames are written
//! into a throwaway scratch directory named by their presentation time in
//! milliseconds (`frame_<ms>.jpg`), paired back to the requested timestamps
//! by value, and moved to uuid-named files in the work directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use framegrab_core::{ExtractionOutcome, FrameExtractor, Screenshot, Screenshots, Timestamp};
use tokio::process::Command;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Default `-q:v` for JPEG output (2 is near-lossless).
pub const DEFAULT_JPEG_QUALITY: u8 = 2;

/// Default upper bound on one ffmpeg run.
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(300);

const FRAME_PREFIX: &str = "frame_";

/// Time base the selected frames are re-stamped to, so `-frame_pts` names
/// each file after its time in milliseconds.
const FRAME_TIME_BASE: &str = "1/1000";

pub struct FfmpegExtractor {
    ffmpeg: PathBuf,
    work_dir: PathBuf,
    quality: u8,
    timeout: Duration,
}

impl FfmpegExtractor {
    pub fn new(ffmpeg: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            work_dir: work_dir.into(),
            quality: DEFAULT_JPEG_QUALITY,
            timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn run(&self, source: &Path, sorted: &[Timestamp]) -> Result<ExtractionOutcome> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .with_context(|| format!("Failed to create work dir {}", self.work_dir.display()))?;

        // Removed on drop, whichever way this function exits.
        let scratch = tempfile::Builder::new()
            .prefix("framegrab-")
            .tempdir_in(&self.work_dir)
            .context("Failed to create scratch directory")?;
        let pattern = scratch.path().join(format!("{FRAME_PREFIX}%d.jpg"));
        let filter = format!("{},settb={FRAME_TIME_BASE}", select_filter(sorted));
        debug!(filter = %filter, scratch = %scratch.path().display(), "Running ffmpeg");

        let child = Command::new(&self.ffmpeg)
            .arg("-y")
            .args(["-hide_banner", "-loglevel", "error"])
            .arg("-i")
            .arg(source)
            .arg("-vf")
            .arg(&filter)
            .args(["-vsync", "vfr"])
            .args(["-enc_time_base", FRAME_TIME_BASE])
            .args(["-frame_pts", "1"])
            .arg("-q:v")
            .arg(self.quality.to_string())
            .arg(&pattern)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to run {}", self.ffmpeg.display()))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.context("Failed to wait for ffmpeg")?,
            Err(_) => {
                warn!(timeout = ?self.timeout, source = %source.display(), "ffmpeg timed out; killed");
                return Ok(ExtractionOutcome::Failed(format!(
                    "ffmpeg timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, stderr = %stderr.trim(), "ffmpeg error");
            return Ok(ExtractionOutcome::Failed(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let frames = collect_frames(scratch.path()).await?;
        let pairs = pair_frames(sorted, &frames);

        let mut shots = Screenshots::default();
        let mut moved: HashMap<usize, PathBuf> = HashMap::new();
        for (timestamp, index) in pairs {
            let dest = self.work_dir.join(format!("{}.jpg", Uuid::new_v4().simple()));
            match moved.get(&index) {
                // Two requested seconds inside one frame interval share a frame.
                Some(first) => {
                    tokio::fs::copy(first, &dest)
                        .await
                        .with_context(|| format!("Failed to copy {}", first.display()))?;
                }
                None => {
                    let frame = &frames[index].1;
                    tokio::fs::rename(frame, &dest)
                        .await
                        .with_context(|| format!("Failed to move {}", frame.display()))?;
                    moved.insert(index, dest.clone());
                }
            }
            shots.push(Screenshot { path: dest, timestamp });
        }

        if shots.len() != sorted.len() {
            warn!(
                expected = sorted.len(),
                paired = shots.len(),
                frames = frames.len(),
                "Some timestamps got no frame"
            );
            return Ok(ExtractionOutcome::Mismatch {
                expected: sorted.len(),
                shots,
            });
        }

        info!(count = shots.len(), source = %source.display(), "Extracted screenshots");
        Ok(ExtractionOutcome::Complete(shots))
    }
}

#[async_trait]
impl FrameExtractor for FfmpegExtractor {
    async fn extract(&self, source: &Path, timestamps: &[Timestamp]) -> ExtractionOutcome {
        if timestamps.is_empty() {
            return ExtractionOutcome::empty();
        }

        let mut sorted = timestamps.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        match self.run(source, &sorted).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %format!("{e:#}"), "Batch screenshot error");
                ExtractionOutcome::Failed(format!("{e:#}"))
            }
        }
    }
}

/// Frame files written by ffmpeg with their time in milliseconds, oldest
/// first. Files whose name carries no time are skipped.
async fn collect_frames(dir: &Path) -> Result<Vec<(i64, PathBuf)>> {
    let mut frames = Vec::new();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .context("Failed to read scratch directory")?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        match frame_millis(&name.to_string_lossy()) {
            Some(ms) => frames.push((ms, entry.path())),
            None => debug!(file = %entry.path().display(), "Ignoring unexpected scratch file"),
        }
    }
    frames.sort();
    Ok(frames)
}

fn frame_millis(name: &str) -> Option<i64> {
    name.strip_prefix(FRAME_PREFIX)?
        .strip_suffix(".jpg")?
        .parse()
        .ok()
}

/// Pair each requested timestamp with the first frame at or after it, as
/// `(timestamp, index into frames)`. Timestamps past the last frame are
/// left out. `frames` must be sorted by time.
pub fn pair_frames(sorted: &[Timestamp], frames: &[(i64, PathBuf)]) -> Vec<(Timestamp, usize)> {
    sorted
        .iter()
        .filter_map(|ts| {
            let index = match ts.seconds() {
                0 => 0,
                s => frames.partition_point(|(ms, _)| *ms < s as i64 * 1000),
            };
            (index < frames.len()).then_some((*ts, index))
        })
        .collect()
}

/// Build the `select` filter for a batch.
///
/// Each timestamp picks the first decoded frame at or after it, so a
/// timestamp yields at most one frame even when frame times are not whole
/// seconds. Commas inside the expression are escaped for the filtergraph.
pub fn select_filter(timestamps: &[Timestamp]) -> String {
    let predicates: Vec<String> = timestamps.iter().map(|ts| frame_predicate(*ts)).collect();
    format!("select='{}'", predicates.join("+"))
}

fn frame_predicate(ts: Timestamp) -> String {
    match ts.seconds() {
        0 => r"eq(n\,0)".to_string(),
        s => format!(r"gte(t\,{s})*lt(prev_pts*TB\,{s})"),
    }
}

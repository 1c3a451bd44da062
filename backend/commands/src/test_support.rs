//! In-memory fakes for driving the flows in tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use framegrab_core::{
    Conversation, DurationProbe, ExtractionOutcome, FilePathTable, FrameExtractor, GrabError,
    MediaItem, ReplyOutcome, Screenshot, Screenshots, Timestamp,
};

use crate::dispatch::ScreenshotService;
use crate::types::FlowSettings;

pub fn service(probe: FixedProbe, extractor: Arc<FakeExtractor>) -> ScreenshotService {
    ScreenshotService::new(
        Arc::new(probe),
        extractor,
        FilePathTable::new(Duration::from_secs(3600)),
        FlowSettings::default(),
    )
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeConversation {
    replies: Mutex<VecDeque<String>>,
    statuses: Mutex<Vec<String>>,
    groups: Mutex<Vec<Vec<MediaItem>>>,
    files_existed: Mutex<bool>,
    send_error: Option<String>,
    cancel_waits: bool,
}

impl FakeConversation {
    /// Replies are handed out in order; once exhausted every wait times out.
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
            files_existed: Mutex::new(true),
            ..Default::default()
        }
    }

    /// Every wait ends as if another flow took over the reply.
    pub fn cancelled_waits(mut self) -> Self {
        self.cancel_waits = true;
        self
    }

    pub fn failing_sends(mut self, message: &str) -> Self {
        self.send_error = Some(message.to_string());
        self
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses.lock().unwrap().last().cloned()
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        self.groups.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn captions(&self) -> Vec<String> {
        self.groups
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|item| item.caption.clone())
            .collect()
    }

    pub fn files_existed_when_sent(&self) -> bool {
        *self.files_existed.lock().unwrap()
    }
}

#[async_trait]
impl Conversation for FakeConversation {
    fn session_label(&self) -> String {
        "test-session".to_string()
    }

    async fn edit_status(&self, text: &str) -> Result<()> {
        self.statuses.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_media_group(&self, items: &[MediaItem]) -> Result<()> {
        if let Some(message) = &self.send_error {
            bail!("{message}");
        }
        if !items.iter().all(|item| item.path.exists()) {
            *self.files_existed.lock().unwrap() = false;
        }
        self.groups.lock().unwrap().push(items.to_vec());
        Ok(())
    }

    async fn next_reply(&self, _timeout: Duration) -> Result<ReplyOutcome> {
        if self.cancel_waits {
            return Ok(ReplyOutcome::Cancelled);
        }
        Ok(match self.replies.lock().unwrap().pop_front() {
            Some(text) => ReplyOutcome::Text(text),
            None => ReplyOutcome::TimedOut,
        })
    }
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

pub struct FixedProbe(Option<f64>);

impl FixedProbe {
    pub fn ok(duration: f64) -> Self {
        Self(Some(duration))
    }

    pub fn failing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl DurationProbe for FixedProbe {
    async fn duration(&self, _source: &Path) -> Result<f64, GrabError> {
        self.0
            .ok_or_else(|| GrabError::DurationUnavailable("probe failed".into()))
    }
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

#[derive(Default)]
enum Mode {
    #[default]
    Failing,
    Writing(PathBuf),
    Mismatching(PathBuf, usize),
}

/// Records each request. In writing mode one real file per timestamp is
/// created in the given directory, so cleanup can be observed.
#[derive(Default)]
pub struct FakeExtractor {
    mode: Mode,
    calls: AtomicUsize,
    last: Mutex<Vec<Timestamp>>,
}

impl FakeExtractor {
    pub fn writing_files(dir: &Path) -> Self {
        Self { mode: Mode::Writing(dir.to_path_buf()), ..Default::default() }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    /// Writes files for the first `produced` timestamps only.
    pub fn mismatching(dir: &Path, produced: usize) -> Self {
        Self { mode: Mode::Mismatching(dir.to_path_buf(), produced), ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Vec<Timestamp> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl FrameExtractor for FakeExtractor {
    async fn extract(&self, _source: &Path, timestamps: &[Timestamp]) -> ExtractionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = timestamps.to_vec();

        match &self.mode {
            Mode::Failing => ExtractionOutcome::Failed("fake extractor failure".into()),
            Mode::Mismatching(dir, produced) => ExtractionOutcome::Mismatch {
                expected: timestamps.len(),
                shots: write_shots(dir, &timestamps[..(*produced).min(timestamps.len())]),
            },
            Mode::Writing(dir) => ExtractionOutcome::Complete(write_shots(dir, timestamps)),
        }
    }
}

fn write_shots(dir: &Path, timestamps: &[Timestamp]) -> Screenshots {
    let mut shots = Screenshots::default();
    for ts in timestamps {
        let path = dir.join(format!("{}.jpg", ts.0));
        std::fs::write(&path, b"jpeg").unwrap();
        shots.push(Screenshot { path, timestamp: *ts });
    }
    shots
}

use std::path::PathBuf;

use tracing::debug;

use crate::timestamp::Timestamp;

/// One extracted still image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub path: PathBuf,
    pub timestamp: Timestamp,
}

/// Screenshots owned by a single flow.
///
/// The files are removed when the collection is dropped; removal errors
/// are ignored.
#[derive(Debug, Default)]
pub struct Screenshots {
    items: Vec<Screenshot>,
}

impl Screenshots {
    pub fn new(items: Vec<Screenshot>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, shot: Screenshot) {
        self.items.push(shot);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Screenshot> {
        self.items.iter()
    }

    /// Look up the screenshot taken for a given timestamp.
    pub fn find(&self, timestamp: Timestamp) -> Option<&Screenshot> {
        self.items.iter().find(|s| s.timestamp == timestamp)
    }

}

impl Drop for Screenshots {
    fn drop(&mut self) {
        for shot in &self.items {
            if let Err(e) = std::fs::remove_file(&shot.path) {
                debug!(path = %shot.path.display(), error = %e, "Screenshot cleanup skipped");
            }
        }
    }
}

/// What a batch extraction produced.
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// One screenshot per requested timestamp, paired explicitly.
    Complete(Screenshots),
    /// The tool succeeded but some requested timestamps got no frame, e.g.
    /// past the last video frame. `shots` holds the ones that were paired.
    Mismatch { expected: usize, shots: Screenshots },
    /// The tool could not run or exited unsuccessfully.
    Failed(String),
}

impl ExtractionOutcome {
    pub fn empty() -> Self {
        Self::Complete(Screenshots::default())
    }

    pub fn produced(&self) -> usize {
        match self {
            Self::Complete(shots) | Self::Mismatch { shots, .. } => shots.len(),
            Self::Failed(_) => 0,
        }
    }

    pub fn into_screenshots(self) -> Screenshots {
        match self {
            Self::Complete(shots) | Self::Mismatch { shots, .. } => shots,
            Self::Failed(_) => Screenshots::default(),
        }
    }
}

/// A captioned image ready to be sent in a grouped media message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub path: PathBuf,
    pub caption: String,
}

impl MediaItem {
    pub fn for_screenshot(shot: &Screenshot) -> Self {
        Self {
            path: shot.path.clone(),
            caption: format!("🕒 {}", shot.timestamp.format_hms()),
        }
    }
}

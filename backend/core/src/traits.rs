use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::error::GrabError;
use crate::reply::ReplyOutcome;
use crate::timestamp::Timestamp;
use crate::types::{ExtractionOutcome, MediaItem};

/// The chat surface a screenshot flow talks to.
///
/// One value represents one status message in one chat, on behalf of one
/// user. Telegram, the console and test fakes all implement it.
#[async_trait]
pub trait Conversation: Send + Sync {
    /// Stable label for logs, e.g. `tg-<chat>-<message>`.
    fn session_label(&self) -> String;

    /// Replace the text of the flow's status message.
    async fn edit_status(&self, text: &str) -> Result<()>;

    /// Send captioned images as one grouped message.
    async fn send_media_group(&self, items: &[MediaItem]) -> Result<()>;

    /// Wait for the next text message from the same user in the same chat.
    async fn next_reply(&self, timeout: Duration) -> Result<ReplyOutcome>;
}

/// Reports the length of a media file.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Duration in seconds; always positive and finite on success.
    async fn duration(&self, source: &Path) -> Result<f64, GrabError>;
}

/// Extracts still frames at the given timestamps in one batch.
///
/// Implementations never return an error: failures are reported through
/// [`ExtractionOutcome`].
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    async fn extract(&self, source: &Path, timestamps: &[Timestamp]) -> ExtractionOutcome;
}

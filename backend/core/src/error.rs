use std::time::Duration;

use thiserror::Error;

/// Errors that end a screenshot flow early.
///
/// Every variant maps to one chat-facing line via [`GrabError::user_message`].
#[derive(Debug, Error)]
pub enum GrabError {
    #[error("duration unavailable: {0}")]
    DurationUnavailable(String),

    #[error("no reply within {0:?}")]
    ReplyTimeout(Duration),

    #[error("reply wait cancelled")]
    ReplyCancelled,

    #[error("no valid timestamps in input")]
    NoValidTimestamps,

    #[error("session {0} expired or unknown")]
    SessionExpired(u64),

    #[error("video too short ({duration:.1}s)")]
    VideoTooShort { duration: f64 },

    #[error("random sample came back empty")]
    NoSample,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GrabError {
    /// Text shown to the chat user when a flow aborts with this error.
    ///
    /// `max_chars` bounds the generic error text for unexpected failures.
    pub fn user_message(&self, max_chars: usize) -> String {
        match self {
            Self::DurationUnavailable(_) => "❌ Failed to get video duration".to_string(),
            Self::ReplyTimeout(timeout) => {
                let secs = timeout.as_secs();
                if secs >= 60 && secs % 60 == 0 {
                    let minutes = secs / 60;
                    let unit = if minutes == 1 { "minute" } else { "minutes" };
                    format!("⌛ Timed out after {minutes} {unit}")
                } else {
                    format!("⌛ Timed out after {secs} seconds")
                }
            }
            Self::ReplyCancelled => "🚫 Cancelled: timestamps were requested for another video".to_string(),
            Self::NoValidTimestamps => "❌ No valid timestamps provided".to_string(),
            Self::SessionExpired(_) => "❌ Session expired".to_string(),
            Self::VideoTooShort { .. } => "❌ Video too short for screenshots".to_string(),
            Self::NoSample => "❌ Couldn't generate valid timestamps".to_string(),
            Self::Other(e) => format!("❌ Error: {}", truncate_chars(&e.to_string(), max_chars)),
        }
    }

    /// Whether this is an expected abort (bad input, expired session) rather
    /// than an unexpected failure worth an error-level log line.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub mod error;
pub mod reply;
pub mod session;
pub mod timestamp;
pub mod traits;
pub mod types;

pub use error::GrabError;
pub use reply::{PendingReply, ReplyKey, ReplyOutcome, ReplyRouter};
pub use session::{FilePathTable, SessionId};
pub use timestamp::{parse_timestamp, parse_timestamp_list, InvalidEntry, ParsedTimestamps, Timestamp, TimestampEntry};
pub use traits::{Conversation, DurationProbe, FrameExtractor};
pub use types::{ExtractionOutcome, MediaItem, Screenshot, Screenshots};

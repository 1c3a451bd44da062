//! ffmpeg-backed media capabilities: duration probing and batch frame
//! extraction, plus MIME helpers for inbound videos.

pub mod extractor;
pub mod mime_detect;
pub mod probe;

pub use extractor::{pair_frames, select_filter, FfmpegExtractor};
pub use mime_detect::{detect_mime_type, is_video, video_extension};
pub use probe::{parse_duration, FfprobeDuration};

//! MIME helpers for inbound videos.
//!
//! Telegram reports a MIME type for documents but not always a usable file
//! name, so downloads are named from the MIME type.

use std::path::Path;

/// Detect a video MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "ogv" => "video/ogg",
        "ts" => "video/mp2t",
        "flv" => "video/x-flv",
        _ => "application/octet-stream",
    }
}

/// File extension to store a video of the given MIME type under.
pub fn video_extension(mime: &str) -> &'static str {
    match mime {
        "video/webm" => "webm",
        "video/x-matroska" => "mkv",
        "video/quicktime" => "mov",
        "video/x-msvideo" => "avi",
        "video/ogg" => "ogv",
        "video/mp2t" => "ts",
        "video/x-flv" => "flv",
        _ => "mp4",
    }
}

/// Whether a MIME type is for video.
pub fn is_video(mime: &str) -> bool {
    mime.starts_with("video/")
}

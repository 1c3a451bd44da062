//! Console conversation: runs a screenshot flow in the terminal.
//!
//! Status edits are printed, images are copied into an output directory,
//! and the timestamp prompt is answered from `--at` or stdin.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use framegrab_core::{Conversation, MediaItem, ReplyOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::terminal_output::{note_info, status_block};

pub struct ConsoleConversation {
    out_dir: PathBuf,
    answer: Mutex<Option<String>>,
    interactive: bool,
    saved: AtomicUsize,
}

impl ConsoleConversation {
    /// `answer` pre-fills the reply to the timestamp prompt; without it the
    /// reply is read from stdin when `interactive`.
    pub fn new(out_dir: impl Into<PathBuf>, answer: Option<String>, interactive: bool) -> Self {
        Self {
            out_dir: out_dir.into(),
            answer: Mutex::new(answer),
            interactive,
            saved: AtomicUsize::new(0),
        }
    }

    pub fn saved(&self) -> usize {
        self.saved.load(Ordering::Relaxed)
    }

    fn take_answer(&self) -> Option<String> {
        self.answer.lock().ok().and_then(|mut a| a.take())
    }
}

/// Output name for a captioned screenshot: sequence number plus its
/// timestamp, e.g. `003_00-01-23.jpg`.
pub fn output_name(index: usize, item: &MediaItem) -> String {
    let stamp: String = item
        .caption
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ':')
        .map(|c| if c == ':' { '-' } else { c })
        .collect();
    if stamp.is_empty() {
        format!("{index:03}.jpg")
    } else {
        format!("{index:03}_{stamp}.jpg")
    }
}

async fn copy_into(dir: &Path, name: &str, src: &Path) -> Result<PathBuf> {
    let dst = dir.join(name);
    tokio::fs::copy(src, &dst)
        .await
        .with_context(|| format!("copying {} to {}", src.display(), dst.display()))?;
    Ok(dst)
}

#[async_trait]
impl Conversation for ConsoleConversation {
    fn session_label(&self) -> String {
        format!("console-{}", std::process::id())
    }

    async fn edit_status(&self, text: &str) -> Result<()> {
        print!("{}", status_block(text));
        Ok(())
    }

    async fn send_media_group(&self, items: &[MediaItem]) -> Result<()> {
        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("creating output dir {}", self.out_dir.display()))?;
        for item in items {
            let index = self.saved.fetch_add(1, Ordering::Relaxed) + 1;
            let dst = copy_into(&self.out_dir, &output_name(index, item), &item.path).await?;
            note_info(&format!("{} → {}", item.caption, dst.display()));
        }
        Ok(())
    }

    async fn next_reply(&self, timeout: Duration) -> Result<ReplyOutcome> {
        if let Some(answer) = self.take_answer() {
            return Ok(ReplyOutcome::Text(answer));
        }
        if !self.interactive {
            return Ok(ReplyOutcome::TimedOut);
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        match tokio::time::timeout(timeout, lines.next_line()).await {
            Ok(line) => Ok(match line.context("reading stdin")? {
                Some(text) => ReplyOutcome::Text(text),
                // stdin closed
                None => ReplyOutcome::Cancelled,
            }),
            Err(_) => {
                debug!(?timeout, "No answer on stdin");
                Ok(ReplyOutcome::TimedOut)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(path: &Path, caption: &str) -> MediaItem {
        MediaItem { path: path.to_path_buf(), caption: caption.to_string() }
    }

    #[test]
    fn output_names_carry_sequence_and_time() {
        let it = item(Path::new("x.jpg"), "🕒 00:01:23");
        assert_eq!(output_name(3, &it), "003_00-01-23.jpg");
        assert_eq!(output_name(12, &item(Path::new("x.jpg"), "")), "012.jpg");
    }

    #[tokio::test]
    async fn preset_answer_is_used_once() {
        let conv = ConsoleConversation::new("/tmp", Some("1, 2".into()), false);
        let t = Duration::from_millis(10);
        assert_eq!(conv.next_reply(t).await.unwrap().text(), Some("1, 2"));
        assert_eq!(conv.next_reply(t).await.unwrap(), ReplyOutcome::TimedOut);
    }

    #[tokio::test]
    async fn copies_images_in_order() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let a = src.path().join("a.jpg");
        let b = src.path().join("b.jpg");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        let conv = ConsoleConversation::new(out.path().join("shots"), None, false);
        conv.send_media_group(&[item(&a, "🕒 00:00:05"), item(&b, "🕒 00:00:01")])
            .await
            .unwrap();

        assert_eq!(conv.saved(), 2);
        let first = out.path().join("shots/001_00-00-05.jpg");
        assert_eq!(std::fs::read(first).unwrap(), b"a");
        assert!(out.path().join("shots/002_00-00-01.jpg").exists());
    }
}

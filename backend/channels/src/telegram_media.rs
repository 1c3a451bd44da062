//! Telegram Media Handler
//!
//! Downloads inbound videos and uploads extracted screenshots as albums.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use framegrab_core::MediaItem;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{InputFile, InputMedia, InputMediaPhoto, Message};
use tracing::info;
use uuid::Uuid;

pub struct TelegramMedia;

impl TelegramMedia {
    /// MIME type of the video carried by a message, if any. Documents count
    /// only when Telegram reports a `video/*` type.
    pub fn video_mime(msg: &Message) -> Option<String> {
        if let Some(video) = msg.video() {
            let mime = video
                .mime_type
                .as_ref()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_else(|| "video/mp4".to_string());
            return Some(mime);
        }
        let doc = msg.document()?;
        let mime = doc.mime_type.as_ref()?.essence_str().to_string();
        media::is_video(&mime).then_some(mime)
    }

    /// Fresh, collision-free download location for a video of `mime` type.
    pub fn download_path(dir: &Path, mime: &str) -> PathBuf {
        dir.join(format!("{}.{}", Uuid::new_v4(), media::video_extension(mime)))
    }

    /// Download the video attached to `msg` into `dir`.
    pub async fn receive_video(bot: &Bot, msg: &Message, dir: &Path, mime: &str) -> Result<PathBuf> {
        let file_id = match (msg.video(), msg.document()) {
            (Some(video), _) => video.file.id.clone(),
            (None, Some(doc)) => doc.file.id.clone(),
            (None, None) => anyhow::bail!("message carries no video"),
        };

        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating download dir {}", dir.display()))?;

        let file = bot.get_file(file_id).await.context("resolving Telegram file")?;
        let path = Self::download_path(dir, mime);
        let mut dst = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("creating {}", path.display()))?;

        if let Err(e) = bot.download_file(&file.path, &mut dst).await {
            drop(dst);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(anyhow::Error::new(e).context("downloading video from Telegram"));
        }

        info!(chat_id = msg.chat.id.0, path = %path.display(), "Video downloaded");
        Ok(path)
    }

    /// Album entries for a group of captioned screenshots.
    pub fn album(items: &[MediaItem]) -> Vec<InputMedia> {
        items
            .iter()
            .map(|item| {
                InputMedia::Photo(
                    InputMediaPhoto::new(InputFile::file(item.path.clone())).caption(item.caption.clone()),
                )
            })
            .collect()
    }

    /// Upload a group of screenshots. Telegram albums need at least two
    /// items, so a lone screenshot goes out as a plain photo.
    pub async fn send_group(bot: &Bot, chat_id: ChatId, items: &[MediaItem]) -> Result<()> {
        match items {
            [] => {}
            [single] => {
                bot.send_photo(chat_id, InputFile::file(single.path.clone()))
                    .caption(single.caption.clone())
                    .await
                    .context("sending screenshot")?;
            }
            _ => {
                bot.send_media_group(chat_id, Self::album(items))
                    .await
                    .context("sending screenshot album")?;
            }
        }
        Ok(())
    }
}

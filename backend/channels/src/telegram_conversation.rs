//! One screenshot flow's view of a Telegram chat.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use framegrab_core::{Conversation, MediaItem, ReplyKey, ReplyOutcome, ReplyRouter};
use teloxide::prelude::*;
use teloxide::types::MessageId;

use crate::telegram_media::TelegramMedia;

/// Edits one status message, uploads into its chat, and takes replies from
/// one user through the shared [`ReplyRouter`].
pub struct TelegramConversation {
    bot: Bot,
    chat_id: ChatId,
    status_id: MessageId,
    user_id: UserId,
    replies: ReplyRouter,
}

impl TelegramConversation {
    pub fn new(
        bot: Bot,
        chat_id: ChatId,
        status_id: MessageId,
        user_id: UserId,
        replies: ReplyRouter,
    ) -> Self {
        Self { bot, chat_id, status_id, user_id, replies }
    }

    pub fn reply_key(&self) -> ReplyKey {
        ReplyKey::new(self.chat_id.0, self.user_id.0)
    }
}

/// Log label for a flow bound to a status message.
pub fn session_label(chat_id: ChatId, status_id: MessageId) -> String {
    format!("tg-{}-{}", chat_id.0, status_id.0)
}

#[async_trait]
impl Conversation for TelegramConversation {
    fn session_label(&self) -> String {
        session_label(self.chat_id, self.status_id)
    }

    async fn edit_status(&self, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(self.chat_id, self.status_id, text)
            .await
            .context("editing status message")?;
        Ok(())
    }

    async fn send_media_group(&self, items: &[MediaItem]) -> Result<()> {
        TelegramMedia::send_group(&self.bot, self.chat_id, items).await
    }

    async fn next_reply(&self, timeout: Duration) -> Result<ReplyOutcome> {
        Ok(self.replies.wait_for(self.reply_key(), timeout).await)
    }
}

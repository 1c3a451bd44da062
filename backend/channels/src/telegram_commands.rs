//! Telegram Bot Commands
//!
//! Handles `/start` and `/help`; everything else is left to the caller.

use anyhow::Result;
use teloxide::prelude::*;
use tracing::info;

pub const HELP_TEXT: &str = "🎬 Send me a video (or a video file as a document) and pick how to grab frames:\n\
\n\
🎲 N: N random screenshots spread over the video\n\
🕒 Custom timestamps: reply with a comma-separated list, e.g. 00:01:23, 01:23, 45";

pub struct TelegramCommands;

impl TelegramCommands {
    /// The command keyword of a message, without arguments or `@botname`.
    pub fn command_of(text: &str) -> Option<&str> {
        let first = text.split_whitespace().next()?;
        if !first.starts_with('/') {
            return None;
        }
        Some(first.split('@').next().unwrap_or(first))
    }

    /// Reply text for a known command.
    pub fn reply_for(command: &str) -> Option<&'static str> {
        match command {
            "/start" | "/help" => Some(HELP_TEXT),
            _ => None,
        }
    }

    /// Answer a known command. Returns `false` when the text is not one.
    pub async fn dispatch(bot: &Bot, chat_id: ChatId, text: &str) -> Result<bool> {
        let Some(command) = Self::command_of(text) else {
            return Ok(false);
        };
        let Some(reply) = Self::reply_for(command) else {
            info!(command, chat_id = chat_id.0, "Unknown command");
            return Ok(false);
        };

        info!(command, chat_id = chat_id.0, "Handling Telegram command");
        bot.send_message(chat_id, reply).await?;
        Ok(true)
    }
}

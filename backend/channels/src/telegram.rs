use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::ChannelAdapter;
use crate::telegram_commands::TelegramCommands;
use crate::telegram_conversation::TelegramConversation;
use crate::telegram_media::TelegramMedia;
use async_trait::async_trait;
use framegrab_commands::{MenuButton, ScreenshotService, parse_callback, screenshot_menu};
use framegrab_core::{FilePathTable, ReplyKey, ReplyRouter};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MaybeInaccessibleMessage};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Adapter-level settings that are not part of a flow.
#[derive(Debug, Clone)]
pub struct TelegramSettings {
    /// Where inbound videos are stored while their session is live.
    pub download_dir: PathBuf,
    /// Counts offered as random-screenshot buttons.
    pub random_presets: Vec<u32>,
}

/// Shared handler state, injected into every update handler.
struct BotState {
    service: Arc<ScreenshotService>,
    replies: ReplyRouter,
    settings: TelegramSettings,
}

pub struct TelegramAdapter {
    bot: Bot,
    state: Arc<BotState>,
}

impl TelegramAdapter {
    pub fn new(token: String, service: Arc<ScreenshotService>, settings: TelegramSettings) -> Self {
        Self {
            bot: Bot::new(token),
            state: Arc::new(BotState {
                service,
                replies: ReplyRouter::new(),
                settings,
            }),
        }
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> anyhow::Result<()> {
        info!(
            download_dir = %self.state.settings.download_dir.display(),
            presets = ?self.state.settings.random_presets,
            "Starting Telegram adapter"
        );

        let purge = spawn_session_purge(self.state.service.sessions().clone(), PURGE_INTERVAL);

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(on_message))
            .branch(Update::filter_callback_query().endpoint(on_callback));

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.state.clone()])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        purge.abort();
        info!("Telegram adapter stopped");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Update handlers
// ---------------------------------------------------------------------------

async fn on_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    if let Some(mime) = TelegramMedia::video_mime(&msg) {
        if let Err(e) = register_video(&bot, &msg, &state, &mime).await {
            error!(chat_id = msg.chat.id.0, error = %e, "Failed to accept video");
            bot.send_message(msg.chat.id, "❌ Couldn't download that video").await?;
        }
        return Ok(());
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };

    // A flow waiting on this user gets the text first.
    if let Some(user) = msg.from.as_ref() {
        let key = ReplyKey::new(msg.chat.id.0, user.id.0);
        if state.replies.deliver(key, text) {
            debug!(chat_id = msg.chat.id.0, user_id = user.id.0, "Reply delivered to pending flow");
            return Ok(());
        }
    }

    if let Err(e) = TelegramCommands::dispatch(&bot, msg.chat.id, text).await {
        warn!(chat_id = msg.chat.id.0, error = %e, "Command reply failed");
    }
    Ok(())
}

async fn register_video(bot: &Bot, msg: &Message, state: &BotState, mime: &str) -> anyhow::Result<()> {
    let path = TelegramMedia::receive_video(bot, msg, &state.settings.download_dir, mime).await?;
    let session_id = state.service.sessions().register(path).await;
    info!(chat_id = msg.chat.id.0, session_id, "Video registered");

    let menu = screenshot_menu(session_id, &state.settings.random_presets);
    bot.send_message(msg.chat.id, "📸 How many screenshots?")
        .reply_markup(keyboard(&menu))
        .await?;
    Ok(())
}

async fn on_callback(bot: Bot, q: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(action) = q.data.as_deref().and_then(parse_callback) else {
        debug!(data = ?q.data, "Ignoring foreign callback payload");
        return Ok(());
    };
    let Some(status) = q.message.as_ref() else {
        warn!("Callback without an accessible message");
        return Ok(());
    };

    let conv = conversation_for(&bot, status, q.from.id, &state);
    let service = state.service.clone();
    // The dispatcher handles one update per chat at a time; a flow waiting
    // for a reply inside this handler would block that reply.
    tokio::spawn(async move {
        service.handle_callback(&conv, action).await;
    });
    Ok(())
}

fn conversation_for(
    bot: &Bot,
    status: &MaybeInaccessibleMessage,
    user_id: UserId,
    state: &BotState,
) -> TelegramConversation {
    TelegramConversation::new(
        bot.clone(),
        status.chat().id,
        status.id(),
        user_id,
        state.replies.clone(),
    )
}

/// Map menu rows onto an inline keyboard.
pub fn keyboard(menu: &[Vec<MenuButton>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(menu.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.data.clone()))
            .collect::<Vec<_>>()
    }))
}

// ---------------------------------------------------------------------------
// Session purge
// ---------------------------------------------------------------------------

/// Evict expired sessions and delete the videos no live session still uses.
/// Returns how many files were removed.
pub async fn purge_once(sessions: &FilePathTable) -> usize {
    let mut removed = 0;
    for path in sessions.purge_expired().await {
        if sessions.references(&path).await {
            continue;
        }
        match tokio::fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            Err(e) => debug!(path = %path.display(), error = %e, "Expired video already gone"),
        }
    }
    if removed > 0 {
        info!(removed, "Purged expired sessions");
    }
    removed
}

pub fn spawn_session_purge(sessions: FilePathTable, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            purge_once(&sessions).await;
        }
    })
}

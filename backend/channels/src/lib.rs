use async_trait::async_trait;

pub mod telegram;
pub mod telegram_commands;
pub mod telegram_conversation;
pub mod telegram_media;

pub use telegram::{TelegramAdapter, TelegramSettings};
pub use telegram_conversation::TelegramConversation;

/// All channel adapters implement this trait.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Run the adapter until it shuts down (polling loop, ctrl-c, etc.).
    async fn start(&self) -> anyhow::Result<()>;
}

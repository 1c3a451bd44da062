/// Screenshot flow types.
use std::time::Duration;

use framegrab_core::SessionId;

// ---------------------------------------------------------------------------
// Callback actions
// ---------------------------------------------------------------------------

/// What an inline-button press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// `randss:<count>:<session_id>`
    Random { count: u32, session_id: SessionId },
    /// `customss:<session_id>`
    Custom { session_id: SessionId },
}

impl CallbackAction {
    /// Encode as callback data (Telegram allows at most 64 bytes).
    pub fn to_data(&self) -> String {
        match self {
            Self::Random { count, session_id } => format!("randss:{count}:{session_id}"),
            Self::Custom { session_id } => format!("customss:{session_id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

/// One inline button; transports map this onto their own keyboard type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub data: String,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// How long the free-text flow waits for the timestamp reply.
    pub reply_timeout: Duration,
    /// Images per grouped media message.
    pub media_group_size: usize,
    /// Invalid entries listed inline in the final status.
    pub invalid_preview: usize,
    /// Cap on the generic error text shown to users.
    pub error_max_chars: usize,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(120),
            media_group_size: 10,
            invalid_preview: 3,
            error_max_chars: 200,
        }
    }
}

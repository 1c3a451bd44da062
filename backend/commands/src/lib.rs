//! Screenshot flows: callback detection, the free-text and random-count
//! orchestrators, and the chat-facing status text they produce.

pub mod custom;
pub mod detection;
pub mod dispatch;
pub mod random;
pub mod report;
pub mod types;

pub use detection::{parse_callback, screenshot_menu};
pub use dispatch::ScreenshotService;
pub use random::sample_timestamps;
pub use report::media_groups;
pub use types::{CallbackAction, FlowSettings, MenuButton};

#[cfg(test)]
pub(crate) mod test_support;

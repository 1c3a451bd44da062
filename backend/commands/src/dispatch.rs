/// Screenshot dispatch: route callback actions to the two flows and report
/// how each one ended.
use std::path::Path;
use std::sync::Arc;

use framegrab_core::{
    Conversation, DurationProbe, FilePathTable, FrameExtractor, GrabError, MediaItem, SessionId,
};
use logging::{FlowEvent, FlowLogger};
use tracing::{error, info, warn};

use crate::report;
use crate::types::{CallbackAction, FlowSettings};

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Everything a flow needs besides the conversation it talks to.
///
/// Transports hold one of these behind an `Arc` and call it from a spawned
/// task per request.
pub struct ScreenshotService {
    pub(crate) probe: Arc<dyn DurationProbe>,
    pub(crate) extractor: Arc<dyn FrameExtractor>,
    pub(crate) sessions: FilePathTable,
    pub(crate) settings: FlowSettings,
}

impl ScreenshotService {
    pub fn new(
        probe: Arc<dyn DurationProbe>,
        extractor: Arc<dyn FrameExtractor>,
        sessions: FilePathTable,
        settings: FlowSettings,
    ) -> Self {
        Self { probe, extractor, sessions, settings }
    }

    pub fn sessions(&self) -> &FilePathTable {
        &self.sessions
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    /// Run the flow a button press asks for.
    pub async fn handle_callback(&self, conv: &dyn Conversation, action: CallbackAction) {
        info!(session = %conv.session_label(), data = %action.to_data(), "Callback received");
        match action {
            CallbackAction::Random { count, session_id } => {
                self.random_screenshots(conv, count, session_id).await
            }
            CallbackAction::Custom { session_id } => {
                self.custom_for_session(conv, session_id).await
            }
        }
    }

    /// Free-text flow on a file the caller already holds.
    pub async fn custom_screenshots(&self, conv: &dyn Conversation, source: &Path) {
        let result = self.run_custom(conv, source).await;
        self.finish(conv, "custom", result).await;
    }

    /// Free-text flow on the file registered under `session_id`.
    pub async fn custom_for_session(&self, conv: &dyn Conversation, session_id: SessionId) {
        let result = match self.sessions.resolve(session_id).await {
            Some(source) => self.run_custom(conv, &source).await,
            None => Err(GrabError::SessionExpired(session_id)),
        };
        self.finish(conv, "custom", result).await;
    }

    /// Random-count flow on the file registered under `session_id`.
    pub async fn random_screenshots(
        &self,
        conv: &dyn Conversation,
        count: u32,
        session_id: SessionId,
    ) {
        let result = self.run_random(conv, count, session_id).await;
        self.finish(conv, "random", result).await;
    }

    /// Send captioned images in groups of `media_group_size`, in order.
    pub(crate) async fn send_groups(
        &self,
        conv: &dyn Conversation,
        items: &[MediaItem],
    ) -> Result<(), GrabError> {
        for group in report::media_groups(items, self.settings.media_group_size) {
            conv.send_media_group(group).await?;
        }
        Ok(())
    }

    /// Show the final status. Errors stop here; nothing reaches the caller.
    async fn finish(&self, conv: &dyn Conversation, flow: &str, result: Result<String, GrabError>) {
        let session = conv.session_label();
        let status = match result {
            Ok(status) => status,
            Err(e) if e.is_expected() => {
                info!(session = %session, flow, reason = %e, "Screenshot flow aborted");
                FlowLogger::log_event(&session, FlowEvent::Aborted { reason: e.to_string() });
                e.user_message(self.settings.error_max_chars)
            }
            Err(e) => {
                error!(session = %session, flow, error = %e, "Screenshot flow failed");
                FlowLogger::log_event(&session, FlowEvent::Failed { error_msg: e.to_string() });
                e.user_message(self.settings.error_max_chars)
            }
        };

        if let Err(e) = conv.edit_status(&status).await {
            warn!(session = %session, error = %e, "Failed to update status message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeConversation, FakeExtractor, FixedProbe, service};

    #[tokio::test]
    async fn custom_callback_with_unknown_session_expires() {
        let extractor = Arc::new(FakeExtractor::default());
        let svc = service(FixedProbe::ok(60.0), extractor.clone());
        let conv = FakeConversation::new(vec!["5"]);

        svc.handle_callback(&conv, CallbackAction::Custom { session_id: 42 }).await;

        assert_eq!(conv.statuses(), vec!["❌ Session expired".to_string()]);
        assert_eq!(extractor.calls(), 0);
    }

    #[tokio::test]
    async fn custom_callback_runs_on_registered_file() {
        let work = tempfile::tempdir().unwrap();
        let extractor = Arc::new(FakeExtractor::writing_files(work.path()));
        let svc = service(FixedProbe::ok(60.0), extractor.clone());
        let id = svc.sessions().register("clip.mp4").await;
        let conv = FakeConversation::new(vec!["5, 10"]);

        svc.handle_callback(&conv, CallbackAction::Custom { session_id: id }).await;

        assert_eq!(extractor.calls(), 1);
        assert_eq!(conv.last_status().as_deref(), Some("✅ Generated 2/2 screenshots"));
    }

    #[tokio::test]
    async fn transport_failure_is_shown_truncated() {
        let work = tempfile::tempdir().unwrap();
        let extractor = Arc::new(FakeExtractor::writing_files(work.path()));
        let mut svc = service(FixedProbe::ok(600.0), extractor.clone());
        svc.settings.error_max_chars = 10;
        let id = svc.sessions().register("clip.mp4").await;
        let conv = FakeConversation::new(vec![]).failing_sends("upload rejected by server");

        svc.random_screenshots(&conv, 3, id).await;

        assert_eq!(conv.last_status().as_deref(), Some("❌ Error: upload rej"));
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
    }
}

//! Free-text screenshot flow: prompt for timestamps, wait for one reply,
//! extract, and send the results back in the order the user typed them.

use std::path::Path;

use framegrab_core::{Conversation, GrabError, MediaItem, ReplyOutcome, parse_timestamp_list};
use logging::{FlowEvent, FlowLogger};
use tracing::{debug, info};

use crate::dispatch::ScreenshotService;
use crate::report;

impl ScreenshotService {
    pub(crate) async fn run_custom(
        &self,
        conv: &dyn Conversation,
        source: &Path,
    ) -> Result<String, GrabError> {
        let duration = self.probe.duration(source).await?;
        conv.edit_status(&report::timestamp_prompt(duration)).await?;

        let timeout = self.settings.reply_timeout;
        let reply = match conv.next_reply(timeout).await? {
            ReplyOutcome::Text(text) => text,
            ReplyOutcome::TimedOut => return Err(GrabError::ReplyTimeout(timeout)),
            ReplyOutcome::Cancelled => return Err(GrabError::ReplyCancelled),
        };
        debug!(session = %conv.session_label(), reply = %reply, "Timestamp reply received");

        let parsed = parse_timestamp_list(&reply, duration);
        if parsed.valid.is_empty() {
            return Err(GrabError::NoValidTimestamps);
        }

        let targets = parsed.sorted_unique();
        FlowLogger::log_event(
            &conv.session_label(),
            FlowEvent::Requested {
                flow: "custom".into(),
                source: source.display().to_string(),
            },
        );
        info!(
            valid = targets.len(),
            invalid = parsed.invalid.len(),
            duration,
            "Custom screenshots requested"
        );

        let outcome = self.extractor.extract(source, &targets).await;
        let mismatch = report::mismatch_note(&outcome);
        let shots = outcome.into_screenshots();

        // `valid` is already free of duplicate values and keeps input order.
        let items: Vec<MediaItem> = parsed
            .valid
            .iter()
            .filter_map(|entry| shots.find(entry.timestamp))
            .map(MediaItem::for_screenshot)
            .collect();
        self.send_groups(conv, &items).await?;

        FlowLogger::log_event(
            &conv.session_label(),
            FlowEvent::Extracted {
                requested: targets.len(),
                produced: items.len(),
            },
        );
        Ok(report::custom_status(
            items.len(),
            targets.len(),
            &parsed.invalid,
            self.settings.invalid_preview,
            mismatch.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use framegrab_core::Timestamp;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::test_support::{FakeConversation, FakeExtractor, FixedProbe, service};

    #[tokio::test]
    async fn prompts_with_max_duration_then_reports() {
        let work = tempfile::tempdir().unwrap();
        let extractor = Arc::new(FakeExtractor::writing_files(work.path()));
        let svc = service(FixedProbe::ok(3723.5), extractor.clone());
        let conv = FakeConversation::new(vec!["01:02:03, 5"]);

        svc.custom_screenshots(&conv, Path::new("clip.mp4")).await;

        let statuses = conv.statuses();
        assert!(statuses[0].starts_with("⏳ Provide timestamps"));
        assert!(statuses[0].contains("Max duration: 01:02:03"));
        assert_eq!(statuses.last().map(String::as_str), Some("✅ Generated 2/2 screenshots"));
    }

    #[tokio::test]
    async fn results_follow_user_order_and_extraction_is_sorted() {
        let work = tempfile::tempdir().unwrap();
        let extractor = Arc::new(FakeExtractor::writing_files(work.path()));
        let svc = service(FixedProbe::ok(600.0), extractor.clone());
        let conv = FakeConversation::new(vec!["30, 0:10, 20，10"]);

        svc.custom_screenshots(&conv, Path::new("clip.mp4")).await;

        assert_eq!(extractor.last_request(), vec![Timestamp(10), Timestamp(20), Timestamp(30)]);
        assert_eq!(
            conv.captions(),
            vec!["🕒 00:00:30", "🕒 00:00:10", "🕒 00:00:20"]
        );
        assert_eq!(conv.last_status().as_deref(), Some("✅ Generated 3/3 screenshots"));
    }

    #[tokio::test]
    async fn invalid_entries_are_listed_without_aborting() {
        let work = tempfile::tempdir().unwrap();
        let extractor = Arc::new(FakeExtractor::writing_files(work.path()));
        let svc = service(FixedProbe::ok(60.0), extractor.clone());
        let conv = FakeConversation::new(vec!["5, ab:cd, 90, 1:2:3:4, x, y"]);

        svc.custom_screenshots(&conv, Path::new("clip.mp4")).await;

        assert_eq!(
            conv.last_status().as_deref(),
            Some("✅ Generated 1/1 screenshots\n⚠️ Invalid entries: ab:cd, 90 (exceeds duration), 1:2:3:4 (+2 more)")
        );
    }

    #[tokio::test]
    async fn no_valid_entries_skips_extraction() {
        let extractor = Arc::new(FakeExtractor::default());
        let svc = service(FixedProbe::ok(60.0), extractor.clone());
        let conv = FakeConversation::new(vec!["abc, 99"]);

        svc.custom_screenshots(&conv, Path::new("clip.mp4")).await;

        assert_eq!(extractor.calls(), 0);
        assert_eq!(conv.last_status().as_deref(), Some("❌ No valid timestamps provided"));
    }

    #[tokio::test]
    async fn missing_reply_times_out() {
        let extractor = Arc::new(FakeExtractor::default());
        let mut svc = service(FixedProbe::ok(60.0), extractor.clone());
        svc.settings.reply_timeout = Duration::from_secs(120);
        let conv = FakeConversation::new(vec![]);

        svc.custom_screenshots(&conv, Path::new("clip.mp4")).await;

        assert_eq!(extractor.calls(), 0);
        assert_eq!(conv.last_status().as_deref(), Some("⌛ Timed out after 2 minutes"));
    }

    #[tokio::test]
    async fn superseded_wait_is_not_reported_as_timeout() {
        let extractor = Arc::new(FakeExtractor::default());
        let svc = service(FixedProbe::ok(60.0), extractor.clone());
        let conv = FakeConversation::new(vec!["5"]).cancelled_waits();

        svc.custom_screenshots(&conv, Path::new("clip.mp4")).await;

        assert_eq!(extractor.calls(), 0);
        assert_eq!(
            conv.last_status().as_deref(),
            Some("🚫 Cancelled: timestamps were requested for another video")
        );
    }

    #[tokio::test]
    async fn duration_failure_never_prompts() {
        let extractor = Arc::new(FakeExtractor::default());
        let svc = service(FixedProbe::failing(), extractor.clone());
        let conv = FakeConversation::new(vec!["5"]);

        svc.custom_screenshots(&conv, Path::new("clip.mp4")).await;

        assert_eq!(conv.statuses(), vec!["❌ Failed to get video duration".to_string()]);
        assert_eq!(extractor.calls(), 0);
    }

    #[tokio::test]
    async fn partial_extraction_sends_what_was_paired() {
        let work = tempfile::tempdir().unwrap();
        let extractor = Arc::new(FakeExtractor::mismatching(work.path(), 2));
        let svc = service(FixedProbe::ok(60.0), extractor.clone());
        let conv = FakeConversation::new(vec!["10, 5, 59"]);

        svc.custom_screenshots(&conv, Path::new("clip.mp4")).await;

        assert_eq!(conv.captions(), vec!["🕒 00:00:10", "🕒 00:00:05"]);
        assert_eq!(
            conv.last_status().as_deref(),
            Some("✅ Generated 2/3 screenshots\n⚠️ Frame count mismatch: expected 3, got 2")
        );
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn files_exist_while_sending_and_are_gone_afterwards() {
        let work = tempfile::tempdir().unwrap();
        let extractor = Arc::new(FakeExtractor::writing_files(work.path()));
        let svc = service(FixedProbe::ok(600.0), extractor.clone());
        let conv = FakeConversation::new(vec!["1,2,3,4,5,6,7,8,9,10,11,12"]);

        svc.custom_screenshots(&conv, Path::new("clip.mp4")).await;

        assert_eq!(conv.group_sizes(), vec![10, 2]);
        assert!(conv.files_existed_when_sent());
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
    }
}

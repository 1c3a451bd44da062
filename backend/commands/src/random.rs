//! Random-count screenshot flow.

use framegrab_core::{Conversation, GrabError, MediaItem, SessionId, Timestamp};
use logging::{FlowEvent, FlowLogger};
use rand::Rng;
use tracing::info;

use crate::dispatch::ScreenshotService;
use crate::report;

/// Draw distinct whole seconds for a random-count request.
///
/// Candidates are `1..max_time` with `max_time = floor(duration - 1)`, so no
/// sample is ever 0 or within a second of the end. Up to the whole candidate
/// pool may be drawn; a pool of fewer than two seconds is rejected.
pub fn sample_timestamps<R: Rng + ?Sized>(
    rng: &mut R,
    count: u32,
    duration: f64,
) -> Result<Vec<Timestamp>, GrabError> {
    let max_time = (duration - 1.0).floor();
    let range_size = if max_time > 1.0 { max_time as u64 - 1 } else { 0 };
    if range_size < 2 {
        return Err(GrabError::VideoTooShort { duration });
    }

    let draw = u64::from(count).min(range_size) as usize;
    if draw == 0 {
        return Err(GrabError::NoSample);
    }

    let mut picked: Vec<Timestamp> = rand::seq::index::sample(rng, range_size as usize, draw)
        .into_iter()
        .map(|i| Timestamp(i as u64 + 1))
        .collect();
    picked.sort_unstable();
    Ok(picked)
}

impl ScreenshotService {
    pub(crate) async fn run_random(
        &self,
        conv: &dyn Conversation,
        count: u32,
        session_id: SessionId,
    ) -> Result<String, GrabError> {
        let source = self
            .sessions
            .resolve(session_id)
            .await
            .ok_or(GrabError::SessionExpired(session_id))?;

        let duration = self.probe.duration(&source).await?;
        let timestamps = sample_timestamps(&mut rand::thread_rng(), count, duration)?;

        FlowLogger::log_event(
            &conv.session_label(),
            FlowEvent::Requested {
                flow: "random".into(),
                source: source.display().to_string(),
            },
        );
        info!(count, drawn = timestamps.len(), duration, "Random screenshots requested");

        let outcome = self.extractor.extract(&source, &timestamps).await;
        let mismatch = report::mismatch_note(&outcome);
        let shots = outcome.into_screenshots();

        let items: Vec<MediaItem> = shots.iter().map(MediaItem::for_screenshot).collect();
        self.send_groups(conv, &items).await?;

        FlowLogger::log_event(
            &conv.session_label(),
            FlowEvent::Extracted {
                requested: count as usize,
                produced: items.len(),
            },
        );
        Ok(report::random_status(items.len(), count, mismatch.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeConversation, FakeExtractor, FixedProbe, service};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn three_second_video_is_too_short() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = sample_timestamps(&mut rng, 5, 3.0).unwrap_err();
        assert!(matches!(err, GrabError::VideoTooShort { .. }));
    }

    #[test]
    fn zero_count_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = sample_timestamps(&mut rng, 0, 600.0).unwrap_err();
        assert!(matches!(err, GrabError::NoSample));
    }

    #[test]
    fn samples_are_in_range_sorted_and_unique() {
        let mut rng = StdRng::seed_from_u64(7);
        for duration in [4.0, 5.5, 12.0, 61.2, 3600.0] {
            for count in [1, 3, 10, 50] {
                let picked = sample_timestamps(&mut rng, count, duration).unwrap();
                assert!(!picked.is_empty());
                assert!(picked.len() <= count as usize);
                assert!(picked.windows(2).all(|w| w[0] < w[1]));
                let unique: HashSet<_> = picked.iter().collect();
                assert_eq!(unique.len(), picked.len());
                for ts in &picked {
                    assert!(ts.0 >= 1);
                    assert!((ts.0 as f64) < duration);
                }
            }
        }
    }

    #[test]
    fn large_count_takes_the_whole_pool() {
        let mut rng = StdRng::seed_from_u64(3);
        // floor(11 - 1) = 10 → candidates 1..=9.
        let picked = sample_timestamps(&mut rng, 100, 11.0).unwrap();
        assert_eq!(picked, (1..=9).map(Timestamp).collect::<Vec<_>>());
    }

    #[test]
    fn smallest_usable_video_yields_both_candidates() {
        let mut rng = StdRng::seed_from_u64(5);
        // floor(4 - 1) = 3 → candidates 1 and 2.
        let picked = sample_timestamps(&mut rng, 5, 4.0).unwrap();
        assert_eq!(picked, vec![Timestamp(1), Timestamp(2)]);
    }

    #[tokio::test]
    async fn short_video_aborts_without_extraction() {
        let extractor = Arc::new(FakeExtractor::default());
        let svc = service(FixedProbe::ok(3.0), extractor.clone());
        let id = svc.sessions().register("short.mp4").await;
        let conv = FakeConversation::new(vec![]);

        svc.random_screenshots(&conv, 5, id).await;

        assert_eq!(extractor.calls(), 0);
        assert_eq!(conv.last_status().as_deref(), Some("❌ Video too short for screenshots"));
    }

    #[tokio::test]
    async fn unknown_session_reports_expired() {
        let extractor = Arc::new(FakeExtractor::default());
        let svc = service(FixedProbe::ok(60.0), extractor.clone());
        let conv = FakeConversation::new(vec![]);

        svc.random_screenshots(&conv, 5, 999).await;

        assert_eq!(extractor.calls(), 0);
        assert_eq!(conv.last_status().as_deref(), Some("❌ Session expired"));
    }

    #[tokio::test]
    async fn duration_failure_aborts() {
        let extractor = Arc::new(FakeExtractor::default());
        let svc = service(FixedProbe::failing(), extractor.clone());
        let id = svc.sessions().register("broken.mp4").await;
        let conv = FakeConversation::new(vec![]);

        svc.random_screenshots(&conv, 5, id).await;

        assert_eq!(extractor.calls(), 0);
        assert_eq!(conv.last_status().as_deref(), Some("❌ Failed to get video duration"));
    }

    #[tokio::test]
    async fn sends_groups_and_cleans_up() {
        let work = tempfile::tempdir().unwrap();
        let extractor = Arc::new(FakeExtractor::writing_files(work.path()));
        let svc = service(FixedProbe::ok(600.0), extractor.clone());
        let id = svc.sessions().register("long.mp4").await;
        let conv = FakeConversation::new(vec![]);

        svc.random_screenshots(&conv, 23, id).await;

        assert_eq!(extractor.calls(), 1);
        assert_eq!(conv.group_sizes(), vec![10, 10, 3]);
        let requested = extractor.last_request();
        assert_eq!(requested.len(), 23);
        assert!(requested.iter().all(|t| t.0 >= 1 && t.0 < 600));
        assert_eq!(conv.last_status().as_deref(), Some("✅ Generated 23/23 random screenshots"));
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn failed_extraction_reports_zero() {
        let extractor = Arc::new(FakeExtractor::failing());
        let svc = service(FixedProbe::ok(600.0), extractor.clone());
        let id = svc.sessions().register("long.mp4").await;
        let conv = FakeConversation::new(vec![]);

        svc.random_screenshots(&conv, 4, id).await;

        assert!(conv.group_sizes().is_empty());
        assert_eq!(
            conv.last_status().as_deref(),
            Some("✅ Generated 0/4 random screenshots\n⚠️ Failed to generate 4 shots")
        );
    }
}

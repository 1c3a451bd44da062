//! Chat-facing text for the screenshot flows, and media grouping.

use framegrab_core::{ExtractionOutcome, InvalidEntry, MediaItem, Timestamp};

/// Split outgoing images into grouped messages of at most `size` items,
/// preserving order.
pub fn media_groups(items: &[MediaItem], size: usize) -> std::slice::Chunks<'_, MediaItem> {
    items.chunks(size.max(1))
}

/// Prompt shown while waiting for the user's timestamps.
pub fn timestamp_prompt(duration: f64) -> String {
    format!(
        "⏳ Provide timestamps (comma-separated)\n\
         Max duration: {}\n\
         Formats accepted: 00:01:23 [hh:mm:ss], 01:23 [mm:ss], or 45 [ss]",
        Timestamp::hms_from_secs_f64(duration)
    )
}

/// Extra status line for an extraction where some timestamps got no frame.
pub fn mismatch_note(outcome: &ExtractionOutcome) -> Option<String> {
    match outcome {
        ExtractionOutcome::Mismatch { expected, shots } => Some(format!(
            "⚠️ Frame count mismatch: expected {expected}, got {}",
            shots.len()
        )),
        _ => None,
    }
}

/// Final status for the free-text flow.
pub fn custom_status(
    produced: usize,
    requested: usize,
    invalid: &[InvalidEntry],
    preview: usize,
    mismatch: Option<&str>,
) -> String {
    let mut status = format!("✅ Generated {produced}/{requested} screenshots");
    if !invalid.is_empty() {
        let shown: Vec<String> = invalid.iter().take(preview).map(ToString::to_string).collect();
        status.push_str(&format!("\n⚠️ Invalid entries: {}", shown.join(", ")));
        if invalid.len() > preview {
            status.push_str(&format!(" (+{} more)", invalid.len() - preview));
        }
    }
    if let Some(note) = mismatch {
        status.push('\n');
        status.push_str(note);
    }
    status
}

/// Final status for the random-count flow.
pub fn random_status(produced: usize, requested: u32, mismatch: Option<&str>) -> String {
    let requested = requested as usize;
    let mut status = format!("✅ Generated {produced}/{requested} random screenshots");
    if produced < requested {
        status.push_str(&format!("\n⚠️ Failed to generate {} shots", requested - produced));
    }
    if let Some(note) = mismatch {
        status.push('\n');
        status.push_str(note);
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn items(n: usize) -> Vec<MediaItem> {
        (0..n)
            .map(|i| MediaItem {
                path: PathBuf::from(format!("{i}.jpg")),
                caption: format!("🕒 {}", Timestamp(i as u64)),
            })
            .collect()
    }

    #[test]
    fn groups_of_ten_keep_order() {
        let all = items(23);
        let groups: Vec<&[MediaItem]> = media_groups(&all, 10).collect();
        assert_eq!(groups.iter().map(|g| g.len()).collect::<Vec<_>>(), vec![10, 10, 3]);
        assert_eq!(groups[2][0].path, PathBuf::from("20.jpg"));
    }

    #[test]
    fn zero_group_size_is_treated_as_one() {
        let all = items(2);
        assert_eq!(media_groups(&all, 0).count(), 2);
    }

    #[test]
    fn prompt_shows_max_duration() {
        let prompt = timestamp_prompt(3723.9);
        assert!(prompt.contains("Max duration: 01:02:03"));
        assert!(prompt.contains("45 [ss]"));
    }

    #[test]
    fn custom_status_previews_three_invalid_entries() {
        let invalid = vec![
            InvalidEntry::Malformed("a".into()),
            InvalidEntry::ExceedsDuration("9:00".into()),
            InvalidEntry::Malformed("b".into()),
            InvalidEntry::Malformed("c".into()),
            InvalidEntry::Malformed("d".into()),
        ];
        let status = custom_status(2, 3, &invalid, 3, None);
        assert_eq!(
            status,
            "✅ Generated 2/3 screenshots\n⚠️ Invalid entries: a, 9:00 (exceeds duration), b (+2 more)"
        );
    }

    #[test]
    fn custom_status_without_invalid_entries_is_one_line() {
        assert_eq!(custom_status(4, 4, &[], 3, None), "✅ Generated 4/4 screenshots");
    }

    #[test]
    fn random_status_reports_shortfall_and_mismatch() {
        let note = mismatch_note(&ExtractionOutcome::Mismatch {
            expected: 5,
            shots: Default::default(),
        });
        let status = random_status(0, 5, note.as_deref());
        assert_eq!(
            status,
            "✅ Generated 0/5 random screenshots\n⚠️ Failed to generate 5 shots\n⚠️ Frame count mismatch: expected 5, got 0"
        );
        assert_eq!(random_status(5, 5, None), "✅ Generated 5/5 random screenshots");
    }
}

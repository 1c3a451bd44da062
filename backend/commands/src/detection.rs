/// Callback detection: recognise screenshot button payloads.
use std::sync::LazyLock;

use framegrab_core::SessionId;
use regex::Regex;

use crate::types::{CallbackAction, MenuButton};

static RANDOM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^randss:(\d+):(\d+)$").unwrap());
static CUSTOM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^customss:(\d+)$").unwrap());

/// Parse callback data. Returns `None` for foreign payloads and for numbers
/// that do not fit their field.
pub fn parse_callback(data: &str) -> Option<CallbackAction> {
    if let Some(caps) = RANDOM_RE.captures(data) {
        return Some(CallbackAction::Random {
            count: caps[1].parse().ok()?,
            session_id: caps[2].parse().ok()?,
        });
    }
    if let Some(caps) = CUSTOM_RE.captures(data) {
        return Some(CallbackAction::Custom {
            session_id: caps[1].parse().ok()?,
        });
    }
    None
}

/// Keyboard offered after a video is registered: one row of random presets
/// and a row for custom timestamps.
pub fn screenshot_menu(session_id: SessionId, presets: &[u32]) -> Vec<Vec<MenuButton>> {
    let random_row = presets
        .iter()
        .map(|&count| MenuButton {
            label: format!("🎲 {count}"),
            data: CallbackAction::Random { count, session_id }.to_data(),
        })
        .collect::<Vec<_>>();

    let custom_row = vec![MenuButton {
        label: "🕒 Custom timestamps".to_string(),
        data: CallbackAction::Custom { session_id }.to_data(),
    }];

    if random_row.is_empty() {
        vec![custom_row]
    } else {
        vec![random_row, custom_row]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_random_payload() {
        assert_eq!(
            parse_callback("randss:5:42"),
            Some(CallbackAction::Random { count: 5, session_id: 42 })
        );
    }

    #[test]
    fn parses_custom_payload() {
        assert_eq!(parse_callback("customss:9"), Some(CallbackAction::Custom { session_id: 9 }));
    }

    #[test]
    fn rejects_foreign_and_malformed_payloads() {
        assert_eq!(parse_callback("randss:5"), None);
        assert_eq!(parse_callback("randss:-1:2"), None);
        assert_eq!(parse_callback("randss:5:42:1"), None);
        assert_eq!(parse_callback("other:1"), None);
        assert_eq!(parse_callback("randss:99999999999:1"), None);
    }

    #[test]
    fn encoded_actions_parse_back() {
        for action in [
            CallbackAction::Random { count: 10, session_id: 3 },
            CallbackAction::Custom { session_id: 3 },
        ] {
            assert_eq!(parse_callback(&action.to_data()), Some(action));
        }
    }

    #[test]
    fn menu_has_preset_row_and_custom_row() {
        let menu = screenshot_menu(7, &[5, 10]);
        assert_eq!(menu.len(), 2);
        assert_eq!(menu[0][1].data, "randss:10:7");
        assert_eq!(menu[1][0].data, "customss:7");
        assert_eq!(screenshot_menu(7, &[]).len(), 1);
    }
}

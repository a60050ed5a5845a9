//! Human-readable notification text.

use murmur_entity::notification::NotificationKind;

/// Text used for kinds this build does not recognize.
pub const FALLBACK_MESSAGE: &str = "New notification";

/// Renders notification messages.
pub struct NotificationFormatter;

impl NotificationFormatter {
    /// Message for a known kind.
    pub fn message(kind: NotificationKind, actor: &str) -> String {
        match kind {
            NotificationKind::Follow => format!("{actor} started following you"),
            NotificationKind::Like => format!("{actor} liked your post"),
            NotificationKind::Comment => format!("{actor} commented on your post"),
        }
    }

    /// Message for a stored kind string. Never fails.
    pub fn render(kind: &str, actor: &str) -> String {
        match kind.parse::<NotificationKind>() {
            Ok(kind) => Self::message(kind, actor),
            Err(_) => FALLBACK_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds() {
        assert_eq!(
            NotificationFormatter::render("follow", "alice"),
            "alice started following you"
        );
        assert_eq!(
            NotificationFormatter::render("like", "alice"),
            "alice liked your post"
        );
        assert_eq!(
            NotificationFormatter::render("comment", "alice"),
            "alice commented on your post"
        );
    }

    #[test]
    fn test_unknown_kind_falls_back() {
        assert_eq!(NotificationFormatter::render("mention", "alice"), "New notification");
        assert_eq!(NotificationFormatter::render("", ""), "New notification");
    }
}

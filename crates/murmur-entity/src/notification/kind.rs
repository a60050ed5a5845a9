//! Notification kind enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The social action that produced a notification.
///
/// Stored as lowercase text so rows written by other producers with kinds
/// this build does not know still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Someone followed the recipient.
    Follow,
    /// Someone liked the recipient's post.
    Like,
    /// Someone commented on the recipient's post.
    Comment,
}

impl NotificationKind {
    /// Returns the stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Like => "like",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow" => Ok(Self::Follow),
            "like" => Ok(Self::Like),
            "comment" => Ok(Self::Comment),
            other => Err(format!("unknown notification kind '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_kinds() {
        for kind in [
            NotificationKind::Follow,
            NotificationKind::Like,
            NotificationKind::Comment,
        ] {
            assert_eq!(kind.as_str().parse::<NotificationKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_parse_unknown_kind() {
        assert!("mention".parse::<NotificationKind>().is_err());
        assert!("Like".parse::<NotificationKind>().is_err());
    }
}

/// Stable labels for platform presence and trust flags
use crate::session::PresenceStatus;

pub const UNKNOWN_STATUS: &str = "Unknown";

/// Human-readable presence label; absent or unlisted statuses are "Unknown"
pub fn presence_label(status: Option<PresenceStatus>) -> &'static str {
    match status {
        Some(PresenceStatus::Online) => "Online",
        Some(PresenceStatus::Offline) => "Offline",
        Some(PresenceStatus::Recently) => "Recently online",
        Some(PresenceStatus::LastWeek) => "Last seen within week",
        Some(PresenceStatus::LastMonth) => "Last seen within month",
        Some(PresenceStatus::LongTimeAgo) | None => UNKNOWN_STATUS,
    }
}

/// Trust classification of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustFlag {
    Scam,
    Fake,
    Clean,
}

impl TrustFlag {
    /// Collapse the platform's flags; scam wins over fake
    pub fn from_flags(is_scam: bool, is_fake: bool) -> Self {
        if is_scam {
            Self::Scam
        } else if is_fake {
            Self::Fake
        } else {
            Self::Clean
        }
    }

    /// Every flag that applies, in precedence order; `[Clean]` when none do
    pub fn all_from_flags(is_scam: bool, is_fake: bool) -> Vec<Self> {
        let flags: Vec<Self> = [(is_scam, Self::Scam), (is_fake, Self::Fake)]
            .into_iter()
            .filter_map(|(set, flag)| set.then_some(flag))
            .collect();

        if flags.is_empty() {
            vec![Self::Clean]
        } else {
            flags
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Scam => "Scam",
            Self::Fake => "Fake",
            Self::Clean => "Clean",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_labels() {
        assert_eq!(presence_label(Some(PresenceStatus::Online)), "Online");
        assert_eq!(presence_label(Some(PresenceStatus::Offline)), "Offline");
        assert_eq!(presence_label(Some(PresenceStatus::Recently)), "Recently online");
        assert_eq!(presence_label(Some(PresenceStatus::LastWeek)), "Last seen within week");
        assert_eq!(presence_label(Some(PresenceStatus::LastMonth)), "Last seen within month");
        assert_eq!(presence_label(Some(PresenceStatus::LongTimeAgo)), "Unknown");
        assert_eq!(presence_label(None), "Unknown");
    }

    #[test]
    fn test_trust_flag_precedence() {
        assert_eq!(TrustFlag::from_flags(true, true).label(), "Scam");
        assert_eq!(TrustFlag::from_flags(true, false).label(), "Scam");
        assert_eq!(TrustFlag::from_flags(false, true).label(), "Fake");
        assert_eq!(TrustFlag::from_flags(false, false).label(), "Clean");
    }

    #[test]
    fn test_all_flags() {
        assert_eq!(
            TrustFlag::all_from_flags(true, true),
            vec![TrustFlag::Scam, TrustFlag::Fake]
        );
        assert_eq!(TrustFlag::all_from_flags(false, true), vec![TrustFlag::Fake]);
        assert_eq!(TrustFlag::all_from_flags(false, false), vec![TrustFlag::Clean]);
    }
}

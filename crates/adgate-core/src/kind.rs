//! The network surface an ad is shown on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies the network surface and drives the shape of the outcome.
///
/// `None` exists so that a misconfigured key is representable; the
/// controller answers it with [`FailReason::DeveloperMistake`](crate::FailReason).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AdKind {
    #[default]
    None,
    Banner,
    Interstitial,
    Rewarded,
}

impl AdKind {
    /// Interstitial and rewarded ads take over the screen and are mutually
    /// exclusive with each other. Banners are not.
    pub fn is_full_screen(&self) -> bool {
        matches!(self, Self::Interstitial | Self::Rewarded)
    }
}

impl fmt::Display for AdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Banner => write!(f, "banner"),
            Self::Interstitial => write!(f, "interstitial"),
            Self::Rewarded => write!(f, "rewarded"),
        }
    }
}

//! The uniform result of a show request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AdKind;

/// Why an ad was not shown.
///
/// Serialized as the variant name (`"NoFill"`, ...). The same string is the
/// lookup key a localization layer uses to render a toast; adgate itself
/// never formats user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailReason {
    /// The device is offline.
    NoInternet,
    /// The network had no ad loaded for this kind.
    NoFill,
    /// An automatic interstitial was requested inside the throttle window.
    NotYetAutoAdTime,
    /// Another ad of a conflicting kind is already open or being requested.
    AlreadyPlaying,
    /// The caller asked for something that cannot work (e.g. kind `None`).
    DeveloperMistake,
    Unknown,
}

impl FailReason {
    /// Stable string code for logs and localization lookups.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoInternet => "NoInternet",
            Self::NoFill => "NoFill",
            Self::NotYetAutoAdTime => "NotYetAutoAdTime",
            Self::AlreadyPlaying => "AlreadyPlaying",
            Self::DeveloperMistake => "DeveloperMistake",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What happened to a show request.
///
/// Per-request failures are values, not errors: the caller branches on
/// the reason and decides the UX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdOutcome {
    /// The ad was shown and closed. `rewarded` is only ever `true` for
    /// [`AdKind::Rewarded`].
    Success { rewarded: bool },
    /// The player is entitled to skip this ad; nothing was shown.
    Skipped,
    Failed { reason: FailReason },
}

impl AdOutcome {
    /// Builds a success outcome, dropping `rewarded` for kinds that cannot
    /// grant a reward.
    pub fn success(kind: AdKind, rewarded: bool) -> Self {
        Self::Success {
            rewarded: rewarded && kind == AdKind::Rewarded,
        }
    }

    pub fn failed(reason: FailReason) -> Self {
        Self::Failed { reason }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// The failure reason, if any.
    pub fn fail_reason(&self) -> Option<FailReason> {
        match self {
            Self::Failed { reason } => Some(*reason),
            _ => None,
        }
    }

    /// Whether the caller should pay out the reward attached to the ad.
    ///
    /// A skip counts: players who bought the skip get the reward without
    /// watching.
    pub fn grants_reward(&self) -> bool {
        matches!(self, Self::Success { rewarded: true } | Self::Skipped)
    }
}

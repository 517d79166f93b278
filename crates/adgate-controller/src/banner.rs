//! Banner state: the published snapshot and the internal sub-state.
//!
//! ```text
//!   Hidden ──(show, no view)──→ Requesting ──(loaded/shown)──→ Shown
//!     ↑                             │                            │
//!     └────────(load failed)────────┘                            │
//!     └─────────────────────(hidden/closed)──────────────────────┘
//! ```
//!
//! The cycle has no terminal state; a banner can come and go for the whole
//! life of the controller.

use adgate_core::AdOutcome;
use adgate_network::{Anchor, BannerSize};
use serde::Serialize;

use crate::session::Reply;

/// What layout code needs to know about the banner.
///
/// Republished on every transition through [`AdHandle::subscribe_banner`](crate::AdHandle::subscribe_banner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BannerState {
    /// Size reported by the network; zero while closed.
    pub size: BannerSize,
    pub anchor: Anchor,
    pub is_open: bool,
}

impl BannerState {
    pub fn closed(anchor: Anchor) -> Self {
        Self {
            size: BannerSize::ZERO,
            anchor,
            is_open: false,
        }
    }

    pub fn open(size: BannerSize, anchor: Anchor) -> Self {
        Self {
            size,
            anchor,
            is_open: true,
        }
    }

    /// Pixels the banner takes from the top and bottom safe-area edges on a
    /// screen `screen_width` pixels wide, as `(top, bottom)`.
    pub fn safe_area_insets(&self, screen_width: f32) -> (f32, f32) {
        if !self.is_open {
            return (0.0, 0.0);
        }
        let height = self.size.scaled_height(screen_width);
        match self.anchor {
            Anchor::Top => (height, 0.0),
            Anchor::Bottom => (0.0, height),
        }
    }
}

/// Public view of the banner sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BannerPhase {
    Hidden,
    /// A load is in flight; further banner requests are rejected.
    Requesting,
    Shown,
}

/// Internal banner sub-state. `Requesting` carries the caller waiting for
/// the banner to appear (none when the supervisor asked).
#[derive(Debug, Default)]
pub(crate) enum BannerSlot {
    #[default]
    Hidden,
    Requesting {
        reply: Reply,
    },
    Shown,
}

impl BannerSlot {
    pub(crate) fn phase(&self) -> BannerPhase {
        match self {
            Self::Hidden => BannerPhase::Hidden,
            Self::Requesting { .. } => BannerPhase::Requesting,
            Self::Shown => BannerPhase::Shown,
        }
    }

    /// Resolves a waiting request, if there is one, and leaves `next` in
    /// its place. Returns whether a request was waiting.
    pub(crate) fn settle(&mut self, next: BannerSlot, outcome: AdOutcome) -> bool {
        match std::mem::replace(self, next) {
            Self::Requesting { reply } => {
                crate::session::respond(reply, outcome);
                true
            }
            _ => false,
        }
    }
}

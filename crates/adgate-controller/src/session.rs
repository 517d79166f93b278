//! The full-screen session: at most one interstitial or rewarded ad open at
//! a time.
//!
//! ```text
//!   Idle ──show()──→ Requested ──opened──→ Showing ──closed──→ Idle
//!                        └──────────closed / failed / timeout──────┘
//! ```
//!
//! `Idle` is the absence of a session (`Option::None` in the controller).

use adgate_core::{AdKind, AdOutcome};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Where a caller is waiting for its outcome, if anyone is.
pub(crate) type Reply = Option<oneshot::Sender<AdOutcome>>;

/// Delivers an outcome. A caller that stopped waiting is not an error.
pub(crate) fn respond(reply: Reply, outcome: AdOutcome) {
    match reply {
        Some(tx) => {
            if tx.send(outcome).is_err() {
                tracing::debug!(?outcome, "caller stopped waiting, outcome dropped");
            }
        }
        None => tracing::trace!(?outcome, "unattended ad request resolved"),
    }
}

/// Progress of an open full-screen session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    /// `show` was accepted; the network has not reported the ad on screen.
    Requested,
    /// The ad is on screen.
    Showing,
}

#[derive(Debug)]
pub(crate) struct FullScreenSession {
    pub(crate) kind: AdKind,
    pub(crate) phase: SessionPhase,
    pub(crate) reward_granted: bool,
    pub(crate) deadline: Option<Instant>,
    reply: Reply,
}

impl FullScreenSession {
    pub(crate) fn open(kind: AdKind, reply: Reply, deadline: Option<Instant>) -> Self {
        Self {
            kind,
            phase: SessionPhase::Requested,
            reward_granted: false,
            deadline,
            reply,
        }
    }

    /// Ends the session with a success carrying the reward flag.
    pub(crate) fn complete(self) -> AdOutcome {
        let outcome = AdOutcome::success(self.kind, self.reward_granted);
        respond(self.reply, outcome);
        outcome
    }

    pub(crate) fn fail(self, outcome: AdOutcome) {
        respond(self.reply, outcome);
    }
}

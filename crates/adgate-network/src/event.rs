//! Events posted by the network, and the queue that carries them.

use adgate_core::{AdKind, FailReason};
use tokio::sync::mpsc;

use crate::BannerSize;

/// Why a load did not produce an ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    /// The network had nothing to serve.
    NoFill,
    /// The request never reached the network.
    Network,
    /// The request was malformed (bad ad unit id, wrong format).
    InvalidRequest,
    Internal,
}

impl LoadFailure {
    /// The outcome reason a waiting caller sees for this failure.
    pub fn fail_reason(&self) -> FailReason {
        match self {
            Self::NoFill => FailReason::NoFill,
            Self::Network => FailReason::NoInternet,
            Self::InvalidRequest => FailReason::DeveloperMistake,
            Self::Internal => FailReason::Unknown,
        }
    }
}

/// Something the network wants the controller to know.
#[derive(Debug, Clone, PartialEq)]
pub enum AdNetworkEvent {
    /// The SDK finished starting up.
    Initialized,
    /// A full-screen ad finished loading and can be shown.
    Loaded(AdKind),
    LoadFailed {
        kind: AdKind,
        failure: LoadFailure,
    },
    /// A full-screen ad took over the screen.
    FullScreenOpened(AdKind),
    /// A full-screen ad was dismissed.
    FullScreenClosed(AdKind),
    /// A full-screen ad that `show` accepted could not be presented.
    FullScreenShowFailed(AdKind),
    /// The player watched enough of a rewarded ad to earn the reward.
    RewardEarned,
    Impression(AdKind),
    /// A banner view finished loading and is on screen.
    BannerLoaded(BannerSize),
    /// An existing banner view was made visible.
    BannerShown(BannerSize),
    BannerHidden,
    /// The banner view was destroyed.
    BannerClosed,
}

/// Creates the event queue between an adapter and the controller.
pub fn event_channel() -> (AdEventSender, AdEventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (AdEventSender { tx }, AdEventReceiver { rx })
}

/// Posting side of the event queue.
///
/// Cheap to clone, and `post` never blocks, so SDK callbacks can call it
/// from whatever thread they run on.
#[derive(Debug, Clone)]
pub struct AdEventSender {
    tx: mpsc::UnboundedSender<AdNetworkEvent>,
}

impl AdEventSender {
    /// Posts an event. Returns `false` if the controller is gone; the event
    /// is dropped in that case.
    pub fn post(&self, event: AdNetworkEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                tracing::trace!(event = ?e.0, "controller gone, dropping ad event");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consuming side of the event queue. Owned by the controller.
#[derive(Debug)]
pub struct AdEventReceiver {
    rx: mpsc::UnboundedReceiver<AdNetworkEvent>,
}

impl AdEventReceiver {
    /// Waits for the next event. `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<AdNetworkEvent> {
        self.rx.recv().await
    }

    /// Takes an event if one is already queued.
    pub fn try_recv(&mut self) -> Option<AdNetworkEvent> {
        self.rx.try_recv().ok()
    }
}

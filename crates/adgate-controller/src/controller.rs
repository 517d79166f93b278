//! The controller's state machine.
//!
//! [`ControllerCore`] holds every piece of mutable ad state and is only ever
//! touched from the actor task, so its methods are plain synchronous
//! `&mut self` functions. The actor feeds it commands, network events,
//! deadline expiries, and supervisor ticks, one at a time.

use std::sync::Arc;

use adgate_core::{
    AdEligibilityPolicy, AdKind, AdOutcome, AdRequestKey, FailReason, REMOVE_ADS_1, keys,
};
use adgate_network::{AdNetworkAdapter, AdNetworkEvent, Anchor, BannerSize, LoadFailure};
use adgate_throttle::AutoAdThrottle;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::actor::{ControllerCommand, ControllerStatus};
use crate::banner::{BannerPhase, BannerSlot, BannerState};
use crate::session::{FullScreenSession, Reply, SessionPhase, respond};
use crate::{ControllerConfig, FailureNotifier, VisibilityProbe};

pub(crate) struct ControllerCore<A: AdNetworkAdapter> {
    adapter: A,
    policy: AdEligibilityPolicy,
    throttle: AutoAdThrottle,
    visibility: Option<Box<dyn VisibilityProbe>>,
    notifier: Option<Arc<dyn FailureNotifier>>,
    config: ControllerConfig,

    /// The open interstitial or rewarded session. `None` is idle.
    full_screen: Option<FullScreenSession>,
    /// Kinds of expired sessions whose close event has not arrived yet.
    /// Each entry absorbs exactly one late close or show failure.
    orphaned: Vec<AdKind>,
    banner: BannerSlot,
    last_anchor: Anchor,
    auto_banner_enabled: bool,

    banner_tx: watch::Sender<BannerState>,
    /// Lets delayed reloads come back through the command queue without
    /// keeping the actor alive.
    retry_tx: mpsc::WeakSender<ControllerCommand>,
}

pub(crate) struct CoreParts<A: AdNetworkAdapter> {
    pub(crate) adapter: A,
    pub(crate) policy: AdEligibilityPolicy,
    pub(crate) throttle: AutoAdThrottle,
    pub(crate) visibility: Option<Box<dyn VisibilityProbe>>,
    pub(crate) notifier: Option<Arc<dyn FailureNotifier>>,
    pub(crate) config: ControllerConfig,
    pub(crate) banner_tx: watch::Sender<BannerState>,
    pub(crate) retry_tx: mpsc::WeakSender<ControllerCommand>,
}

impl<A: AdNetworkAdapter> ControllerCore<A> {
    pub(crate) fn new(parts: CoreParts<A>) -> Self {
        let last_anchor = parts.config.initial_anchor;
        let auto_banner_enabled = parts.config.auto_banner_enabled;
        Self {
            adapter: parts.adapter,
            policy: parts.policy,
            throttle: parts.throttle,
            visibility: parts.visibility,
            notifier: parts.notifier,
            config: parts.config,
            full_screen: None,
            orphaned: Vec::new(),
            banner: BannerSlot::Hidden,
            last_anchor,
            auto_banner_enabled,
            banner_tx: parts.banner_tx,
            retry_tx: parts.retry_tx,
        }
    }

    pub(crate) fn auto_banner_enabled(&self) -> bool {
        self.auto_banner_enabled
    }

    /// When the open session gives up waiting for a close, if ever.
    pub(crate) fn session_deadline(&self) -> Option<Instant> {
        self.full_screen.as_ref().and_then(|s| s.deadline)
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    pub(crate) fn handle_command(&mut self, cmd: ControllerCommand) {
        match cmd {
            ControllerCommand::ShowAd { key, reply } => self.show_ad(key, Some(reply)),
            ControllerCommand::ChangeBannerPosition { anchor } => {
                self.change_banner_position(anchor)
            }
            ControllerCommand::CloseBanner { reply } => {
                let _ = reply.send(self.close_banner());
            }
            ControllerCommand::SetAutoBanner { enabled } => {
                tracing::info!(enabled, "auto-banner control toggled");
                self.auto_banner_enabled = enabled;
            }
            ControllerCommand::Status { reply } => {
                let _ = reply.send(self.status());
            }
            ControllerCommand::ReloadAd(kind) => {
                tracing::debug!(%kind, "retrying ad load");
                self.adapter.request_load(kind);
            }
            // Handled by the actor loop.
            ControllerCommand::Shutdown => {}
        }
    }

    /// Entry point for every show request, explicit or supervisor-driven.
    pub(crate) fn show_ad(&mut self, key: AdRequestKey, reply: Reply) {
        if self.policy.is_skippable(&key) {
            tracing::debug!(kind = %key.kind, "ad skipped by entitlement");
            respond(reply, AdOutcome::Skipped);
            return;
        }

        if key.kind == AdKind::Banner {
            self.show_banner(reply);
            return;
        }

        if let Some(open) = &self.full_screen {
            tracing::warn!(
                requested = %key.kind,
                open = %open.kind,
                "full-screen ad already open"
            );
            respond(reply, AdOutcome::failed(FailReason::AlreadyPlaying));
            return;
        }

        match self.open_full_screen(key.kind) {
            Ok(()) => {
                let deadline = self.config.full_screen_timeout().map(|t| Instant::now() + t);
                tracing::info!(kind = %key.kind, "full-screen ad requested");
                self.full_screen = Some(FullScreenSession::open(key.kind, reply, deadline));
            }
            Err(reason) => {
                tracing::info!(kind = %key.kind, %reason, "full-screen ad not shown");
                if let Some(notifier) = &self.notifier {
                    notifier.notify(reason);
                }
                respond(reply, AdOutcome::failed(reason));
            }
        }
    }

    fn open_full_screen(&mut self, kind: AdKind) -> Result<(), FailReason> {
        match kind {
            AdKind::Rewarded => {
                if self.adapter.show(kind) {
                    Ok(())
                } else {
                    Err(FailReason::NoFill)
                }
            }
            AdKind::Interstitial => {
                if !self.throttle.is_auto_show_allowed() {
                    return Err(FailReason::NotYetAutoAdTime);
                }
                if self.adapter.show(kind) {
                    Ok(())
                } else {
                    Err(FailReason::NoFill)
                }
            }
            AdKind::None | AdKind::Banner => {
                tracing::error!(%kind, "unsupported ad kind for full-screen display");
                Err(FailReason::DeveloperMistake)
            }
        }
    }

    fn show_banner(&mut self, reply: Reply) {
        if self.banner.phase() != BannerPhase::Hidden {
            tracing::warn!(phase = ?self.banner.phase(), "banner already open or requested");
            respond(reply, AdOutcome::failed(FailReason::AlreadyPlaying));
            return;
        }

        if self.adapter.banner_exists() {
            tracing::debug!("showing existing banner view");
            self.adapter.show_banner();
            respond(reply, AdOutcome::success(AdKind::Banner, false));
            return;
        }

        tracing::info!(anchor = %self.last_anchor, "requesting banner");
        self.banner = BannerSlot::Requesting { reply };
        self.adapter.request_banner(self.last_anchor);
    }

    pub(crate) fn change_banner_position(&mut self, anchor: Anchor) {
        self.last_anchor = anchor;
        if self.adapter.banner_exists() {
            self.adapter.change_banner_position(anchor);
        }
        let current = *self.banner_tx.borrow();
        self.publish(BannerState { anchor, ..current });
    }

    pub(crate) fn close_banner(&mut self) -> bool {
        if !self.adapter.banner_exists() {
            tracing::warn!("banner already closed");
            return false;
        }
        self.adapter.hide_banner();
        true
    }

    fn status(&self) -> ControllerStatus {
        ControllerStatus {
            full_screen: self.full_screen.as_ref().map(|s| (s.kind, s.phase)),
            banner: self.banner.phase(),
            last_anchor: self.last_anchor,
            auto_banner_enabled: self.auto_banner_enabled,
            banner_state: *self.banner_tx.borrow(),
        }
    }

    // -----------------------------------------------------------------------
    // Network events
    // -----------------------------------------------------------------------

    pub(crate) fn handle_event(&mut self, event: AdNetworkEvent) {
        tracing::trace!(?event, "ad network event");
        match event {
            AdNetworkEvent::Initialized => {
                tracing::info!("ad network initialized, preloading full-screen ads");
                self.adapter.request_load(AdKind::Interstitial);
                self.adapter.request_load(AdKind::Rewarded);
            }
            AdNetworkEvent::Loaded(kind) => tracing::debug!(%kind, "ad loaded"),
            AdNetworkEvent::LoadFailed { kind, failure } => self.on_load_failed(kind, failure),
            AdNetworkEvent::FullScreenOpened(kind) => match self.full_screen.as_mut() {
                Some(session) if session.kind == kind => {
                    session.phase = SessionPhase::Showing;
                    tracing::debug!(%kind, "full-screen ad on screen");
                }
                _ => tracing::warn!(%kind, "full-screen ad opened without a session"),
            },
            AdNetworkEvent::Impression(kind) => tracing::debug!(%kind, "ad impression recorded"),
            AdNetworkEvent::FullScreenClosed(kind) => self.finish_full_screen(kind, None),
            AdNetworkEvent::FullScreenShowFailed(kind) => {
                self.finish_full_screen(kind, Some(FailReason::Unknown))
            }
            AdNetworkEvent::RewardEarned => match self.full_screen.as_mut() {
                Some(session) if session.kind == AdKind::Rewarded => {
                    tracing::debug!("reward earned");
                    session.reward_granted = true;
                }
                _ => tracing::debug!("reward earned outside a rewarded session, ignoring"),
            },
            AdNetworkEvent::BannerLoaded(size) | AdNetworkEvent::BannerShown(size) => {
                self.on_banner_visible(size)
            }
            AdNetworkEvent::BannerHidden | AdNetworkEvent::BannerClosed => self.on_banner_gone(),
        }
    }

    /// Ends the session for `kind` (if it is the open one), then reloads.
    /// The reload happens after the caller has its outcome.
    fn finish_full_screen(&mut self, kind: AdKind, failure: Option<FailReason>) {
        if let Some(pos) = self.orphaned.iter().position(|k| *k == kind) {
            // The expired session finally ended. Its reload was already issued.
            self.orphaned.swap_remove(pos);
            tracing::debug!(%kind, "late close for an expired session, ignoring");
            return;
        }

        match self.full_screen.take() {
            Some(session) if session.kind == kind => match failure {
                None => {
                    let outcome = session.complete();
                    tracing::info!(%kind, ?outcome, "full-screen ad closed");
                }
                Some(reason) => {
                    tracing::warn!(%kind, %reason, "full-screen ad failed to show");
                    session.fail(AdOutcome::failed(reason));
                }
            },
            other => {
                self.full_screen = other;
                tracing::warn!(%kind, "full-screen close without a matching session");
            }
        }

        if kind.is_full_screen() {
            self.adapter.request_load(kind);
        }
    }

    fn on_load_failed(&mut self, kind: AdKind, failure: LoadFailure) {
        tracing::warn!(%kind, ?failure, "ad failed to load");
        if kind == AdKind::Banner {
            // A failed refresh of a live banner leaves it where it is.
            if self.banner.phase() == BannerPhase::Requesting {
                let outcome = AdOutcome::failed(failure.fail_reason());
                self.banner.settle(BannerSlot::Hidden, outcome);
                // Drop the dead view so the next request loads a fresh one.
                self.adapter.destroy(AdKind::Banner);
            }
            return;
        }
        if kind.is_full_screen() {
            self.schedule_reload(kind);
        }
    }

    fn schedule_reload(&self, kind: AdKind) {
        let Some(delay) = self.config.load_retry_delay() else {
            return;
        };
        let retry_tx = self.retry_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = retry_tx.upgrade() {
                let _ = tx.send(ControllerCommand::ReloadAd(kind)).await;
            }
        });
    }

    fn on_banner_visible(&mut self, size: BannerSize) {
        if self
            .banner
            .settle(BannerSlot::Shown, AdOutcome::success(AdKind::Banner, false))
        {
            tracing::info!("requested banner is on screen");
        }
        // The anchor may have changed while the view was loading.
        self.adapter.change_banner_position(self.last_anchor);
        self.publish(BannerState::open(size, self.last_anchor));
    }

    fn on_banner_gone(&mut self) {
        // A hide that races an in-flight load leaves the request waiting.
        if self.banner.phase() == BannerPhase::Shown {
            self.banner = BannerSlot::Hidden;
        }
        self.publish(BannerState::closed(self.last_anchor));
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// The open session outlived the safety timeout.
    pub(crate) fn expire_session(&mut self) {
        let Some(session) = self.full_screen.take() else {
            return;
        };
        let kind = session.kind;
        tracing::warn!(%kind, "full-screen ad never closed, giving up");
        session.fail(AdOutcome::failed(FailReason::Unknown));
        self.orphaned.push(kind);
        self.adapter.request_load(kind);
    }

    /// One auto-banner supervisor pass.
    pub(crate) fn supervise(&mut self) {
        if !self.auto_banner_enabled {
            return;
        }
        let Some(probe) = &self.visibility else {
            return;
        };
        let wanted = probe.sample().allows_banner() && !self.policy.holds(REMOVE_ADS_1);

        match (wanted, self.banner.phase()) {
            (true, BannerPhase::Hidden) => self.show_ad(keys::BANNER, None),
            (false, BannerPhase::Shown) => {
                tracing::debug!("banner no longer allowed, hiding");
                self.adapter.hide_banner();
            }
            _ => {}
        }
    }

    /// Releases every network resource. Called once when the actor stops.
    pub(crate) fn teardown(&mut self) {
        self.adapter.destroy(AdKind::Interstitial);
        self.adapter.destroy(AdKind::Rewarded);
        self.adapter.destroy(AdKind::Banner);
    }

    fn publish(&self, state: BannerState) {
        self.banner_tx.send_replace(state);
    }
}

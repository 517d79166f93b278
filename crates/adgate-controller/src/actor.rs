//! The controller actor: command plumbing, the run loop, and the public
//! handle.
//!
//! One Tokio task owns a [`ControllerCore`] and serializes everything that
//! touches it. Four things can wake it, checked in this order:
//!
//! 1. an ad network event,
//! 2. a command from an [`AdHandle`],
//! 3. the open full-screen session's safety deadline,
//! 4. the auto-banner supervisor tick.
//!
//! Events come first so a close that is already queued is applied before a
//! new show request sees the session.

use std::sync::Arc;

use adgate_core::{AdEligibilityPolicy, AdKind, AdOutcome, AdRequestKey};
use adgate_network::{AdEventReceiver, AdNetworkAdapter, Anchor};
use adgate_throttle::AutoAdThrottle;
use adgate_tick::{TickConfig, TickScheduler};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};

use crate::banner::{BannerPhase, BannerState};
use crate::controller::{ControllerCore, CoreParts};
use crate::{ControllerConfig, ControllerError, FailureNotifier, SessionPhase, VisibilityProbe};

/// Commands sent to the actor through its channel.
pub(crate) enum ControllerCommand {
    ShowAd {
        key: AdRequestKey,
        reply: oneshot::Sender<AdOutcome>,
    },
    ChangeBannerPosition {
        anchor: Anchor,
    },
    CloseBanner {
        reply: oneshot::Sender<bool>,
    },
    SetAutoBanner {
        enabled: bool,
    },
    Status {
        reply: oneshot::Sender<ControllerStatus>,
    },
    /// A delayed retry after a failed load.
    ReloadAd(AdKind),
    Shutdown,
}

/// Snapshot of the controller's state, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControllerStatus {
    /// The open full-screen session, if any.
    pub full_screen: Option<(AdKind, SessionPhase)>,
    pub banner: BannerPhase,
    pub last_anchor: Anchor,
    pub auto_banner_enabled: bool,
    pub banner_state: BannerState,
}

/// Handle to a running controller.
///
/// Cheap to clone. The controller stops when [`shutdown`](Self::shutdown)
/// is called or the last handle is dropped.
#[derive(Debug, Clone)]
pub struct AdHandle {
    commands: mpsc::Sender<ControllerCommand>,
    banner: watch::Receiver<BannerState>,
}

impl AdHandle {
    /// Requests an ad and waits for its outcome.
    ///
    /// For full-screen ads this resolves when the ad is closed, which can
    /// be tens of seconds later. Dropping the future is allowed; the ad
    /// still plays and the outcome is discarded.
    pub async fn show_ad(&self, key: AdRequestKey) -> Result<AdOutcome, ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(ControllerCommand::ShowAd { key, reply }).await?;
        rx.await.map_err(|_| ControllerError::Cancelled)
    }

    /// Moves the banner to `anchor` and remembers it for later requests.
    pub async fn change_banner_position(&self, anchor: Anchor) -> Result<(), ControllerError> {
        self.send(ControllerCommand::ChangeBannerPosition { anchor })
            .await
    }

    /// Hides the banner. `Ok(false)` if there was no banner to hide.
    pub async fn close_banner(&self) -> Result<bool, ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(ControllerCommand::CloseBanner { reply }).await?;
        rx.await.map_err(|_| ControllerError::Cancelled)
    }

    /// Turns the auto-banner supervisor on or off.
    pub async fn set_auto_banner_control(&self, enabled: bool) -> Result<(), ControllerError> {
        self.send(ControllerCommand::SetAutoBanner { enabled }).await
    }

    pub async fn status(&self) -> Result<ControllerStatus, ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(ControllerCommand::Status { reply }).await?;
        rx.await.map_err(|_| ControllerError::Cancelled)
    }

    /// A receiver that sees every banner state change.
    pub fn subscribe_banner(&self) -> watch::Receiver<BannerState> {
        self.banner.clone()
    }

    /// The most recently published banner state.
    pub fn banner_state(&self) -> BannerState {
        *self.banner.borrow()
    }

    /// Stops the controller. Callers still waiting on an outcome receive
    /// [`ControllerError::Cancelled`].
    pub async fn shutdown(&self) -> Result<(), ControllerError> {
        self.send(ControllerCommand::Shutdown).await
    }

    async fn send(&self, cmd: ControllerCommand) -> Result<(), ControllerError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| ControllerError::Unavailable)
    }
}

/// Everything a controller is built from.
pub struct ControllerParts<A: AdNetworkAdapter> {
    pub adapter: A,
    /// The receiving end of the queue `adapter` posts to.
    pub events: AdEventReceiver,
    pub policy: AdEligibilityPolicy,
    pub throttle: AutoAdThrottle,
    /// Without a probe the auto-banner supervisor never shows anything.
    pub visibility: Option<Box<dyn VisibilityProbe>>,
    pub notifier: Option<Arc<dyn FailureNotifier>>,
    pub config: ControllerConfig,
}

impl<A: AdNetworkAdapter> ControllerParts<A> {
    pub fn new(
        adapter: A,
        events: AdEventReceiver,
        policy: AdEligibilityPolicy,
        throttle: AutoAdThrottle,
    ) -> Self {
        Self {
            adapter,
            events,
            policy,
            throttle,
            visibility: None,
            notifier: None,
            config: ControllerConfig::default(),
        }
    }

    pub fn with_visibility(mut self, probe: impl VisibilityProbe) -> Self {
        self.visibility = Some(Box::new(probe));
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn FailureNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }
}

struct ControllerActor<A: AdNetworkAdapter> {
    core: ControllerCore<A>,
    commands: mpsc::Receiver<ControllerCommand>,
    events: AdEventReceiver,
    ticker: TickScheduler,
}

impl<A: AdNetworkAdapter> ControllerActor<A> {
    async fn run(self) {
        let Self {
            mut core,
            mut commands,
            mut events,
            mut ticker,
        } = self;
        let mut events_open = true;

        tracing::info!("ad controller started");

        loop {
            let deadline = core.session_deadline();

            tokio::select! {
                biased;

                event = events.recv(), if events_open => match event {
                    Some(event) => core.handle_event(event),
                    None => {
                        tracing::warn!("ad network event queue closed");
                        events_open = false;
                    }
                },

                cmd = commands.recv() => match cmd {
                    Some(ControllerCommand::Shutdown) => {
                        tracing::info!("ad controller shutting down");
                        break;
                    }
                    Some(cmd) => {
                        core.handle_command(cmd);
                        if core.auto_banner_enabled() {
                            ticker.resume();
                        } else {
                            ticker.pause();
                        }
                    }
                    None => {
                        tracing::info!("all ad handles dropped");
                        break;
                    }
                },

                _ = sleep_until_deadline(deadline) => core.expire_session(),

                _ = ticker.wait_for_tick() => core.supervise(),
            }
        }

        core.teardown();
        tracing::info!("ad controller stopped");
        // Dropping `core` and `commands` drops every pending reply sender.
    }
}

async fn sleep_until_deadline(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Initializes the adapter and spawns the controller task.
///
/// Must be called from inside a Tokio runtime. Fails if the network adapter
/// cannot start; the controller is not spawned in that case.
pub fn spawn_controller<A: AdNetworkAdapter>(
    parts: ControllerParts<A>,
) -> Result<AdHandle, ControllerError> {
    let ControllerParts {
        mut adapter,
        events,
        policy,
        throttle,
        visibility,
        notifier,
        config,
    } = parts;
    let config = config.validated();

    if let Err(e) = adapter.initialize() {
        tracing::error!(error = %e, "ad network failed to initialize");
        return Err(e.into());
    }

    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_channel_size);
    let (banner_tx, banner_rx) = watch::channel(BannerState::closed(config.initial_anchor));

    let mut ticker = TickScheduler::new(TickConfig::with_rate(config.supervisor_tick_hz));
    if !config.auto_banner_enabled {
        ticker.pause();
    }

    let core = ControllerCore::new(CoreParts {
        adapter,
        policy,
        throttle,
        visibility,
        notifier,
        config,
        banner_tx,
        retry_tx: cmd_tx.downgrade(),
    });

    let actor = ControllerActor {
        core,
        commands: cmd_rx,
        events,
        ticker,
    };
    tokio::spawn(actor.run());

    Ok(AdHandle {
        commands: cmd_tx,
        banner: banner_rx,
    })
}

//! An in-process ad network for demos and local development.
//!
//! Loads succeed with a configurable probability after a fixed latency,
//! full-screen ads "play" for a fixed duration and then close, and the
//! banner reports a fixed size. All timing runs on Tokio timers, so a
//! paused test runtime drives it deterministically.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use adgate_core::AdKind;
use rand::Rng;

use crate::{
    AdEventSender, AdNetworkAdapter, AdNetworkEvent, AdapterError, Anchor, BannerSize, LoadFailure,
};

/// Knobs for [`SimulatedNetwork`].
#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    /// Probability (0.0–1.0) that a load produces an ad.
    pub fill_rate: f64,
    /// Probability (0.0–1.0) that a rewarded viewer finishes the ad.
    pub completion_rate: f64,
    pub load_latency: Duration,
    /// How long a full-screen ad stays open before closing itself.
    pub ad_duration: Duration,
    pub banner_size: BannerSize,
    /// When set, `initialize` fails with this message.
    pub init_failure: Option<String>,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            fill_rate: 0.9,
            completion_rate: 0.8,
            load_latency: Duration::from_millis(300),
            ad_duration: Duration::from_secs(2),
            banner_size: BannerSize::new(1080.0, 168.0),
            init_failure: None,
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    loaded: HashSet<AdKind>,
    banner: Option<BannerView>,
}

#[derive(Debug, Clone, Copy)]
struct BannerView {
    anchor: Anchor,
    visible: bool,
    loaded: bool,
}

/// A fake ad network that behaves like a mediation SDK.
pub struct SimulatedNetwork {
    config: SimulatedConfig,
    events: AdEventSender,
    /// Shared with the timer tasks that finish loads.
    state: Arc<Mutex<SimState>>,
}

impl SimulatedNetwork {
    pub fn new(config: SimulatedConfig, events: AdEventSender) -> Self {
        Self {
            config,
            events,
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    /// Whether a full-screen ad of `kind` is loaded and waiting.
    pub fn is_ready(&self, kind: AdKind) -> bool {
        self.lock().loaded.contains(&kind)
    }

    /// Where the banner view is docked, if one exists.
    pub fn banner_anchor(&self) -> Option<Anchor> {
        self.lock().banner.map(|b| b.anchor)
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn roll(probability: f64) -> bool {
        rand::rng().random_bool(probability.clamp(0.0, 1.0))
    }
}

impl AdNetworkAdapter for SimulatedNetwork {
    fn initialize(&mut self) -> Result<(), AdapterError> {
        if let Some(reason) = &self.config.init_failure {
            return Err(AdapterError::InitFailed(reason.clone()));
        }
        tracing::info!(fill_rate = self.config.fill_rate, "simulated ad network initialized");
        self.events.post(AdNetworkEvent::Initialized);
        Ok(())
    }

    fn request_load(&mut self, kind: AdKind) {
        tracing::debug!(%kind, "simulated load requested");
        self.lock().loaded.remove(&kind);

        let events = self.events.clone();
        let state = Arc::clone(&self.state);
        let latency = self.config.load_latency;
        let filled = Self::roll(self.config.fill_rate);
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            if filled {
                state
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .loaded
                    .insert(kind);
                events.post(AdNetworkEvent::Loaded(kind));
            } else {
                events.post(AdNetworkEvent::LoadFailed {
                    kind,
                    failure: LoadFailure::NoFill,
                });
            }
        });
    }

    fn show(&mut self, kind: AdKind) -> bool {
        if !self.lock().loaded.remove(&kind) {
            tracing::debug!(%kind, "simulated ad not ready");
            return false;
        }

        self.events.post(AdNetworkEvent::FullScreenOpened(kind));
        self.events.post(AdNetworkEvent::Impression(kind));

        let events = self.events.clone();
        let duration = self.config.ad_duration;
        let completed = kind == AdKind::Rewarded && Self::roll(self.config.completion_rate);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if completed {
                events.post(AdNetworkEvent::RewardEarned);
            }
            events.post(AdNetworkEvent::FullScreenClosed(kind));
        });
        true
    }

    fn destroy(&mut self, kind: AdKind) {
        let mut state = self.lock();
        if kind == AdKind::Banner {
            if state.banner.take().is_some() {
                self.events.post(AdNetworkEvent::BannerClosed);
            }
        } else {
            state.loaded.remove(&kind);
        }
    }

    fn request_banner(&mut self, anchor: Anchor) {
        tracing::debug!(%anchor, "simulated banner requested");
        self.lock().banner = Some(BannerView {
            anchor,
            visible: false,
            loaded: false,
        });

        let events = self.events.clone();
        let state = Arc::clone(&self.state);
        let latency = self.config.load_latency;
        let size = self.config.banner_size;
        let filled = Self::roll(self.config.fill_rate);
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            if !filled {
                events.post(AdNetworkEvent::LoadFailed {
                    kind: AdKind::Banner,
                    failure: LoadFailure::NoFill,
                });
                return;
            }
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(view) = state.banner.as_mut() {
                view.loaded = true;
                view.visible = true;
                events.post(AdNetworkEvent::BannerLoaded(size));
            }
        });
    }

    fn show_banner(&mut self) {
        let size = self.config.banner_size;
        let mut state = self.lock();
        if let Some(view) = state.banner.as_mut() {
            view.visible = true;
            if view.loaded {
                self.events.post(AdNetworkEvent::BannerShown(size));
            }
        }
    }

    fn hide_banner(&mut self) {
        let mut state = self.lock();
        if let Some(view) = state.banner.as_mut() {
            view.visible = false;
            self.events.post(AdNetworkEvent::BannerHidden);
        }
    }

    fn change_banner_position(&mut self, anchor: Anchor) {
        if let Some(view) = self.lock().banner.as_mut() {
            view.anchor = anchor;
        }
    }

    fn banner_exists(&self) -> bool {
        self.lock().banner.is_some()
    }
}

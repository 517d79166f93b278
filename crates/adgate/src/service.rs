//! `AdService` builder and facade.
//!
//! This is the entry point for an app: it wires entitlements, the throttle
//! store, the network adapter, and the visibility probe into one running
//! controller and hands back a service object that speaks [`AdgateError`].

use std::path::Path;
use std::sync::Arc;

use adgate_controller::{
    AdHandle, BannerState, ControllerError, ControllerParts, ControllerStatus, FailureNotifier,
    VisibilityProbe, spawn_controller,
};
use adgate_core::{
    AdEligibilityPolicy, AdOutcome, AdRequestKey, EntitlementStore, InMemoryEntitlements,
};
use adgate_network::{AdEventReceiver, AdNetworkAdapter, Anchor};
use adgate_throttle::{AutoAdThrottle, Clock, JsonFileStore, KeyValueStore, MemoryStore};
use tokio::sync::watch;

use crate::{AdgateConfig, AdgateError};

/// Builder for configuring and starting an [`AdService`].
///
/// # Example
///
/// ```rust,ignore
/// use adgate::prelude::*;
///
/// let service = AdService::builder()
///     .config(config)
///     .entitlements(purchases)
///     .persist_to("save/ads.json")?
///     .visibility(move || game.visibility())
///     .build(my_adapter, events)?;
/// ```
pub struct AdServiceBuilder {
    config: AdgateConfig,
    entitlements: Option<Arc<dyn EntitlementStore>>,
    store: Option<Box<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
    visibility: Option<Box<dyn VisibilityProbe>>,
    notifier: Option<Arc<dyn FailureNotifier>>,
}

impl AdServiceBuilder {
    /// Creates a builder with default settings: no entitlements held, an
    /// in-memory throttle store, no visibility probe.
    pub fn new() -> Self {
        Self {
            config: AdgateConfig::default(),
            entitlements: None,
            store: None,
            clock: None,
            visibility: None,
            notifier: None,
        }
    }

    pub fn config(mut self, config: AdgateConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets where purchased entitlements are looked up.
    pub fn entitlements(mut self, store: Arc<dyn EntitlementStore>) -> Self {
        self.entitlements = Some(store);
        self
    }

    /// Sets where the throttle persists its timestamp.
    pub fn store(mut self, store: impl KeyValueStore) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Persists the throttle timestamp in a JSON file at `path`.
    pub fn persist_to(self, path: impl AsRef<Path>) -> Result<Self, AdgateError> {
        let store = JsonFileStore::open(path)?;
        Ok(self.store(store))
    }

    /// Replaces the wall clock the throttle reads.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Enables the auto-banner supervisor with this probe.
    pub fn visibility(mut self, probe: impl VisibilityProbe) -> Self {
        self.visibility = Some(Box::new(probe));
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn FailureNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Initializes `adapter` and starts the controller.
    ///
    /// `events` must be the receiving end of the queue `adapter` posts to.
    /// Must be called from inside a Tokio runtime.
    pub fn build<A: AdNetworkAdapter>(
        self,
        adapter: A,
        events: AdEventReceiver,
    ) -> Result<AdService, AdgateError> {
        let entitlements = self
            .entitlements
            .unwrap_or_else(|| Arc::new(InMemoryEntitlements::new()));
        let policy = AdEligibilityPolicy::new(entitlements);

        let store = self.store.unwrap_or_else(|| Box::new(MemoryStore::new()));
        let mut throttle = AutoAdThrottle::new(self.config.throttle, store, policy.clone());
        if let Some(clock) = self.clock {
            throttle = throttle.with_clock(clock);
        }

        let parts = ControllerParts {
            adapter,
            events,
            policy,
            throttle,
            visibility: self.visibility,
            notifier: self.notifier,
            config: self.config.controller,
        };
        let handle = spawn_controller(parts).map_err(|e| match e {
            ControllerError::Adapter(e) => AdgateError::Adapter(e),
            other => AdgateError::Controller(other),
        })?;
        tracing::info!("ad service started");
        Ok(AdService { handle })
    }

    /// Builds against an in-process [`SimulatedNetwork`](adgate_network::SimulatedNetwork).
    #[cfg(feature = "simulated")]
    pub fn build_simulated(
        self,
        network: adgate_network::SimulatedConfig,
    ) -> Result<AdService, AdgateError> {
        let (tx, rx) = adgate_network::event_channel();
        let adapter = adgate_network::SimulatedNetwork::new(network, tx);
        self.build(adapter, rx)
    }
}

impl Default for AdServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running ad service.
///
/// Cheap to clone; every clone drives the same controller. The controller
/// stops on [`shutdown`](Self::shutdown) or when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct AdService {
    handle: AdHandle,
}

impl AdService {
    pub fn builder() -> AdServiceBuilder {
        AdServiceBuilder::new()
    }

    /// Requests the ad described by `key` and waits for its outcome.
    pub async fn show_ad(&self, key: AdRequestKey) -> Result<AdOutcome, AdgateError> {
        Ok(self.handle.show_ad(key).await?)
    }

    pub async fn change_banner_position(&self, anchor: Anchor) -> Result<(), AdgateError> {
        Ok(self.handle.change_banner_position(anchor).await?)
    }

    /// Hides the banner. `Ok(false)` when there was none.
    pub async fn close_banner(&self) -> Result<bool, AdgateError> {
        Ok(self.handle.close_banner().await?)
    }

    pub async fn set_auto_banner_control(&self, enabled: bool) -> Result<(), AdgateError> {
        Ok(self.handle.set_auto_banner_control(enabled).await?)
    }

    pub async fn status(&self) -> Result<ControllerStatus, AdgateError> {
        Ok(self.handle.status().await?)
    }

    pub fn subscribe_banner(&self) -> watch::Receiver<BannerState> {
        self.handle.subscribe_banner()
    }

    pub fn banner_state(&self) -> BannerState {
        self.handle.banner_state()
    }

    pub async fn shutdown(&self) -> Result<(), AdgateError> {
        Ok(self.handle.shutdown().await?)
    }

    /// The underlying controller handle.
    pub fn handle(&self) -> &AdHandle {
        &self.handle
    }
}

//! # adgate
//!
//! Ad lifecycle orchestration for mobile games.
//!
//! adgate decides whether an ad request may be skipped, enforces the global
//! cooldown between automatic interstitials, keeps at most one full-screen
//! ad open at a time, drives the banner through its load/show/hide cycle,
//! and reports every request back as an [`AdOutcome`](adgate_core::AdOutcome).
//! The network itself sits behind the
//! [`AdNetworkAdapter`](adgate_network::AdNetworkAdapter) trait.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adgate::prelude::*;
//!
//! # async fn run() -> Result<(), AdgateError> {
//! adgate::logging::init("info");
//!
//! let service = AdService::builder()
//!     .config(AdgateConfig::from_file("adgate.json")?)
//!     .build_simulated(SimulatedConfig::default())?;
//!
//! match service.show_ad(keys::DAILY_COIN).await? {
//!     outcome if outcome.grants_reward() => { /* pay out */ }
//!     _ => {}
//! }
//! service.shutdown().await
//! # }
//! ```

mod config;
mod error;
pub mod logging;
mod service;

pub use config::AdgateConfig;
pub use error::AdgateError;
pub use service::{AdService, AdServiceBuilder};

pub use adgate_controller as controller;
pub use adgate_core as core;
pub use adgate_network as network;
pub use adgate_throttle as throttle;

pub mod prelude {
    pub use crate::{AdService, AdServiceBuilder, AdgateConfig, AdgateError};

    pub use adgate_core::{
        AdKind, AdOutcome, AdRequestKey, EntitlementId, EntitlementStore, FailReason,
        InMemoryEntitlements, REMOVE_ADS_1, REMOVE_ADS_2, SkipPolicy, keys,
    };

    pub use adgate_network::{AdNetworkAdapter, AdNetworkEvent, Anchor, BannerSize};

    #[cfg(feature = "simulated")]
    pub use adgate_network::{SimulatedConfig, SimulatedNetwork};

    pub use adgate_controller::{
        BannerState, ControllerConfig, FailureNotifier, Scene, VisibilityProbe, VisibilitySnapshot,
    };

    pub use adgate_throttle::{JsonFileStore, KeyValueStore, MemoryStore, ThrottleConfig};
}

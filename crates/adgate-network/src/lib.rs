//! Ad network abstraction layer for adgate.
//!
//! Provides the [`AdNetworkAdapter`] trait that a concrete mediation SDK
//! binding implements, and the event queue ([`AdEventSender`] /
//! [`AdEventReceiver`]) through which the SDK reports back.
//!
//! SDK callbacks may fire on any thread. They never touch controller state
//! directly: they post an [`AdNetworkEvent`], and the controller drains the
//! queue on its own task.
//!
//! # Feature Flags
//!
//! - `simulated` (default): [`SimulatedNetwork`], an in-process network
//!   with random fill and timed ads, for demos and local development.

mod adapter;
mod banner;
mod error;
mod event;
#[cfg(feature = "simulated")]
mod simulated;

pub use adapter::AdNetworkAdapter;
pub use banner::{Anchor, BannerSize};
pub use error::AdapterError;
pub use event::{AdEventReceiver, AdEventSender, AdNetworkEvent, LoadFailure, event_channel};
#[cfg(feature = "simulated")]
pub use simulated::{SimulatedConfig, SimulatedNetwork};

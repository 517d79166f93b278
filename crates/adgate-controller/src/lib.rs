//! Ad lifecycle controller for adgate.
//!
//! The controller runs as an isolated Tokio task (actor model) that owns
//! every piece of mutable ad state: the open full-screen session, the banner
//! sub-state, the last banner anchor, and the network adapter itself.
//! Callers talk to it through a cloneable [`AdHandle`]; the network talks
//! to it by posting events on its queue. Nothing is locked; ordering comes
//! from the single task draining both channels.
//!
//! # Key types
//!
//! - [`spawn_controller`] / [`ControllerParts`]: start a controller
//! - [`AdHandle`]: show ads, move/close the banner, observe [`BannerState`]
//! - [`ControllerConfig`]: supervisor rate, safety timeout, load retry
//! - [`VisibilitySnapshot`] / [`VisibilityProbe`]: input to the
//!   auto-banner supervisor
//!
//! # Lifecycle
//!
//! One controller per process. It lives until [`AdHandle::shutdown`] is
//! called or every handle is dropped; pending callers then receive
//! [`ControllerError::Cancelled`].

mod actor;
mod banner;
mod config;
mod controller;
mod error;
mod notify;
mod session;
mod visibility;

pub use actor::{AdHandle, ControllerParts, ControllerStatus, spawn_controller};
pub use banner::{BannerPhase, BannerState};
pub use config::ControllerConfig;
pub use error::ControllerError;
pub use notify::FailureNotifier;
pub use session::SessionPhase;
pub use visibility::{Scene, VisibilityFeed, VisibilityProbe, VisibilitySnapshot, visibility_feed};

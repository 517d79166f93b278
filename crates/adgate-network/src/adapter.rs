//! The adapter trait a mediation SDK binding implements.

use adgate_core::AdKind;

use crate::{AdapterError, Anchor};

/// Load/show/destroy primitives for one ad network.
///
/// # Threading
///
/// Every method is called from the controller task only, so the adapter
/// needs `Send` but not `Sync`. Results that arrive later (loads finishing,
/// ads closing) are reported by posting an [`AdNetworkEvent`](crate::AdNetworkEvent)
/// on the [`AdEventSender`](crate::AdEventSender) the adapter was built with.
///
/// # Reload-on-close
///
/// Adapters do not reload on their own. The controller issues a fresh
/// [`request_load`](Self::request_load) right after a full-screen ad closes
/// or fails to show, once the caller's outcome has been resolved.
pub trait AdNetworkAdapter: Send + 'static {
    /// Starts the SDK. Must eventually post `Initialized` on success.
    fn initialize(&mut self) -> Result<(), AdapterError>;

    /// Starts loading a full-screen ad of `kind`. Completion is reported
    /// with `Loaded` or `LoadFailed`.
    fn request_load(&mut self, kind: AdKind);

    /// Shows a loaded full-screen ad. Returns `false` when nothing of that
    /// kind is ready.
    fn show(&mut self, kind: AdKind) -> bool;

    /// Releases whatever the network holds for `kind`.
    fn destroy(&mut self, kind: AdKind);

    /// Creates (or recreates) the banner view at `anchor` and loads it.
    /// Reported with `BannerLoaded` or `LoadFailed { kind: Banner, .. }`.
    fn request_banner(&mut self, anchor: Anchor);

    /// Makes an existing banner view visible. Reported with `BannerShown`.
    fn show_banner(&mut self);

    /// Hides the banner view without destroying it. Reported with
    /// `BannerHidden`.
    fn hide_banner(&mut self);

    /// Moves the live banner view without reloading it.
    fn change_banner_position(&mut self, anchor: Anchor);

    /// Whether a banner view currently exists (visible or not).
    fn banner_exists(&self) -> bool;
}

//! Hook for surfacing failures to the player.

use adgate_core::FailReason;

/// Receives the reason whenever a full-screen ad could not be opened.
///
/// Typically backed by the localization layer, which turns the reason code
/// into a toast. adgate supplies the code only.
pub trait FailureNotifier: Send + Sync + 'static {
    fn notify(&self, reason: FailReason);
}

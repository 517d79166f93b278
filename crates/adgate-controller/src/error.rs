//! Error types for the controller layer.

use adgate_network::AdapterError;

/// Infrastructure failures between a caller and the controller task.
///
/// Ad failures are not here: they are [`AdOutcome::Failed`](adgate_core::AdOutcome)
/// values. A caller that gets `Err` never learned what happened to the ad.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The controller task has stopped and accepts no more commands.
    #[error("ad controller is unavailable")]
    Unavailable,

    /// The controller stopped while this request was waiting. No outcome
    /// was produced.
    #[error("ad request was cancelled before it resolved")]
    Cancelled,

    /// The network adapter failed to start.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

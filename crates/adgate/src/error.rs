//! Unified error type for adgate.

use adgate_controller::ControllerError;
use adgate_core::StoreError;
use adgate_network::AdapterError;

/// Top-level error wrapping every crate-specific error.
///
/// Ad failures (no fill, throttled, already playing) are not errors; they
/// come back as [`AdOutcome::Failed`](adgate_core::AdOutcome). This type
/// only covers infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum AdgateError {
    /// Entitlement or persistence store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The ad network failed to start.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// The controller stopped or dropped a request.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// The configuration document is not valid JSON for [`AdgateConfig`](crate::AdgateConfig).
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

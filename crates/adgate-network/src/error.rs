//! Error types for the network layer.

/// Errors raised by an adapter outside the per-request path.
///
/// Per-request problems (no fill, failed show) are events, not errors.
/// This type only covers failures that make the adapter unusable.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The SDK refused to start (bad app id, missing consent, ...).
    #[error("ad network initialization failed: {0}")]
    InitFailed(String),
}

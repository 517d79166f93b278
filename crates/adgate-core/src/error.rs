//! Error types shared by the storage collaborators.

/// Errors raised by the external stores adgate reads from and writes to
/// (entitlements, persisted key-value pairs).
///
/// None of these ever reach an ad caller directly: entitlement failures are
/// folded into "not held", and throttle persistence failures are logged.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached (lock poisoned, service down).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing file failed.
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data could not be decoded.
    #[error("store data is corrupt: {0}")]
    Corrupt(String),
}

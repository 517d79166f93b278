//! `tracing` subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a formatting subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter` (for example `"info"` or `"adgate_controller=debug"`).
///
/// Returns `false` if a global subscriber was already installed; the
/// existing one is left in place.
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .is_ok()
}

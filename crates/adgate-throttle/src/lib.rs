//! Automatic-ad throttling for adgate.
//!
//! Interstitials are shown without the player asking for them, so they are
//! rate limited by [`AutoAdThrottle`]: a single, process-global window that
//! survives restarts through a [`KeyValueStore`].
//!
//! Time comes from a [`Clock`] so tests can pin it with [`ManualClock`].

mod clock;
mod config;
mod store;
mod throttle;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ThrottleConfig;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use throttle::AutoAdThrottle;

//! The automatic-interstitial throttle.
//!
//! A leaky bucket of size one, shared by every automatic call site:
//!
//! ```text
//!   no timestamp ──(allow, record now)──→ window open
//!   elapsed <  interval  → deny, nothing written
//!   elapsed >= interval  → allow, record now
//! ```
//!
//! Owners of the first remove-ads entitlement never see automatic ads.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use adgate_core::{AdEligibilityPolicy, REMOVE_ADS_1};

use crate::{Clock, KeyValueStore, SystemClock, ThrottleConfig};

/// Gate consulted before every automatic interstitial.
pub struct AutoAdThrottle {
    config: ThrottleConfig,
    store: Box<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    policy: AdEligibilityPolicy,
    /// Write-through copy of the persisted timestamp.
    last_shown: Option<SystemTime>,
}

impl AutoAdThrottle {
    /// Creates a throttle and loads the persisted timestamp from `store`.
    pub fn new(
        config: ThrottleConfig,
        store: Box<dyn KeyValueStore>,
        policy: AdEligibilityPolicy,
    ) -> Self {
        let config = config.validated();
        let last_shown = load_timestamp(store.as_ref(), &config.storage_key);
        Self {
            config,
            store,
            clock: Arc::new(SystemClock),
            policy,
            last_shown,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn interval(&self) -> Duration {
        self.config.interval()
    }

    /// When the last automatic ad was allowed, if ever.
    pub fn last_auto_show(&self) -> Option<SystemTime> {
        self.last_shown
    }

    /// Returns whether an automatic interstitial may be shown now.
    ///
    /// Allowing consumes the window: the timestamp is reset to now no
    /// matter which call site asked. Denying never writes.
    pub fn is_auto_show_allowed(&mut self) -> bool {
        if self.policy.holds(REMOVE_ADS_1) {
            tracing::debug!("automatic ads disabled by entitlement");
            return false;
        }

        let now = self.clock.now();
        let Some(last) = self.last_shown else {
            tracing::debug!("first automatic ad, seeding throttle window");
            self.record(now);
            return true;
        };

        // A clock that went backwards reads as "no time has passed".
        let elapsed = now.duration_since(last).unwrap_or(Duration::ZERO);
        if elapsed < self.config.interval() {
            tracing::debug!(
                elapsed_secs = elapsed.as_secs(),
                interval_secs = self.config.auto_ad_interval_secs,
                "automatic ad throttled"
            );
            return false;
        }

        self.record(now);
        true
    }

    fn record(&mut self, now: SystemTime) {
        self.last_shown = Some(now);
        let millis = now
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        if let Err(e) = self
            .store
            .set_string(&self.config.storage_key, &millis.to_string())
        {
            tracing::warn!(error = %e, "failed to persist automatic ad timestamp");
        }
    }
}

impl std::fmt::Debug for AutoAdThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoAdThrottle")
            .field("config", &self.config)
            .field("last_shown", &self.last_shown)
            .finish_non_exhaustive()
    }
}

/// Reads the persisted timestamp. `"0"`, missing, and garbage all mean
/// "never shown".
fn load_timestamp(store: &dyn KeyValueStore, key: &str) -> Option<SystemTime> {
    let raw = match store.get_string(key, "0") {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read automatic ad timestamp");
            return None;
        }
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(millis) => Some(UNIX_EPOCH + Duration::from_millis(millis)),
        Err(_) => {
            tracing::warn!(value = %raw, "unparsable automatic ad timestamp, ignoring");
            None
        }
    }
}

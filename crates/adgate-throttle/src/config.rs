//! Throttle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for [`AutoAdThrottle`](crate::AutoAdThrottle).
///
/// The interval is normally supplied by remote config; the default is a
/// conservative three minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Minimum seconds between two automatic interstitials.
    pub auto_ad_interval_secs: u64,

    /// Key under which the last-shown timestamp is persisted.
    pub storage_key: String,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            auto_ad_interval_secs: 180,
            storage_key: "LastAutoAdShownTime".to_string(),
        }
    }
}

impl ThrottleConfig {
    pub fn with_interval_secs(auto_ad_interval_secs: u64) -> Self {
        Self {
            auto_ad_interval_secs,
            ..Default::default()
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.auto_ad_interval_secs)
    }

    /// Fixes values that would make the throttle unusable.
    pub fn validated(mut self) -> Self {
        if self.storage_key.trim().is_empty() {
            tracing::warn!("throttle storage_key is empty, using default");
            self.storage_key = Self::default().storage_key;
        }
        self
    }
}

//! Service configuration, loaded from JSON.

use std::path::Path;

use adgate_controller::ControllerConfig;
use adgate_throttle::ThrottleConfig;
use serde::{Deserialize, Serialize};

use crate::AdgateError;

/// Everything an [`AdService`](crate::AdService) is configured with.
///
/// Every field is optional in the JSON document:
///
/// ```json
/// {
///   "controller": { "supervisor_tick_hz": 2, "full_screen_timeout_secs": 120 },
///   "throttle": { "auto_ad_interval_secs": 240 },
///   "log_filter": "adgate_controller=debug,info"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdgateConfig {
    pub controller: ControllerConfig,
    pub throttle: ThrottleConfig,
    /// Default for [`logging::init`](crate::logging::init) when `RUST_LOG`
    /// is unset.
    pub log_filter: String,
}

impl Default for AdgateConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            throttle: ThrottleConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl AdgateConfig {
    pub fn from_json_str(json: &str) -> Result<Self, AdgateError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AdgateError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded adgate configuration");
        Self::from_json_str(&json)
    }

    /// Clamps out-of-range values in every section.
    pub fn validated(mut self) -> Self {
        self.controller = self.controller.validated();
        self.throttle = self.throttle.validated();
        if self.log_filter.trim().is_empty() {
            tracing::warn!("log_filter is empty, using \"info\"");
            self.log_filter = "info".to_string();
        }
        self
    }
}

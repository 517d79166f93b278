//! Controller configuration.

use std::time::Duration;

use adgate_network::Anchor;
use serde::{Deserialize, Serialize};

/// Configuration for the ad controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Initial value of the auto-banner toggle.
    pub auto_banner_enabled: bool,

    /// How often the auto-banner supervisor samples visibility.
    /// 0 disables the supervisor entirely.
    pub supervisor_tick_hz: u32,

    /// Resolve a full-screen session as failed if the network never reports
    /// it closed. `None` waits forever.
    pub full_screen_timeout_secs: Option<u64>,

    /// Delay before reloading a full-screen ad whose load failed.
    /// `None` leaves reloading to the next close.
    pub load_retry_delay_secs: Option<u64>,

    /// Capacity of the command channel between handles and the actor.
    pub command_channel_size: usize,

    /// Where the first banner is docked.
    pub initial_anchor: Anchor,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            auto_banner_enabled: true,
            supervisor_tick_hz: 4,
            full_screen_timeout_secs: None,
            load_retry_delay_secs: Some(30),
            command_channel_size: 64,
            initial_anchor: Anchor::Top,
        }
    }
}

impl ControllerConfig {
    /// Clamps values that would break the actor.
    ///
    /// - `command_channel_size` at least 1.
    /// - A zero timeout means "no timeout".
    /// - A zero retry delay is raised to one second so a network with no
    ///   fill is not hammered.
    pub fn validated(mut self) -> Self {
        if self.command_channel_size == 0 {
            tracing::warn!("command_channel_size is 0, using 1");
            self.command_channel_size = 1;
        }
        if self.full_screen_timeout_secs == Some(0) {
            tracing::warn!("full_screen_timeout_secs is 0, disabling timeout");
            self.full_screen_timeout_secs = None;
        }
        if self.load_retry_delay_secs == Some(0) {
            tracing::warn!("load_retry_delay_secs is 0, using 1");
            self.load_retry_delay_secs = Some(1);
        }
        self
    }

    pub fn full_screen_timeout(&self) -> Option<Duration> {
        self.full_screen_timeout_secs.map(Duration::from_secs)
    }

    pub fn load_retry_delay(&self) -> Option<Duration> {
        self.load_retry_delay_secs.map(Duration::from_secs)
    }
}

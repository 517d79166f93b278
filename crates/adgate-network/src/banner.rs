//! Banner placement types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Screen edge a banner is docked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Anchor {
    #[default]
    Top,
    Bottom,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
        }
    }
}

/// Banner size in physical pixels, as reported by the network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BannerSize {
    pub width: f32,
    pub height: f32,
}

impl BannerSize {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Height the banner takes on a screen `screen_width` pixels wide,
    /// keeping the reported aspect ratio. Zero for an empty size.
    pub fn scaled_height(&self, screen_width: f32) -> f32 {
        if self.width <= 0.0 {
            return 0.0;
        }
        self.height / self.width * screen_width
    }
}

//! Call-site constants. One key per place in the game that requests an ad.

use crate::{AdKind, AdRequestKey, REMOVE_ADS_1, REMOVE_ADS_2};

// ---------------------------------------------------------------------------
// Banner
// ---------------------------------------------------------------------------

pub const BANNER: AdRequestKey = AdRequestKey::skippable_with(AdKind::Banner, REMOVE_ADS_1);

// ---------------------------------------------------------------------------
// Interstitial
// ---------------------------------------------------------------------------

/// Gems collected from the achievements screen.
pub const GET_GEM_IN_ACHIEVEMENTS: AdRequestKey =
    AdRequestKey::skippable_with(AdKind::Interstitial, REMOVE_ADS_1);
pub const AFTER_EVOLUTION: AdRequestKey =
    AdRequestKey::skippable_with(AdKind::Interstitial, REMOVE_ADS_1);
pub const ROOM_CHANGED: AdRequestKey =
    AdRequestKey::skippable_with(AdKind::Interstitial, REMOVE_ADS_1);
pub const GET_ATTENDANCE_CHECK_REWARDS: AdRequestKey =
    AdRequestKey::skippable_with(AdKind::Interstitial, REMOVE_ADS_1);
pub const MINI_GAME_BUTTON_CLICKED: AdRequestKey =
    AdRequestKey::skippable_with(AdKind::Interstitial, REMOVE_ADS_1);

// ---------------------------------------------------------------------------
// Rewarded
// ---------------------------------------------------------------------------

pub const ATTENDANCE_REWARD: AdRequestKey =
    AdRequestKey::skippable_with(AdKind::Rewarded, REMOVE_ADS_1);
pub const MISSION_REWARD: AdRequestKey =
    AdRequestKey::skippable_with(AdKind::Rewarded, REMOVE_ADS_1);
pub const REWARD_PACK: AdRequestKey = AdRequestKey::skippable_with(AdKind::Rewarded, REMOVE_ADS_2);
pub const GIFT_BOX: AdRequestKey = AdRequestKey::skippable_with(AdKind::Rewarded, REMOVE_ADS_2);
pub const SLEEP_TIME_SKIP: AdRequestKey =
    AdRequestKey::skippable_with(AdKind::Rewarded, REMOVE_ADS_2);

// Paid-currency and bonus rewards are never free, even for remove-ads owners.
pub const MINI_GAME_REWARD: AdRequestKey = AdRequestKey::unskippable(AdKind::Rewarded);
pub const OFFLINE_REWARD: AdRequestKey = AdRequestKey::unskippable(AdKind::Rewarded);
pub const DAILY_COIN: AdRequestKey = AdRequestKey::unskippable(AdKind::Rewarded);
pub const DAILY_GEM: AdRequestKey = AdRequestKey::unskippable(AdKind::Rewarded);
pub const LEVEL_UP_DOUBLE_REWARD: AdRequestKey = AdRequestKey::unskippable(AdKind::Rewarded);

//! Inputs to the auto-banner supervisor.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The scenes the game can be in, as far as banners care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Scene {
    #[default]
    Title,
    InGame,
    CollectiblesLand,
    Other,
}

/// One poll of the game state the supervisor looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct VisibilitySnapshot {
    pub scene: Scene,
    /// Number of popups on the stack.
    pub popup_depth: usize,
    /// A mini-game runs inside a popup but still wants the banner.
    pub playing_mini_game: bool,
    /// A scene transition is in progress.
    pub loading: bool,
    /// The character evolution cut-scene is playing.
    pub evolving: bool,
    /// Alpha of the full-screen decoration overlay; any value above zero
    /// means it is on screen.
    pub overlay_alpha: f32,
}

impl VisibilitySnapshot {
    /// Whether the game state leaves room for a banner.
    ///
    /// Entitlements are not part of the snapshot; the supervisor checks
    /// those separately.
    pub fn allows_banner(&self) -> bool {
        matches!(self.scene, Scene::InGame | Scene::CollectiblesLand)
            && self.overlay_alpha <= 0.0
            && !self.evolving
            && !self.loading
            && (self.popup_depth == 0 || self.playing_mini_game)
    }
}

/// Samples the current game state once per supervisor tick.
pub trait VisibilityProbe: Send + 'static {
    fn sample(&self) -> VisibilitySnapshot;
}

impl<F> VisibilityProbe for F
where
    F: Fn() -> VisibilitySnapshot + Send + 'static,
{
    fn sample(&self) -> VisibilitySnapshot {
        self()
    }
}

/// Creates a feed: game code publishes snapshots on the sender whenever
/// something relevant changes, and the supervisor reads the latest.
pub fn visibility_feed(
    initial: VisibilitySnapshot,
) -> (watch::Sender<VisibilitySnapshot>, VisibilityFeed) {
    let (tx, rx) = watch::channel(initial);
    (tx, VisibilityFeed { rx })
}

/// Probe side of [`visibility_feed`].
#[derive(Debug, Clone)]
pub struct VisibilityFeed {
    rx: watch::Receiver<VisibilitySnapshot>,
}

impl VisibilityProbe for VisibilityFeed {
    fn sample(&self) -> VisibilitySnapshot {
        *self.rx.borrow()
    }
}

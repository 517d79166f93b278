//! Integration tests for the controller actor using a recording network.
//!
//! The mock network never posts events by itself: each test plays the SDK's
//! part by posting on the event queue. `Harness::sync` is a barrier that
//! returns once the actor has drained everything posted before it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use adgate_controller::{
    AdHandle, BannerPhase, BannerState, ControllerConfig, ControllerError, ControllerParts,
    FailureNotifier, Scene, SessionPhase, VisibilitySnapshot, spawn_controller, visibility_feed,
};
use adgate_core::{
    AdEligibilityPolicy, AdKind, AdOutcome, AdRequestKey, FailReason, InMemoryEntitlements,
    REMOVE_ADS_1, REMOVE_ADS_2, keys,
};
use adgate_network::{
    AdEventSender, AdNetworkAdapter, AdNetworkEvent, AdapterError, Anchor, BannerSize, LoadFailure,
    event_channel,
};
use adgate_throttle::{AutoAdThrottle, ManualClock, MemoryStore, ThrottleConfig};
use tokio::sync::watch;
use tokio::task::JoinHandle;

// =========================================================================
// Mock network: records every call, shows whatever the test marks ready.
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Call {
    Load(AdKind),
    Show(AdKind),
    Destroy(AdKind),
    RequestBanner(Anchor),
    ShowBanner,
    HideBanner,
    MoveBanner(Anchor),
}

#[derive(Debug, Default)]
struct Calls {
    log: Vec<Call>,
    ready: HashSet<AdKind>,
    banner_exists: bool,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Calls>>);

impl Recorder {
    fn log(&self) -> Vec<Call> {
        self.0.lock().unwrap().log.clone()
    }

    fn count(&self, call: Call) -> usize {
        self.log().into_iter().filter(|c| *c == call).count()
    }

    fn make_ready(&self, kind: AdKind) {
        self.0.lock().unwrap().ready.insert(kind);
    }

    fn set_banner_exists(&self, exists: bool) {
        self.0.lock().unwrap().banner_exists = exists;
    }

    fn clear(&self) {
        self.0.lock().unwrap().log.clear();
    }
}

struct RecordingNetwork {
    calls: Recorder,
    init_failure: Option<String>,
}

impl RecordingNetwork {
    fn push(&self, call: Call) {
        self.calls.0.lock().unwrap().log.push(call);
    }
}

impl AdNetworkAdapter for RecordingNetwork {
    fn initialize(&mut self) -> Result<(), AdapterError> {
        match &self.init_failure {
            Some(reason) => Err(AdapterError::InitFailed(reason.clone())),
            None => Ok(()),
        }
    }

    fn request_load(&mut self, kind: AdKind) {
        self.push(Call::Load(kind));
    }

    fn show(&mut self, kind: AdKind) -> bool {
        self.push(Call::Show(kind));
        self.calls.0.lock().unwrap().ready.remove(&kind)
    }

    fn destroy(&mut self, kind: AdKind) {
        self.push(Call::Destroy(kind));
        if kind == AdKind::Banner {
            self.calls.set_banner_exists(false);
        }
    }

    fn request_banner(&mut self, anchor: Anchor) {
        self.push(Call::RequestBanner(anchor));
        self.calls.set_banner_exists(true);
    }

    fn show_banner(&mut self) {
        self.push(Call::ShowBanner);
    }

    fn hide_banner(&mut self) {
        self.push(Call::HideBanner);
    }

    fn change_banner_position(&mut self, anchor: Anchor) {
        self.push(Call::MoveBanner(anchor));
    }

    fn banner_exists(&self) -> bool {
        self.calls.0.lock().unwrap().banner_exists
    }
}

#[derive(Default)]
struct RecordingNotifier(Mutex<Vec<FailReason>>);

impl FailureNotifier for RecordingNotifier {
    fn notify(&self, reason: FailReason) {
        self.0.lock().unwrap().push(reason);
    }
}

// =========================================================================
// Harness
// =========================================================================

const BANNER_SIZE: BannerSize = BannerSize::new(320.0, 50.0);

struct Harness {
    handle: AdHandle,
    calls: Recorder,
    events: AdEventSender,
    entitlements: Arc<InMemoryEntitlements>,
    clock: Arc<ManualClock>,
    notifier: Arc<RecordingNotifier>,
    visibility: watch::Sender<VisibilitySnapshot>,
}

#[derive(Default)]
struct Options {
    config: ControllerConfig,
    with_probe: bool,
}

fn start() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

fn in_game() -> VisibilitySnapshot {
    VisibilitySnapshot {
        scene: Scene::InGame,
        ..Default::default()
    }
}

fn harness_with(options: Options) -> Harness {
    let calls = Recorder::default();
    let (events, rx) = event_channel();
    let entitlements = Arc::new(InMemoryEntitlements::new());
    let policy = AdEligibilityPolicy::new(entitlements.clone());
    let clock = Arc::new(ManualClock::new(start()));
    let throttle = AutoAdThrottle::new(
        ThrottleConfig::with_interval_secs(60),
        Box::new(MemoryStore::new()),
        policy.clone(),
    )
    .with_clock(clock.clone());
    let notifier = Arc::new(RecordingNotifier::default());
    let (visibility, feed) = visibility_feed(VisibilitySnapshot::default());

    let adapter = RecordingNetwork {
        calls: calls.clone(),
        init_failure: None,
    };
    let mut parts = ControllerParts::new(adapter, rx, policy, throttle)
        .with_notifier(notifier.clone())
        .with_config(options.config);
    if options.with_probe {
        parts = parts.with_visibility(feed);
    }

    let handle = spawn_controller(parts).expect("controller should start");
    Harness {
        handle,
        calls,
        events,
        entitlements,
        clock,
        notifier,
        visibility,
    }
}

fn harness() -> Harness {
    harness_with(Options::default())
}

impl Harness {
    /// Returns once the actor has handled every event posted so far.
    async fn sync(&self) {
        self.handle.status().await.expect("controller alive");
    }

    fn post(&self, event: AdNetworkEvent) {
        assert!(self.events.post(event));
    }

    /// Starts a request in the background. The command is queued before
    /// this returns, so anything the test sends afterwards lands behind it.
    async fn show(&self, key: AdRequestKey) -> JoinHandle<Result<AdOutcome, ControllerError>> {
        let handle = self.handle.clone();
        let mut request = Box::pin(async move { handle.show_ad(key).await });
        let early = tokio::select! {
            biased;
            result = &mut request => Some(result),
            _ = std::future::ready(()) => None,
        };
        match early {
            Some(result) => tokio::spawn(async move { result }),
            None => tokio::spawn(request),
        }
    }

    fn notified(&self) -> Vec<FailReason> {
        self.notifier.0.lock().unwrap().clone()
    }
}

async fn outcome(task: JoinHandle<Result<AdOutcome, ControllerError>>) -> AdOutcome {
    task.await.unwrap().unwrap()
}

// =========================================================================
// Startup
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_initialized_preloads_full_screen_ads() {
    let h = harness();
    h.post(AdNetworkEvent::Initialized);
    h.sync().await;
    assert_eq!(
        h.calls.log(),
        vec![Call::Load(AdKind::Interstitial), Call::Load(AdKind::Rewarded)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_init_failure_is_reported() {
    let (_events, rx) = event_channel();
    let policy = AdEligibilityPolicy::new(Arc::new(InMemoryEntitlements::new()));
    let throttle = AutoAdThrottle::new(
        ThrottleConfig::default(),
        Box::new(MemoryStore::new()),
        policy.clone(),
    );
    let adapter = RecordingNetwork {
        calls: Recorder::default(),
        init_failure: Some("no app id".into()),
    };
    let err = spawn_controller(ControllerParts::new(adapter, rx, policy, throttle)).unwrap_err();
    assert!(matches!(err, ControllerError::Adapter(AdapterError::InitFailed(_))));
}

// =========================================================================
// Skips
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_entitled_requests_skip_without_network() {
    let h = harness();
    h.entitlements.grant(REMOVE_ADS_1).unwrap();

    assert_eq!(h.handle.show_ad(keys::ROOM_CHANGED).await.unwrap(), AdOutcome::Skipped);
    assert_eq!(h.handle.show_ad(keys::ATTENDANCE_REWARD).await.unwrap(), AdOutcome::Skipped);
    assert_eq!(h.handle.show_ad(keys::BANNER).await.unwrap(), AdOutcome::Skipped);
    h.sync().await;
    assert!(h.calls.log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_remove_ads_2_skips_only_its_rewards() {
    let h = harness();
    h.entitlements.grant(REMOVE_ADS_2).unwrap();

    assert_eq!(h.handle.show_ad(keys::GIFT_BOX).await.unwrap(), AdOutcome::Skipped);

    // Unskippable keys still reach the network.
    let daily = h.handle.show_ad(keys::DAILY_GEM).await.unwrap();
    assert_eq!(daily, AdOutcome::failed(FailReason::NoFill));
    assert_eq!(h.calls.log(), vec![Call::Show(AdKind::Rewarded)]);
}

// =========================================================================
// Full-screen sessions
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_rewarded_with_reward_then_close() {
    let h = harness();
    h.calls.make_ready(AdKind::Rewarded);

    let task = h.show(keys::DAILY_COIN).await;
    h.sync().await;
    h.post(AdNetworkEvent::FullScreenOpened(AdKind::Rewarded));
    h.sync().await;

    let status = h.handle.status().await.unwrap();
    assert_eq!(status.full_screen, Some((AdKind::Rewarded, SessionPhase::Showing)));

    h.post(AdNetworkEvent::RewardEarned);
    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Rewarded));

    let result = outcome(task).await;
    assert_eq!(result, AdOutcome::Success { rewarded: true });
    assert!(result.grants_reward());

    h.sync().await;
    assert_eq!(
        h.calls.log(),
        vec![Call::Show(AdKind::Rewarded), Call::Load(AdKind::Rewarded)]
    );
    assert_eq!(h.handle.status().await.unwrap().full_screen, None);
}

#[tokio::test(start_paused = true)]
async fn test_rewarded_closed_early_has_no_reward() {
    let h = harness();
    h.calls.make_ready(AdKind::Rewarded);

    let task = h.show(keys::OFFLINE_REWARD).await;
    h.sync().await;
    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Rewarded));

    assert_eq!(outcome(task).await, AdOutcome::Success { rewarded: false });
}

#[tokio::test(start_paused = true)]
async fn test_second_full_screen_request_is_already_playing() {
    let h = harness();
    h.calls.make_ready(AdKind::Rewarded);
    h.calls.make_ready(AdKind::Interstitial);

    let first = h.show(keys::DAILY_COIN).await;
    h.sync().await;

    let second = h.handle.show_ad(keys::ROOM_CHANGED).await.unwrap();
    assert_eq!(second, AdOutcome::failed(FailReason::AlreadyPlaying));
    // Already-playing is not surfaced to the player.
    assert!(h.notified().is_empty());

    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Rewarded));
    assert!(outcome(first).await.is_success());
    assert_eq!(h.calls.count(Call::Show(AdKind::Interstitial)), 0);
}

#[tokio::test(start_paused = true)]
async fn test_no_fill_notifies_and_frees_session() {
    let h = harness();

    let result = h.handle.show_ad(keys::MINI_GAME_REWARD).await.unwrap();
    assert_eq!(result, AdOutcome::failed(FailReason::NoFill));
    assert_eq!(h.notified(), vec![FailReason::NoFill]);

    // A later request is not blocked by the failed one.
    h.calls.make_ready(AdKind::Rewarded);
    let task = h.show(keys::MINI_GAME_REWARD).await;
    h.sync().await;
    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Rewarded));
    assert!(outcome(task).await.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_interstitial_throttled_inside_window() {
    let h = harness();
    h.calls.make_ready(AdKind::Interstitial);

    let task = h.show(keys::AFTER_EVOLUTION).await;
    h.sync().await;
    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Interstitial));
    assert_eq!(outcome(task).await, AdOutcome::Success { rewarded: false });

    h.clock.advance(Duration::from_secs(30));
    h.calls.make_ready(AdKind::Interstitial);
    let throttled = h.handle.show_ad(keys::ROOM_CHANGED).await.unwrap();
    assert_eq!(throttled, AdOutcome::failed(FailReason::NotYetAutoAdTime));
    assert_eq!(h.notified(), vec![FailReason::NotYetAutoAdTime]);
    assert_eq!(h.calls.count(Call::Show(AdKind::Interstitial)), 1);

    h.clock.advance(Duration::from_secs(30));
    let task = h.show(keys::ROOM_CHANGED).await;
    h.sync().await;
    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Interstitial));
    assert!(outcome(task).await.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_rewarded_ignores_throttle() {
    let h = harness();
    h.calls.make_ready(AdKind::Interstitial);
    let task = h.show(keys::ROOM_CHANGED).await;
    h.sync().await;
    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Interstitial));
    outcome(task).await;

    h.calls.make_ready(AdKind::Rewarded);
    let task = h.show(keys::DAILY_COIN).await;
    h.sync().await;
    h.post(AdNetworkEvent::RewardEarned);
    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Rewarded));
    assert_eq!(outcome(task).await, AdOutcome::Success { rewarded: true });
}

#[tokio::test(start_paused = true)]
async fn test_show_failed_resolves_unknown_and_reloads() {
    let h = harness();
    h.calls.make_ready(AdKind::Rewarded);

    let task = h.show(keys::DAILY_COIN).await;
    h.sync().await;
    h.post(AdNetworkEvent::FullScreenShowFailed(AdKind::Rewarded));

    assert_eq!(outcome(task).await, AdOutcome::failed(FailReason::Unknown));
    h.sync().await;
    assert_eq!(h.calls.count(Call::Load(AdKind::Rewarded)), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stray_close_still_reloads() {
    let h = harness();
    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Interstitial));
    h.sync().await;
    assert_eq!(h.calls.log(), vec![Call::Load(AdKind::Interstitial)]);
    assert_eq!(h.handle.status().await.unwrap().full_screen, None);
}

#[tokio::test(start_paused = true)]
async fn test_reward_outside_session_is_ignored() {
    let h = harness();
    h.post(AdNetworkEvent::RewardEarned);
    h.sync().await;

    h.calls.make_ready(AdKind::Rewarded);
    let task = h.show(keys::DAILY_COIN).await;
    h.sync().await;
    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Rewarded));
    assert_eq!(outcome(task).await, AdOutcome::Success { rewarded: false });
}

#[tokio::test(start_paused = true)]
async fn test_kind_none_is_developer_mistake() {
    let h = harness();
    let key = AdRequestKey::unskippable(AdKind::None);
    let result = h.handle.show_ad(key).await.unwrap();
    assert_eq!(result, AdOutcome::failed(FailReason::DeveloperMistake));
    assert!(h.calls.log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_caller_that_stops_waiting_does_not_wedge_controller() {
    let h = harness();
    h.calls.make_ready(AdKind::Rewarded);

    let task = h.show(keys::DAILY_COIN).await;
    h.sync().await;
    task.abort();
    let _ = task.await;

    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Rewarded));
    h.sync().await;
    assert_eq!(h.handle.status().await.unwrap().full_screen, None);

    h.calls.make_ready(AdKind::Rewarded);
    let task = h.show(keys::DAILY_COIN).await;
    h.sync().await;
    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Rewarded));
    assert!(outcome(task).await.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_safety_timeout_fails_hung_session() {
    let h = harness_with(Options {
        config: ControllerConfig {
            full_screen_timeout_secs: Some(90),
            ..Default::default()
        },
        ..Default::default()
    });
    h.calls.make_ready(AdKind::Rewarded);

    let task = h.show(keys::DAILY_COIN).await;
    // Paused time auto-advances to the deadline.
    assert_eq!(outcome(task).await, AdOutcome::failed(FailReason::Unknown));
    h.sync().await;
    assert_eq!(h.calls.count(Call::Load(AdKind::Rewarded)), 1);
    assert_eq!(h.handle.status().await.unwrap().full_screen, None);
}

#[tokio::test(start_paused = true)]
async fn test_late_close_of_expired_session_leaves_next_session_open() {
    let h = harness_with(Options {
        config: ControllerConfig {
            full_screen_timeout_secs: Some(90),
            ..Default::default()
        },
        ..Default::default()
    });
    h.calls.make_ready(AdKind::Rewarded);
    let expired = h.show(keys::DAILY_COIN).await;
    assert_eq!(outcome(expired).await, AdOutcome::failed(FailReason::Unknown));

    h.calls.make_ready(AdKind::Rewarded);
    let current = h.show(keys::DAILY_GEM).await;
    h.sync().await;

    // The network finally reports the first ad closed.
    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Rewarded));
    h.sync().await;

    let status = h.handle.status().await.unwrap();
    assert_eq!(status.full_screen, Some((AdKind::Rewarded, SessionPhase::Requested)));
    assert!(!current.is_finished());
    assert_eq!(h.calls.count(Call::Load(AdKind::Rewarded)), 1);

    h.calls.make_ready(AdKind::Interstitial);
    let blocked = h.handle.show_ad(keys::ROOM_CHANGED).await.unwrap();
    assert_eq!(blocked, AdOutcome::failed(FailReason::AlreadyPlaying));
    assert_eq!(h.calls.count(Call::Show(AdKind::Interstitial)), 0);

    h.post(AdNetworkEvent::FullScreenClosed(AdKind::Rewarded));
    assert_eq!(outcome(current).await, AdOutcome::Success { rewarded: false });
    h.sync().await;
    assert_eq!(h.calls.count(Call::Load(AdKind::Rewarded)), 2);
}

// =========================================================================
// Load failures
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_full_screen_load_failure_retries_after_delay() {
    let h = harness_with(Options {
        config: ControllerConfig {
            load_retry_delay_secs: Some(30),
            ..Default::default()
        },
        ..Default::default()
    });

    h.post(AdNetworkEvent::LoadFailed {
        kind: AdKind::Interstitial,
        failure: LoadFailure::NoFill,
    });
    h.sync().await;
    assert!(h.calls.log().is_empty());

    tokio::time::sleep(Duration::from_secs(31)).await;
    h.sync().await;
    assert_eq!(h.calls.log(), vec![Call::Load(AdKind::Interstitial)]);
}

#[tokio::test(start_paused = true)]
async fn test_no_retry_when_disabled() {
    let h = harness_with(Options {
        config: ControllerConfig {
            load_retry_delay_secs: None,
            ..Default::default()
        },
        ..Default::default()
    });

    h.post(AdNetworkEvent::LoadFailed {
        kind: AdKind::Rewarded,
        failure: LoadFailure::Network,
    });
    tokio::time::sleep(Duration::from_secs(600)).await;
    h.sync().await;
    assert!(h.calls.log().is_empty());
}

// =========================================================================
// Banner
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_banner_request_resolves_when_loaded() {
    let h = harness();
    let mut states = h.handle.subscribe_banner();

    let task = h.show(keys::BANNER).await;
    h.sync().await;
    assert_eq!(h.calls.log(), vec![Call::RequestBanner(Anchor::Top)]);
    assert_eq!(h.handle.status().await.unwrap().banner, BannerPhase::Requesting);

    // A second request while loading is rejected.
    let again = h.handle.show_ad(keys::BANNER).await.unwrap();
    assert_eq!(again, AdOutcome::failed(FailReason::AlreadyPlaying));
    assert_eq!(h.calls.count(Call::RequestBanner(Anchor::Top)), 1);

    h.post(AdNetworkEvent::BannerLoaded(BANNER_SIZE));
    assert_eq!(outcome(task).await, AdOutcome::Success { rewarded: false });

    states.changed().await.unwrap();
    assert_eq!(*states.borrow(), BannerState::open(BANNER_SIZE, Anchor::Top));
    assert_eq!(h.handle.status().await.unwrap().banner, BannerPhase::Shown);
}

#[tokio::test(start_paused = true)]
async fn test_banner_reuses_existing_view() {
    let h = harness();
    h.calls.set_banner_exists(true);

    let result = h.handle.show_ad(keys::BANNER).await.unwrap();
    assert_eq!(result, AdOutcome::Success { rewarded: false });
    assert_eq!(h.calls.log(), vec![Call::ShowBanner]);
}

#[tokio::test(start_paused = true)]
async fn test_banner_load_failure_returns_to_hidden() {
    let h = harness();

    let task = h.show(keys::BANNER).await;
    h.sync().await;
    h.post(AdNetworkEvent::LoadFailed {
        kind: AdKind::Banner,
        failure: LoadFailure::Network,
    });

    assert_eq!(outcome(task).await, AdOutcome::failed(FailReason::NoInternet));
    h.sync().await;
    assert_eq!(h.calls.count(Call::Destroy(AdKind::Banner)), 1);
    assert_eq!(h.handle.status().await.unwrap().banner, BannerPhase::Hidden);
    // Banner failures are not toasted.
    assert!(h.notified().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hide_while_requesting_keeps_request_pending() {
    let h = harness();

    let task = h.show(keys::BANNER).await;
    h.sync().await;
    h.post(AdNetworkEvent::BannerHidden);
    h.sync().await;
    assert_eq!(h.handle.status().await.unwrap().banner, BannerPhase::Requesting);
    assert!(!task.is_finished());

    h.post(AdNetworkEvent::BannerLoaded(BANNER_SIZE));
    assert!(outcome(task).await.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_change_position_moves_live_banner_and_publishes() {
    let h = harness();
    let task = h.show(keys::BANNER).await;
    h.sync().await;
    h.post(AdNetworkEvent::BannerLoaded(BANNER_SIZE));
    outcome(task).await;
    h.calls.clear();

    h.handle.change_banner_position(Anchor::Bottom).await.unwrap();
    h.sync().await;
    assert_eq!(h.calls.log(), vec![Call::MoveBanner(Anchor::Bottom)]);
    assert_eq!(h.handle.banner_state(), BannerState::open(BANNER_SIZE, Anchor::Bottom));
    assert_eq!(h.handle.status().await.unwrap().last_anchor, Anchor::Bottom);
}

#[tokio::test(start_paused = true)]
async fn test_new_banner_uses_last_anchor() {
    let h = harness();
    h.handle.change_banner_position(Anchor::Bottom).await.unwrap();
    h.sync().await;
    // No view yet, so nothing to move.
    assert!(h.calls.log().is_empty());
    assert_eq!(h.handle.banner_state(), BannerState::closed(Anchor::Bottom));

    let _task = h.show(keys::BANNER).await;
    h.sync().await;
    assert_eq!(h.calls.log(), vec![Call::RequestBanner(Anchor::Bottom)]);
}

#[tokio::test(start_paused = true)]
async fn test_close_banner() {
    let h = harness();
    assert!(!h.handle.close_banner().await.unwrap());

    let task = h.show(keys::BANNER).await;
    h.sync().await;
    h.post(AdNetworkEvent::BannerLoaded(BANNER_SIZE));
    outcome(task).await;

    assert!(h.handle.close_banner().await.unwrap());
    assert_eq!(h.calls.count(Call::HideBanner), 1);

    h.post(AdNetworkEvent::BannerHidden);
    h.sync().await;
    assert_eq!(h.handle.banner_state(), BannerState::closed(Anchor::Top));
    assert_eq!(h.handle.status().await.unwrap().banner, BannerPhase::Hidden);
}

// =========================================================================
// Auto-banner supervisor
// =========================================================================

fn supervised() -> Harness {
    harness_with(Options {
        config: ControllerConfig {
            supervisor_tick_hz: 4,
            ..Default::default()
        },
        with_probe: true,
    })
}

#[tokio::test(start_paused = true)]
async fn test_supervisor_requests_banner_when_visible() {
    let h = supervised();

    tokio::time::sleep(Duration::from_secs(1)).await;
    h.sync().await;
    assert!(h.calls.log().is_empty());

    h.visibility.send_replace(in_game());
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.sync().await;
    // Requested exactly once: later ticks see Requesting.
    assert_eq!(h.calls.log(), vec![Call::RequestBanner(Anchor::Top)]);
}

#[tokio::test(start_paused = true)]
async fn test_supervisor_hides_banner_when_not_visible() {
    let h = supervised();
    h.visibility.send_replace(in_game());
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.post(AdNetworkEvent::BannerLoaded(BANNER_SIZE));
    h.sync().await;

    h.visibility.send_replace(VisibilitySnapshot {
        popup_depth: 1,
        ..in_game()
    });
    tokio::time::sleep(Duration::from_millis(300)).await;
    h.sync().await;
    assert!(h.calls.count(Call::HideBanner) >= 1);

    h.post(AdNetworkEvent::BannerHidden);
    h.sync().await;
    h.calls.clear();
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.sync().await;
    // Hidden and not wanted: nothing more to do.
    assert!(h.calls.log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_live_banner_shown() {
    let h = supervised();
    h.visibility.send_replace(in_game());
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.post(AdNetworkEvent::BannerLoaded(BANNER_SIZE));
    h.sync().await;

    h.post(AdNetworkEvent::LoadFailed {
        kind: AdKind::Banner,
        failure: LoadFailure::NoFill,
    });
    h.sync().await;
    assert_eq!(h.handle.status().await.unwrap().banner, BannerPhase::Shown);
    assert!(h.handle.banner_state().is_open);
    assert_eq!(h.calls.count(Call::Destroy(AdKind::Banner)), 0);

    let again = h.handle.show_ad(keys::BANNER).await.unwrap();
    assert_eq!(again, AdOutcome::failed(FailReason::AlreadyPlaying));

    // The supervisor still withdraws it when a popup opens.
    h.visibility.send_replace(VisibilitySnapshot {
        popup_depth: 1,
        ..in_game()
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.sync().await;
    assert!(h.calls.count(Call::HideBanner) >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_supervisor_respects_remove_ads() {
    let h = supervised();
    h.entitlements.grant(REMOVE_ADS_1).unwrap();
    h.visibility.send_replace(in_game());
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.sync().await;
    assert!(h.calls.log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_supervisor_toggle() {
    let h = supervised();
    h.handle.set_auto_banner_control(false).await.unwrap();
    h.visibility.send_replace(in_game());
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.sync().await;
    assert!(h.calls.log().is_empty());
    assert!(!h.handle.status().await.unwrap().auto_banner_enabled);

    h.handle.set_auto_banner_control(true).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.sync().await;
    assert_eq!(h.calls.log(), vec![Call::RequestBanner(Anchor::Top)]);
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_waiters_and_releases_network() {
    let h = harness();
    h.calls.make_ready(AdKind::Rewarded);

    let task = h.show(keys::DAILY_COIN).await;
    h.sync().await;
    h.handle.shutdown().await.unwrap();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(ControllerError::Cancelled)));

    // Wait for the actor to drop its receiver.
    while h.handle.status().await.is_ok() {
        tokio::task::yield_now().await;
    }
    assert!(matches!(
        h.handle.show_ad(keys::DAILY_COIN).await,
        Err(ControllerError::Unavailable)
    ));
    for kind in [AdKind::Interstitial, AdKind::Rewarded, AdKind::Banner] {
        assert_eq!(h.calls.count(Call::Destroy(kind)), 1);
    }
}

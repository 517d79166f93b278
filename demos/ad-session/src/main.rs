//! A short play session against the simulated network.
//!
//! Usage: `ad-session [config.json]`

use std::sync::Arc;
use std::time::Duration;

use adgate::controller::{Scene, visibility_feed};
use adgate::prelude::*;

/// Prints failures the way a toast would show them.
struct ToastNotifier;

impl FailureNotifier for ToastNotifier {
    fn notify(&self, reason: FailReason) {
        println!("  [toast] ad unavailable: {reason}");
    }
}

fn in_game() -> VisibilitySnapshot {
    VisibilitySnapshot {
        scene: Scene::InGame,
        ..Default::default()
    }
}

async fn show(service: &AdService, label: &str, key: AdRequestKey) -> Result<(), AdgateError> {
    let outcome = service.show_ad(key).await?;
    println!(
        "{label:<16} {}",
        serde_json::to_string(&outcome).unwrap_or_else(|_| format!("{outcome:?}"))
    );
    if outcome.grants_reward() {
        println!("  reward paid out");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => AdgateConfig::from_file(path)?,
        None => AdgateConfig::default(),
    };
    adgate::logging::init(&config.log_filter);

    let purchases = Arc::new(InMemoryEntitlements::new());
    let (scene, feed) = visibility_feed(VisibilitySnapshot::default());

    let service = AdService::builder()
        .config(config)
        .entitlements(purchases.clone())
        .visibility(feed)
        .notifier(Arc::new(ToastNotifier))
        .build_simulated(SimulatedConfig::default())?;

    // Let the startup preloads land.
    tokio::time::sleep(Duration::from_secs(1)).await;

    scene.send_replace(in_game());
    let mut banner = service.subscribe_banner();
    match tokio::time::timeout(Duration::from_secs(3), banner.wait_for(|s| s.is_open)).await {
        Ok(Ok(state)) => println!(
            "banner open at {} ({}x{})",
            state.anchor, state.size.width, state.size.height
        ),
        _ => println!("banner did not fill"),
    }
    service.change_banner_position(Anchor::Bottom).await?;

    show(&service, "daily coin", keys::DAILY_COIN).await?;
    show(&service, "room changed", keys::ROOM_CHANGED).await?;
    // Inside the automatic-ad window.
    show(&service, "after evolution", keys::AFTER_EVOLUTION).await?;

    // Opening a popup hides the banner on the next supervisor pass.
    scene.send_replace(VisibilitySnapshot {
        popup_depth: 1,
        ..in_game()
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    println!("banner open after popup: {}", service.banner_state().is_open);

    purchases.grant(REMOVE_ADS_1)?;
    println!("remove-ads purchased");
    show(&service, "mission reward", keys::MISSION_REWARD).await?;
    show(&service, "offline reward", keys::OFFLINE_REWARD).await?;

    let status = service.status().await?;
    println!("final status: {}", serde_json::to_string(&status)?);

    service.shutdown().await?;
    Ok(())
}

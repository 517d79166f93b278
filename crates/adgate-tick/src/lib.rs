//! Fixed-rate tick scheduler for adgate's supervisory checks.
//!
//! The auto-banner supervisor polls game state a few times per second.
//! This scheduler provides that cadence without ever queueing a backlog:
//! a late tick skips ahead instead of firing a burst.
//!
//! # Disabled mode
//!
//! When `tick_rate_hz` is 0 (or the scheduler is paused),
//! [`TickScheduler::wait_for_tick`] pends forever. That is the right
//! behavior inside a `tokio::select!` loop: the other branches keep running.
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* handle commands */ }
//!         _ = ticker.wait_for_tick() => supervise(),
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the tick scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickConfig {
    /// Tick rate in Hz. 0 = disabled (tick never fires).
    pub tick_rate_hz: u32,
    /// Random jitter (0–max µs) added to the *first* tick so that several
    /// supervisors started together do not poll in lockstep.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 0,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    /// Maximum supported tick rate. A frame-rate poll is plenty.
    pub const MAX_TICK_RATE_HZ: u32 = 60;

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps `tick_rate_hz` to [`Self::MAX_TICK_RATE_HZ`].
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            tracing::warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum, clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self
    }

    /// Duration of a single tick. `None` when disabled.
    pub fn tick_duration(&self) -> Option<Duration> {
        if self.tick_rate_hz == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64))
        }
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// How many ticks were skipped because this one fired late.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-rate tick scheduler with skip-ahead on overrun.
#[derive(Debug)]
pub struct TickScheduler {
    tick_duration: Option<Duration>,
    tick_count: u64,
    next_tick: Option<Instant>,
    paused: bool,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        let next_tick = tick_duration.map(|d| {
            let jitter = if config.initial_jitter_us > 0 {
                let us = rand::rng().random_range(0..config.initial_jitter_us);
                Duration::from_micros(us)
            } else {
                Duration::ZERO
            };
            Instant::now() + d + jitter
        });

        match tick_duration {
            None => debug!("tick scheduler created disabled"),
            Some(d) => debug!(
                rate_hz = config.tick_rate_hz,
                period_ms = d.as_secs_f64() * 1000.0,
                "tick scheduler created"
            ),
        }

        Self {
            tick_duration,
            tick_count: 0,
            next_tick,
            paused: false,
        }
    }

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits until the next tick is due.
    ///
    /// Pends forever when disabled or paused.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let (next, period) = match (self.next_tick, self.tick_duration) {
            (Some(next), Some(period)) if !self.paused => (next, period),
            _ => std::future::pending().await,
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(next);
        let ticks_skipped = (late_by.as_nanos() / period.as_nanos()) as u64;
        if ticks_skipped > 0 {
            debug!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                "supervisor tick late, skipping ahead"
            );
        }
        // Always schedule from now, never from the missed deadline.
        self.next_tick = Some(now + period);

        trace!(tick = self.tick_count, "tick fired");
        TickInfo {
            tick: self.tick_count,
            ticks_skipped,
        }
    }

    /// Stops ticking until [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "tick scheduler paused");
        }
    }

    /// Resumes ticking one full period from now.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if let Some(period) = self.tick_duration {
                self.next_tick = Some(Instant::now() + period);
            }
            debug!(tick = self.tick_count, "tick scheduler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the scheduler was created with a rate of 0.
    pub fn is_disabled(&self) -> bool {
        self.tick_duration.is_none()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tick_duration(&self) -> Option<Duration> {
        self.tick_duration
    }
}

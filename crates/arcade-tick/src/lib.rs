//! Measured-delta tick scheduler for Arcade's real-time games.
//!
//! Real-time sessions advance their simulation by the wall-clock time
//! that actually passed since the previous tick, not by a fixed step.
//! The scheduler decides *when* a tick fires and reports *how much time*
//! it covers.
//!
//! # Modes
//!
//! - `tick_rate_hz > 0`: ticks are paced to the rate (1–128 Hz). `dt` is
//!   still measured, so a late tick simply covers more time.
//! - `tick_rate_hz == 0`: free-running. Every call yields to the runtime
//!   once and fires immediately, so the loop runs as fast as it can
//!   without starving other tasks.
//!
//! The very first tick has no previous tick to measure from and reports
//! `first_dt` instead, so the opening step is never a zero-length one.
//!
//! # Integration
//!
//! ```ignore
//! let mut scheduler = TickScheduler::new(TickConfig::with_rate(60));
//! loop {
//!     let tick = scheduler.wait_for_tick().await;
//!     game.tick(tick.dt);
//!     scheduler.record_tick_end();
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a paced tick fires late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Schedule the next tick one period from now. Missed ticks are
    /// skipped; the measured `dt` already covers the lost time.
    #[default]
    Skip,
    /// Keep the original cadence: the next tick is one period after the
    /// deadline that was missed.
    Drop,
}

/// Full configuration for the tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Tick rate in Hz. 0 = free-running.
    pub tick_rate_hz: u32,
    /// Late-tick handling for paced mode.
    pub policy: TickPolicy,
    /// `dt` reported by the first tick.
    pub first_dt: Duration,
    /// Upper bound on a reported `dt`. Longer gaps (a stalled runtime, a
    /// debugger pause) are clamped so the simulation does not jump.
    pub max_dt: Duration,
    /// Budget warning threshold as a fraction of the tick period.
    pub budget_warn_threshold: f64,
    /// Random jitter (0–max µs) added to the *first* paced tick to
    /// desynchronize sessions started at the same instant.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 0,
            policy: TickPolicy::default(),
            first_dt: Duration::from_secs_f64(1.0 / 60.0),
            max_dt: Duration::from_millis(250),
            budget_warn_threshold: 0.80,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Create a config for a specific tick rate with sensible defaults.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum, clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        if self.first_dt.is_zero() {
            self.first_dt = Self::default().first_dt;
        }
        if self.max_dt < self.first_dt {
            self.max_dt = self.first_dt;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }

    /// Duration of a single tick period. `None` when free-running.
    pub fn tick_duration(&self) -> Option<Duration> {
        if self.tick_rate_hz == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64))
        }
    }
}

// ---------------------------------------------------------------------------
// Tick info (returned to caller each tick)
// ---------------------------------------------------------------------------

/// Information about a tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// Time this tick covers: measured since the previous tick, or
    /// `first_dt` for tick 1. Never zero.
    pub dt: Duration,
    /// `true` if a paced tick fired more than 10% of a period late.
    pub overrun: bool,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Runtime metrics for the tick scheduler.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    /// Total ticks executed.
    pub total_ticks: u64,
    /// Total late paced ticks.
    pub total_overruns: u64,
    /// Ticks whose measured `dt` had to be clamped to `max_dt`.
    pub total_clamped: u64,
    /// Maximum game-logic time observed between `wait_for_tick` and
    /// `record_tick_end`.
    pub max_tick_time: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Drives one real-time session's loop.
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Option<Duration>,
    tick_count: u64,
    /// When the next paced tick should fire.
    next_tick: Option<Instant>,
    /// When the previous tick fired, for measuring `dt`.
    last_tick: Option<Instant>,
    /// When the current tick's game logic started.
    tick_start: Option<Instant>,
    metrics: TickMetrics,
}

impl TickScheduler {
    /// Create a new scheduler from config.
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

        debug!(
            rate_hz = config.tick_rate_hz,
            policy = ?config.policy,
            "tick scheduler created"
        );

        Self {
            config,
            tick_duration,
            tick_count: 0,
            next_tick,
            last_tick: None,
            tick_start: None,
            metrics: TickMetrics::default(),
        }
    }

    /// Create a scheduler for a specific tick rate with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Wait until the next tick is due and report how much time it covers.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let mut overrun = false;

        match (self.next_tick, self.tick_duration) {
            (Some(next), Some(period)) => {
                time::sleep_until(next).await;
                let now = Instant::now();
                let late_by = now.saturating_duration_since(next);
                overrun = late_by > period / 10;
                if overrun {
                    warn!(
                        tick = self.tick_count + 1,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "tick fired late"
                    );
                    self.metrics.total_overruns += 1;
                }
                self.next_tick = Some(match self.config.policy {
                    TickPolicy::Skip => now + period,
                    TickPolicy::Drop => next + period,
                });
            }
            _ => tokio::task::yield_now().await,
        }

        let now = Instant::now();
        let dt = match self.last_tick {
            None => self.config.first_dt,
            Some(last) => {
                let measured = now.saturating_duration_since(last);
                if measured > self.config.max_dt {
                    self.metrics.total_clamped += 1;
                    self.config.max_dt
                } else if measured.is_zero() {
                    // Free-running ticks can land on the same clock reading.
                    Duration::from_nanos(1)
                } else {
                    measured
                }
            }
        };

        self.last_tick = Some(now);
        self.tick_start = Some(now);
        self.tick_count += 1;
        self.metrics.total_ticks += 1;

        trace!(tick = self.tick_count, dt_us = dt.as_micros() as u64, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt,
            overrun,
        }
    }

    /// Record that the game logic for the current tick has finished.
    ///
    /// Emits a warning when a paced tick used more than the configured
    /// share of its period.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();
        if elapsed > self.metrics.max_tick_time {
            self.metrics.max_tick_time = elapsed;
        }

        if let Some(budget) = self.tick_duration {
            let utilization = elapsed.as_secs_f64() / budget.as_secs_f64();
            if utilization >= self.config.budget_warn_threshold {
                warn!(
                    tick = self.tick_count,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    budget_ms = budget.as_secs_f64() * 1000.0,
                    "tick approaching budget limit"
                );
            }
        }
    }

    /// Whether this scheduler runs without pacing (tick rate = 0).
    pub fn is_free_running(&self) -> bool {
        self.tick_duration.is_none()
    }

    /// Current tick count.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Snapshot of current metrics.
    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    /// The configured tick rate in Hz.
    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }
}

//! # Frame Driver
//!
//! Fixed-timestep driver for hosts without a display link. Each pump adds the
//! wall time since the previous pump to a backlog and runs one renderer tick
//! per whole step in it, all with the same `dt`, so logical time advances the
//! same way whatever the host's frame pacing.
//!
//! A host that stalls does not get a burst of catch-up ticks: after
//! [`MAX_CATCH_UP_TICKS`] in one pump the rest of the backlog is dropped and
//! logical time falls behind wall time instead.

use std::time::{Duration, Instant};

use barrage_core::TickReport;
use barrage_shared::constants::{DEFAULT_TICK_RATE, MAX_CATCH_UP_TICKS};

use crate::renderer::Renderer;

/// Timing and admission totals over a run of ticks.
#[derive(Clone, Copy, Debug)]
pub struct TickStats {
    budget: Duration,
    ticks: u32,
    late_ticks: u32,
    fastest: Duration,
    slowest: Duration,
    busy: Duration,
    placed: usize,
    dropped: usize,
}

impl TickStats {
    /// Empty totals against a per-tick time budget.
    #[must_use]
    pub const fn new(budget: Duration) -> Self {
        Self {
            budget,
            ticks: 0,
            late_ticks: 0,
            fastest: Duration::MAX,
            slowest: Duration::ZERO,
            busy: Duration::ZERO,
            placed: 0,
            dropped: 0,
        }
    }

    /// Adds one tick that took `took` and produced `report`.
    pub fn record(&mut self, took: Duration, report: &TickReport) {
        self.ticks = self.ticks.saturating_add(1);
        self.fastest = self.fastest.min(took);
        self.slowest = self.slowest.max(took);
        self.busy = self.busy.saturating_add(took);
        self.placed += report.placed;
        self.dropped += report.dropped_overflow + report.dropped_starved;
        if took > self.budget {
            self.late_ticks = self.late_ticks.saturating_add(1);
        }
    }

    /// Ticks measured.
    #[must_use]
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Ticks that overran the budget.
    #[must_use]
    pub const fn late_ticks(&self) -> u32 {
        self.late_ticks
    }

    /// Fastest tick, zero before the first one.
    #[must_use]
    pub fn fastest(&self) -> Duration {
        if self.ticks == 0 {
            Duration::ZERO
        } else {
            self.fastest
        }
    }

    /// Slowest tick.
    #[must_use]
    pub const fn slowest(&self) -> Duration {
        self.slowest
    }

    /// Mean tick time.
    #[must_use]
    pub fn mean(&self) -> Duration {
        self.busy.checked_div(self.ticks).unwrap_or_default()
    }

    /// Sprites placed over the measured ticks.
    #[must_use]
    pub const fn placed(&self) -> usize {
        self.placed
    }

    /// Items dropped over the measured ticks, for overflow or lane starvation.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Per-tick time budget.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }
}

/// Fixed-timestep frame driver.
#[derive(Debug)]
pub struct TickLoop {
    step: Duration,
    last_pump: Instant,
    backlog: Duration,
    skipped: u64,
    stats: TickStats,
}

impl Default for TickLoop {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE)
    }
}

impl TickLoop {
    /// Creates a driver stepping `tick_rate` times per second (at least once).
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        let step = Duration::from_secs(1) / tick_rate.max(1);
        Self {
            step,
            last_pump: Instant::now(),
            backlog: Duration::ZERO,
            skipped: 0,
            stats: TickStats::new(step),
        }
    }

    /// Runs every tick due since the previous pump on `renderer`. Returns how
    /// many ran.
    pub fn pump(&mut self, renderer: &mut Renderer) -> u32 {
        let now = Instant::now();
        self.backlog += now.duration_since(self.last_pump);
        self.last_pump = now;

        let dt = self.dt();
        let mut ran = 0;
        while self.backlog >= self.step && ran < MAX_CATCH_UP_TICKS {
            self.backlog -= self.step;
            let started = Instant::now();
            let report = renderer.tick(dt);
            self.stats.record(started.elapsed(), &report);
            ran += 1;
        }

        if self.backlog >= self.step {
            let behind = self.backlog.as_nanos() / self.step.as_nanos().max(1);
            let behind = u64::try_from(behind).unwrap_or(u64::MAX);
            self.skipped = self.skipped.saturating_add(behind);
            self.backlog = Duration::ZERO;
            tracing::debug!(behind, "frame driver behind wall time, backlog dropped");
        }
        ran
    }

    /// Wall time until the next tick is due.
    #[must_use]
    pub fn until_next_tick(&self) -> Duration {
        self.step
            .saturating_sub(self.backlog)
            .saturating_sub(self.last_pump.elapsed())
    }

    /// Sleeps until the next tick is due.
    pub fn wait_for_next_tick(&self) {
        let remaining = self.until_next_tick();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }

    /// Fixed step in seconds.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.step.as_secs_f64()
    }

    /// Fixed step.
    #[must_use]
    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Ticks dropped because the host fell too far behind.
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Totals since creation or the last [`Self::reset_stats`].
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Clears the totals.
    pub fn reset_stats(&mut self) {
        self.stats = TickStats::new(self.step);
    }
}

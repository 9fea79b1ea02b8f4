//! # Logical Clock
//!
//! Monotonic, pausable, seekable time source for the engine.
//!
//! ```text
//!            start()              pause()
//!  Stopped ──────────> Running ─────────> Paused
//!     ▲                  │  ▲                │
//!     │     stop()       │  └────────────────┘
//!     └──────────────────┘       start()
//! ```
//!
//! Two integration modes:
//!
//! - **Local**: `elapsed += dt * speed` every tick.
//! - **External**: `elapsed` adopts the host's playback time every tick. A
//!   sample lower than the current elapsed time is a backward jump
//!   (seek-back), whether the previous tick was local or external.

use barrage_shared::constants::{DEFAULT_SPEED, TIME_EPSILON};

use crate::error::{EngineError, EngineResult};

/// Run state of the clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    /// Never started, or stopped. The next start resets elapsed time.
    #[default]
    Stopped,
    /// Advancing.
    Running,
    /// Frozen; the next start resumes from the frozen value.
    Paused,
}

/// What a call to [`LogicalClock::start`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// Elapsed time was reset to zero.
    Fresh,
    /// Resumed from pause.
    Resumed,
    /// Already running; nothing changed.
    AlreadyRunning,
}

/// Result of advancing the clock by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockSample {
    /// Elapsed time after the tick.
    pub now: f64,
    /// Elapsed time before the tick.
    pub previous: f64,
    /// True if an external sample moved time backwards.
    pub rewound: bool,
}

/// Pausable, speed-scaled logical clock.
#[derive(Clone, Debug)]
pub struct LogicalClock {
    state: RunState,
    elapsed: f64,
    speed: f64,
    epoch: Option<f64>,
}

impl Default for LogicalClock {
    fn default() -> Self {
        Self::new()
    }
}

impl LogicalClock {
    /// Creates a stopped clock at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: RunState::Stopped,
            elapsed: 0.0,
            speed: DEFAULT_SPEED,
            epoch: None,
        }
    }

    /// Starts or resumes the clock.
    pub fn start(&mut self) -> StartOutcome {
        match self.state {
            RunState::Stopped => {
                self.elapsed = 0.0;
                self.epoch = None;
                self.state = RunState::Running;
                StartOutcome::Fresh
            }
            RunState::Paused => {
                self.state = RunState::Running;
                StartOutcome::Resumed
            }
            RunState::Running => StartOutcome::AlreadyRunning,
        }
    }

    /// Freezes the clock. Returns false if it was not running.
    pub fn pause(&mut self) -> bool {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
            true
        } else {
            false
        }
    }

    /// Stops the clock. Elapsed time stays frozen until the next start resets it.
    pub fn stop(&mut self) {
        self.state = RunState::Stopped;
    }

    /// Sets the speed multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSpeed`] for non-positive or non-finite
    /// values; the previous speed is retained.
    pub fn set_speed(&mut self, speed: f64) -> EngineResult<()> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(EngineError::InvalidSpeed(speed));
        }
        self.speed = speed;
        Ok(())
    }

    /// Advances the clock by one tick.
    ///
    /// `dt` is wall time since the previous tick; it is ignored when an
    /// external sample is supplied. Returns `None` while not running.
    pub fn advance(&mut self, dt: f64, external: Option<f64>) -> Option<ClockSample> {
        if self.state != RunState::Running {
            return None;
        }

        let previous = self.elapsed;
        let mut rewound = false;

        match external.filter(|t| t.is_finite()) {
            Some(external) => {
                // No comparison before the first tick of a run: elapsed is
                // still the reset value, not a time the host has seen.
                rewound = self.epoch.is_some() && external < previous - TIME_EPSILON;
                self.epoch.get_or_insert(external);
                self.elapsed = external;
            }
            None => {
                self.epoch.get_or_insert(previous);
                if dt.is_finite() && dt > 0.0 {
                    self.elapsed += dt * self.speed;
                }
            }
        }

        Some(ClockSample {
            now: self.elapsed,
            previous,
            rewound,
        })
    }

    /// Current logical time.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.elapsed
    }

    /// Current speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Current run state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// True while advancing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Clock value at the first tick of the current run. Zero before that tick.
    #[must_use]
    pub fn epoch(&self) -> f64 {
        self.epoch.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_new_clock_is_stopped() {
        let mut clock = LogicalClock::new();
        assert_eq!(clock.state(), RunState::Stopped);
        assert!(clock.advance(DT, None).is_none());
        assert!(approx(clock.time(), 0.0));
    }

    #[test]
    fn test_elapsed_scales_with_speed() {
        for speed in [0.5, 1.0, 2.0, 3.25] {
            let mut clock = LogicalClock::new();
            clock.set_speed(speed).unwrap();
            clock.start();
            for _ in 0..120 {
                clock.advance(DT, None);
            }
            assert!(approx(clock.time(), 120.0 * DT * speed), "speed {speed}: {}", clock.time());
        }
    }

    #[test]
    fn test_invalid_speed_keeps_previous_rate() {
        let mut clock = LogicalClock::new();
        clock.set_speed(2.0).unwrap();
        assert_eq!(clock.set_speed(0.0), Err(EngineError::InvalidSpeed(0.0)));
        assert!(clock.set_speed(-1.0).is_err());
        assert!(clock.set_speed(f64::NAN).is_err());
        assert!(approx(clock.speed(), 2.0));

        clock.start();
        clock.advance(1.0, None);
        assert!(approx(clock.time(), 2.0));
    }

    #[test]
    fn test_speed_change_is_not_retroactive() {
        let mut clock = LogicalClock::new();
        clock.start();
        clock.advance(1.0, None);
        clock.set_speed(4.0).unwrap();
        clock.advance(1.0, None);
        assert!(approx(clock.time(), 5.0));
    }

    #[test]
    fn test_pause_freezes_and_start_resumes() {
        let mut clock = LogicalClock::new();
        clock.start();
        clock.advance(1.0, None);
        assert!(clock.pause());

        for _ in 0..10 {
            assert!(clock.advance(DT, None).is_none());
        }
        assert!(approx(clock.time(), 1.0));

        assert_eq!(clock.start(), StartOutcome::Resumed);
        clock.advance(1.0, None);
        assert!(approx(clock.time(), 2.0));
    }

    #[test]
    fn test_stop_then_start_resets() {
        let mut clock = LogicalClock::new();
        assert_eq!(clock.start(), StartOutcome::Fresh);
        clock.advance(3.0, None);
        clock.stop();
        assert!(approx(clock.time(), 3.0));

        assert_eq!(clock.start(), StartOutcome::Fresh);
        assert!(approx(clock.time(), 0.0));
        assert_eq!(clock.start(), StartOutcome::AlreadyRunning);
    }

    #[test]
    fn test_external_time_is_adopted() {
        let mut clock = LogicalClock::new();
        clock.set_speed(3.0).unwrap();
        clock.start();

        let sample = clock.advance(DT, Some(12.5)).unwrap();
        assert!(approx(sample.now, 12.5));
        assert!(!sample.rewound);
        assert!(approx(clock.epoch(), 12.5));

        let sample = clock.advance(DT, Some(13.0)).unwrap();
        assert!(approx(sample.now, 13.0));
        assert!(!sample.rewound);
    }

    #[test]
    fn test_backward_external_jump_is_detected() {
        let mut clock = LogicalClock::new();
        clock.start();
        clock.advance(DT, Some(8.0));

        let sample = clock.advance(DT, Some(5.0)).unwrap();
        assert!(sample.rewound);
        assert!(approx(sample.previous, 8.0));
        assert!(approx(sample.now, 5.0));

        let sample = clock.advance(DT, Some(5.1)).unwrap();
        assert!(!sample.rewound);
    }

    #[test]
    fn test_source_installed_mid_run_detects_jump_back() {
        let mut clock = LogicalClock::new();
        clock.start();
        for _ in 0..10 {
            clock.advance(1.0, None);
        }

        let sample = clock.advance(DT, Some(3.0)).unwrap();
        assert!(sample.rewound);
        assert!(approx(sample.previous, 10.0));
        assert!(approx(clock.epoch(), 0.0));

        // Back on the local clock, then a source reinstalled behind it.
        clock.advance(2.0, None);
        let sample = clock.advance(DT, Some(4.0)).unwrap();
        assert!(sample.rewound);
        assert!(approx(sample.previous, 5.0));
    }

    #[test]
    fn test_first_external_sample_of_run_is_not_a_jump() {
        let mut clock = LogicalClock::new();
        clock.start();
        clock.advance(5.0, None);
        clock.stop();

        clock.start();
        let sample = clock.advance(DT, Some(0.0)).unwrap();
        assert!(!sample.rewound);
    }

    #[test]
    fn test_local_epoch_is_zero() {
        let mut clock = LogicalClock::new();
        clock.start();
        clock.advance(0.5, None);
        assert!(approx(clock.epoch(), 0.0));
    }
}

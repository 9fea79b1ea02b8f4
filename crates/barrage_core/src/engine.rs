//! # Engine Tick Pipeline
//!
//! One sequential tick owns every mutation:
//!
//! ```text
//! ┌──────────────────────────── tick(dt) ────────────────────────────┐
//! │ 1. clock.advance          (local integration or external sample) │
//! │ 2. rewind                 (seek-back: redisplay history)         │
//! │ 3. ingest                 (record, then delay-schedule)          │
//! │ 4. delay queue → smoother                                        │
//! │ 5. finish expired sprites (End, lanes released)                  │
//! │ 6. smoother.admit → waiting + admitted → lane allocation         │
//! │ 7. activate due sprites   (Begin)                                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;

use barrage_shared::constants::DEFAULT_MAX_WAIT_TICKS;
use barrage_shared::{Descriptor, EdgeInsets, LifecycleEvent, RecordEntry, Size, SpriteId};

use crate::clock::{LogicalClock, RunState, StartOutcome};
use crate::error::EngineResult;
use crate::lanes::LaneAllocator;
use crate::lifecycle::{Sprite, SpriteLifecycleManager};
use crate::recording::RecordingLog;
use crate::schedule::{DelayQueue, RedisplayHistory};
use crate::smoother::AdmissionSmoother;

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Logical time after the tick.
    pub time: f64,
    /// False if the clock was not running and nothing happened.
    pub advanced: bool,
    /// True if the external clock jumped backwards this tick.
    pub rewound: bool,
    /// Descriptors taken in from the feed.
    pub ingested: usize,
    /// Descriptors re-admitted or rescheduled by redisplay.
    pub redisplayed: usize,
    /// Sprites placed on a lane.
    pub placed: usize,
    /// Items still waiting for a lane after this tick.
    pub waiting: usize,
    /// Items dropped by the smoother's overflow policy.
    pub dropped_overflow: usize,
    /// Items dropped after waiting too long for a lane.
    pub dropped_starved: usize,
    /// Sprites that finished naturally.
    pub finished: usize,
}

/// Item waiting for a free lane.
#[derive(Debug)]
struct Waiting {
    descriptor: Descriptor,
    ticks: u32,
}

/// The scheduling and lane-allocation engine.
#[derive(Debug)]
pub struct Engine {
    clock: LogicalClock,
    smoother: AdmissionSmoother<Descriptor>,
    lanes: LaneAllocator,
    lifecycle: SpriteLifecycleManager,
    recording: RecordingLog,
    delayed: DelayQueue,
    history: RedisplayHistory,
    waiting: VecDeque<Waiting>,
    max_wait_ticks: u32,
    recording_enabled: bool,
    redisplay: bool,
    z_index_ordering: bool,
    next_sprite: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates a stopped engine with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: LogicalClock::new(),
            smoother: AdmissionSmoother::default(),
            lanes: LaneAllocator::default(),
            lifecycle: SpriteLifecycleManager::new(),
            recording: RecordingLog::new(),
            delayed: DelayQueue::new(),
            history: RedisplayHistory::new(),
            waiting: VecDeque::new(),
            max_wait_ticks: DEFAULT_MAX_WAIT_TICKS,
            recording_enabled: false,
            redisplay: false,
            z_index_ordering: false,
            next_sprite: 1,
        }
    }

    // =========================================================================
    // CONTROL
    // =========================================================================

    /// Starts or resumes the clock.
    pub fn start(&mut self) -> StartOutcome {
        self.clock.start()
    }

    /// Freezes the clock. Returns false if it was not running.
    pub fn pause(&mut self) -> bool {
        self.clock.pause()
    }

    /// Stops the clock and discards all state: lanes, sprites, queues,
    /// redisplay history and the recording log. Settings survive.
    pub fn stop(&mut self) {
        self.clock.stop();
        self.smoother.clear();
        self.lanes.clear();
        self.lifecycle.clear();
        self.recording.clear();
        self.delayed.clear();
        self.history.clear();
        self.waiting.clear();
    }

    /// Advances one tick.
    ///
    /// `incoming` are descriptors received since the previous tick. They are
    /// dropped if the clock is not running.
    pub fn tick<I>(&mut self, dt: f64, external_time: Option<f64>, incoming: I) -> TickReport
    where
        I: IntoIterator<Item = Descriptor>,
    {
        let Some(sample) = self.clock.advance(dt, external_time) else {
            return TickReport {
                time: self.clock.time(),
                ..TickReport::default()
            };
        };
        let now = sample.now;
        let mut report = TickReport {
            time: now,
            advanced: true,
            rewound: sample.rewound,
            ..TickReport::default()
        };

        if sample.rewound {
            report.redisplayed = self.rewind(sample.previous, now);
        }

        for descriptor in incoming {
            self.ingest(descriptor, now);
            report.ingested += 1;
        }

        for descriptor in self.delayed.pop_due(now) {
            self.smoother.push(descriptor);
        }

        report.finished = self.lifecycle.finish_expired(now, &mut self.lanes);

        let batch = self.smoother.admit();
        report.dropped_overflow = batch.dropped;
        if batch.dropped > 0 {
            tracing::debug!(dropped = batch.dropped, "pending queue overflow, oldest items dropped");
        }

        let candidates = std::mem::take(&mut self.waiting)
            .into_iter()
            .chain(batch.admitted.into_iter().map(|descriptor| Waiting { descriptor, ticks: 0 }));
        for mut candidate in candidates {
            match self.place(candidate.descriptor, now) {
                Ok(()) => report.placed += 1,
                Err(descriptor) => {
                    candidate.ticks += 1;
                    if candidate.ticks > self.max_wait_ticks {
                        report.dropped_starved += 1;
                        tracing::debug!(
                            sprite_name = %descriptor.sprite_name,
                            waited = candidate.ticks,
                            "no free lane, item dropped"
                        );
                    } else {
                        self.waiting.push_back(Waiting {
                            descriptor,
                            ticks: candidate.ticks,
                        });
                    }
                }
            }
        }
        report.waiting = self.waiting.len();

        self.lifecycle.activate_due(now);
        report
    }

    fn ingest(&mut self, descriptor: Descriptor, now: f64) {
        if self.recording_enabled {
            self.recording.append(descriptor.clone(), now, self.clock.epoch());
        }
        let delay = descriptor.effective_delay();
        if delay > 0.0 {
            self.delayed.push(now + delay, descriptor);
        } else {
            self.smoother.push(descriptor);
        }
    }

    fn place(&mut self, descriptor: Descriptor, now: f64) -> Result<(), Descriptor> {
        let id = SpriteId(self.next_sprite);
        let Some(reservation) =
            self.lanes
                .reserve(descriptor.axis(), now, descriptor.effective_duration(), id)
        else {
            return Err(descriptor);
        };
        self.next_sprite += 1;

        if self.redisplay {
            self.history
                .remember(id, descriptor.clone(), reservation.enter_at, reservation.exit_at);
        }
        self.lifecycle.spawn(Sprite::new(id, descriptor, reservation));
        Ok(())
    }

    fn rewind(&mut self, from: f64, to: f64) -> usize {
        self.lanes.rewind(to);
        if !self.redisplay {
            tracing::debug!(from, to, "clock rewound, redisplay disabled");
            return 0;
        }

        self.lifecycle.remove_entering_after(to, &mut self.lanes);

        let lifecycle = &self.lifecycle;
        let rewind = self.history.rewind(to, |id| lifecycle.contains(id));
        let count = rewind.readmit.len() + rewind.reschedule.len();
        tracing::debug!(from, to, readmit = rewind.readmit.len(), reschedule = rewind.reschedule.len(), "clock rewound");

        for descriptor in rewind.readmit {
            self.smoother.push(descriptor);
        }
        for (due, descriptor) in rewind.reschedule {
            self.delayed.push(due, descriptor);
        }
        count
    }

    // =========================================================================
    // REMOVAL & QUERIES
    // =========================================================================

    /// Force-finishes every present sprite matching the type filter.
    pub fn remove_present_sprites_with_name(&mut self, name: Option<&str>) -> usize {
        let now = self.clock.time();
        self.lifecycle.remove_with_name(name, now, &mut self.lanes)
    }

    /// Force-finishes the sprite carrying `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownIdentifier`](crate::EngineError::UnknownIdentifier) if no present sprite has it.
    pub fn remove_sprite_with_identifier(&mut self, identifier: &str) -> EngineResult<SpriteId> {
        let now = self.clock.time();
        self.lifecycle.remove_with_identifier(identifier, now, &mut self.lanes)
    }

    /// Number of active sprites matching the type filter.
    #[must_use]
    pub fn sprites_number_with_name(&self, name: Option<&str>) -> usize {
        self.lifecycle.count_active(name)
    }

    /// Live sprites in admission order.
    #[must_use]
    pub fn sprites(&self) -> &[Sprite] {
        self.lifecycle.sprites()
    }

    /// Draw order for this frame; sorted by z-index when ordering is enabled.
    #[must_use]
    pub fn draw_order(&self) -> Vec<&Sprite> {
        self.lifecycle.draw_order(self.z_index_ordering)
    }

    /// Takes lifecycle events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        self.lifecycle.drain_events()
    }

    /// Recorded entries in admission order.
    #[must_use]
    pub fn records(&self) -> &[RecordEntry] {
        self.recording.entries()
    }

    /// Recorded descriptors with their delays folded in, ready for replay.
    #[must_use]
    pub fn replay(&self) -> Vec<Descriptor> {
        self.recording.replay()
    }

    /// Current logical time.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Logical time since the start epoch of the current run.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        (self.clock.time() - self.clock.epoch()).max(0.0)
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.clock.state()
    }

    /// True while the clock is advancing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Items waiting in the smoother, the delay queue and for a lane.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.smoother.len() + self.delayed.len() + self.waiting.len()
    }

    /// Lane allocator, for geometry queries.
    #[must_use]
    pub const fn lanes(&self) -> &LaneAllocator {
        &self.lanes
    }

    // =========================================================================
    // SETTINGS
    // =========================================================================

    /// Sets the clock speed multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSpeed`](crate::EngineError::InvalidSpeed) for non-positive values.
    pub fn set_speed(&mut self, speed: f64) -> EngineResult<()> {
        self.clock.set_speed(speed)
    }

    /// Current speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.clock.speed()
    }

    /// Sets the smoothing coefficient.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSmoothness`](crate::EngineError::InvalidSmoothness) outside [0, 1].
    pub fn set_smoothness(&mut self, smoothness: f64) -> EngineResult<()> {
        self.smoother.set_smoothness(smoothness)
    }

    /// Current smoothing coefficient.
    #[must_use]
    pub const fn smoothness(&self) -> f64 {
        self.smoother.smoothness()
    }

    /// Sets the smoother's overflow capacity.
    pub fn set_pending_capacity(&mut self, capacity: usize) {
        self.smoother.set_capacity(capacity);
    }

    /// Sets how many ticks an item may wait for a lane.
    pub fn set_max_wait_ticks(&mut self, ticks: u32) {
        self.max_wait_ticks = ticks;
    }

    /// Sets the container size.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidContainer`](crate::EngineError::InvalidContainer) for negative sizes.
    pub fn set_container_size(&mut self, size: Size) -> EngineResult<()> {
        self.lanes.set_container(size)
    }

    /// Sets absolute canvas margins.
    pub fn set_canvas_margin(&mut self, margin: Option<EdgeInsets>) {
        self.lanes.set_margin(margin);
    }

    /// Sets percent canvas margins.
    pub fn set_canvas_percent_margin(&mut self, margin: Option<EdgeInsets>) {
        self.lanes.set_percent_margin(margin);
    }

    /// Sets the lane thickness.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidLaneThickness`](crate::EngineError::InvalidLaneThickness) for non-positive values.
    pub fn set_lane_thickness(&mut self, thickness: f32) -> EngineResult<()> {
        self.lanes.set_lane_thickness(thickness)
    }

    /// Enables or disables redisplay on seek-back. Disabling forgets history.
    pub fn set_redisplay(&mut self, redisplay: bool) {
        self.redisplay = redisplay;
        if !redisplay {
            self.history.clear();
        }
    }

    /// Whether redisplay is enabled.
    #[must_use]
    pub const fn redisplay(&self) -> bool {
        self.redisplay
    }

    /// Enables or disables z-index draw ordering.
    pub fn set_z_index_ordering(&mut self, enabled: bool) {
        self.z_index_ordering = enabled;
    }

    /// Whether z-index draw ordering is enabled.
    #[must_use]
    pub const fn z_index_ordering(&self) -> bool {
        self.z_index_ordering
    }

    /// Enables or disables recording. Existing entries are kept either way.
    pub fn set_recording(&mut self, recording: bool) {
        self.recording_enabled = recording;
    }

    /// Whether recording is enabled.
    #[must_use]
    pub const fn recording(&self) -> bool {
        self.recording_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barrage_shared::{LaneAxis, SpriteStage};

    const DT: f64 = 1.0 / 60.0;

    fn none() -> std::iter::Empty<Descriptor> {
        std::iter::empty()
    }

    fn running() -> Engine {
        let mut engine = Engine::new();
        engine.start();
        engine
    }

    #[test]
    fn test_tick_before_start_drops_incoming() {
        let mut engine = Engine::new();
        let report = engine.tick(DT, None, vec![Descriptor::new("a", "x")]);
        assert!(!report.advanced);
        assert_eq!(report.ingested, 0);
        assert_eq!(engine.backlog(), 0);
    }

    #[test]
    fn test_item_placed_and_activated_same_tick() {
        let mut engine = running();
        let report = engine.tick(DT, None, vec![Descriptor::new("a", "x")]);
        assert_eq!(report.placed, 1);
        assert_eq!(engine.sprites_number_with_name(None), 1);

        let events = engine.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, SpriteStage::Begin);
    }

    #[test]
    fn test_sprite_finishes_after_duration() {
        let mut engine = running();
        engine.tick(DT, None, vec![Descriptor::new("a", "x").with_duration(1.0)]);
        engine.drain_events();

        let mut finished = 0;
        for _ in 0..70 {
            finished += engine.tick(DT, None, none()).finished;
        }
        assert_eq!(finished, 1);
        assert_eq!(engine.sprites_number_with_name(None), 0);
        assert_eq!(engine.drain_events()[0].stage, SpriteStage::End);
    }

    #[test]
    fn test_delay_postpones_admission() {
        let mut engine = running();
        engine.tick(DT, None, vec![Descriptor::new("a", "x").with_delay(0.5)]);
        assert_eq!(engine.sprites().len(), 0);

        for _ in 0..29 {
            engine.tick(DT, None, none());
        }
        assert_eq!(engine.sprites().len(), 0);

        for _ in 0..2 {
            engine.tick(DT, None, none());
        }
        assert_eq!(engine.sprites().len(), 1);
    }

    #[test]
    fn test_no_lane_overlap_under_load() {
        let mut engine = running();
        engine.set_container_size(Size::new(640.0, 128.0)).unwrap();
        engine.set_max_wait_ticks(1000);

        for tick in 0..600 {
            let burst: Vec<Descriptor> = (0..3)
                .map(|i| Descriptor::new("a", format!("{tick}-{i}")).with_duration(0.7))
                .collect();
            engine.tick(DT, None, burst);

            let sprites = engine.sprites();
            for (i, a) in sprites.iter().enumerate() {
                for b in &sprites[i + 1..] {
                    if a.slot == b.slot {
                        assert!(
                            a.exit_at <= b.enter_at + 1e-9 || b.exit_at <= a.enter_at + 1e-9,
                            "overlap on {:?}",
                            a.slot
                        );
                    }
                }
            }
            assert!(sprites.len() <= 4);
        }
    }

    #[test]
    fn test_starved_items_are_dropped() {
        let mut engine = running();
        engine.set_container_size(Size::new(640.0, 32.0)).unwrap();
        engine.set_max_wait_ticks(3);

        let report = engine.tick(DT, None, vec![
            Descriptor::new("a", "1").with_duration(10.0),
            Descriptor::new("a", "2").with_duration(10.0),
        ]);
        assert_eq!(report.placed, 1);
        assert_eq!(report.waiting, 1);

        let mut starved = 0;
        for _ in 0..3 {
            starved += engine.tick(DT, None, none()).dropped_starved;
        }
        assert_eq!(starved, 1);
        assert_eq!(engine.backlog(), 0);
    }

    #[test]
    fn test_waiting_items_keep_priority() {
        let mut engine = running();
        engine.set_container_size(Size::new(640.0, 32.0)).unwrap();
        engine.tick(DT, None, vec![
            Descriptor::new("a", "first").with_duration(0.05),
            Descriptor::new("a", "second").with_duration(0.05),
        ]);
        for _ in 0..3 {
            engine.tick(DT, None, vec![Descriptor::new("a", "late").with_duration(0.05)]);
        }
        let contents: Vec<&str> = engine.sprites().iter().map(|s| s.descriptor.content.as_str()).collect();
        assert_eq!(contents, vec!["second"]);
    }

    #[test]
    fn test_vertical_items_use_column_lanes() {
        let mut engine = running();
        engine.tick(DT, None, vec![
            Descriptor::new("a", "h"),
            Descriptor::new("a", "v").with_direction(barrage_shared::Direction::TopToBottom),
        ]);
        let axes: Vec<LaneAxis> = engine.sprites().iter().map(|s| s.slot.axis).collect();
        assert_eq!(axes, vec![LaneAxis::Horizontal, LaneAxis::Vertical]);
        assert!(engine.sprites().iter().all(|s| s.slot.index == 0));
    }

    #[test]
    fn test_recording_delay_from_epoch() {
        let mut engine = running();
        engine.set_recording(true);
        engine.set_speed(2.0).unwrap();
        engine.tick(0.5, None, vec![Descriptor::new("a", "1")]);
        engine.tick(0.5, None, vec![Descriptor::new("a", "2")]);

        let delays: Vec<f64> = engine.records().iter().map(|r| r.delay).collect();
        assert_eq!(delays, vec![1.0, 2.0]);
    }

    #[test]
    fn test_stop_clears_everything() {
        let mut engine = running();
        engine.set_recording(true);
        engine.set_redisplay(true);
        engine.tick(DT, None, vec![Descriptor::new("a", "1"), Descriptor::new("a", "2").with_delay(5.0)]);
        assert!(!engine.records().is_empty());

        engine.stop();
        assert!(engine.records().is_empty());
        assert!(engine.sprites().is_empty());
        assert_eq!(engine.backlog(), 0);
        assert!(engine.lanes().lanes(LaneAxis::Horizontal).is_empty());

        engine.start();
        assert!(engine.time().abs() < 1e-12);
        assert!(engine.recording());
    }

    #[test]
    fn test_redisplay_readmits_window_containing_new_time() {
        let mut engine = running();
        engine.set_redisplay(true);
        engine.tick(DT, Some(4.0), vec![Descriptor::new("a", "window").with_duration(3.0)]);
        engine.tick(DT, Some(8.0), none());
        assert_eq!(engine.sprites().len(), 0);

        let report = engine.tick(DT, Some(5.0), none());
        assert!(report.rewound);
        assert_eq!(report.redisplayed, 1);
        assert_eq!(engine.sprites().len(), 1);
        assert_eq!(engine.sprites()[0].descriptor.content, "window");
    }

    #[test]
    fn test_rewind_without_redisplay_readmits_nothing() {
        let mut engine = running();
        engine.tick(DT, Some(4.0), vec![Descriptor::new("a", "window").with_duration(3.0)]);
        engine.tick(DT, Some(8.0), none());

        let report = engine.tick(DT, Some(5.0), none());
        assert!(report.rewound);
        assert_eq!(report.redisplayed, 0);
        assert!(engine.sprites().is_empty());
    }

    #[test]
    fn test_redisplay_reschedules_future_windows() {
        let mut engine = running();
        engine.set_redisplay(true);
        engine.tick(DT, Some(6.0), vec![Descriptor::new("a", "later").with_duration(3.0)]);
        engine.tick(DT, Some(8.0), none());
        assert_eq!(engine.sprites().len(), 1);

        engine.tick(DT, Some(5.0), none());
        assert!(engine.sprites().is_empty());

        engine.tick(DT, Some(6.0), none());
        assert_eq!(engine.sprites().len(), 1);
        assert_eq!(engine.sprites()[0].descriptor.content, "later");
    }

    #[test]
    fn test_redisplay_is_not_recorded_twice() {
        let mut engine = running();
        engine.set_redisplay(true);
        engine.set_recording(true);
        engine.tick(DT, Some(4.0), vec![Descriptor::new("a", "window").with_duration(3.0)]);
        engine.tick(DT, Some(8.0), none());
        engine.tick(DT, Some(5.0), none());
        assert_eq!(engine.records().len(), 1);
    }

    #[test]
    fn test_invalid_settings_keep_previous() {
        let mut engine = Engine::new();
        engine.set_speed(1.5).unwrap();
        assert!(engine.set_speed(-2.0).is_err());
        assert!((engine.speed() - 1.5).abs() < f64::EPSILON);
        assert!(engine.set_smoothness(2.0).is_err());
        assert!(engine.smoothness().abs() < f64::EPSILON);
    }
}

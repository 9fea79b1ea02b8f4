//! # Renderer Facade
//!
//! The control surface a host talks to. It owns the [`Engine`], the inbox
//! that feed threads write to, the optional host hooks and the published
//! snapshot.
//!
//! ```text
//!            receive / load                       ReceiverHandle (any thread)
//!                  │                                        │
//!                  ▼                                        ▼
//!   ┌─────────────────────── Renderer::tick(dt) ─────────────────────────┐
//!   │ staged + inbox ──► Engine::tick ──► lifecycle events ──► observer │
//!   │                                   └──► publish ──► SnapshotReader │
//!   └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here returns an error. Invalid settings are logged and ignored,
//! descriptors received while not running are dropped, and removals of
//! unknown sprites do nothing.

use std::sync::Arc;

use barrage_core::{Engine, RunState, StartOutcome, TickReport};
use barrage_shared::constants::INBOX_CAPACITY;
use barrage_shared::{Descriptor, EdgeInsets, Rect, RecordEntry, Size};
use parking_lot::RwLock;

use crate::config::{LoadDelayPolicy, RendererConfig};
use crate::handlers::{Handlers, ViewHandle};
use crate::inbox::{Inbox, ReceiverHandle};
use crate::snapshot::{Snapshot, SnapshotReader};

/// The barrage renderer.
#[derive(Debug)]
pub struct Renderer {
    engine: Engine,
    inbox: Inbox,
    /// Received on the owner thread since the last tick.
    staged: Vec<Descriptor>,
    /// Loaded while not running; dispatched at the next start.
    deferred: Vec<Descriptor>,
    handlers: Handlers,
    snapshot: Arc<RwLock<Snapshot>>,
    load_delay_policy: LoadDelayPolicy,
    masked: bool,
    view: Option<ViewHandle>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Creates a stopped renderer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&RendererConfig::default())
    }

    /// Creates a stopped renderer from a config.
    #[must_use]
    pub fn with_config(config: &RendererConfig) -> Self {
        let mut renderer = Self {
            engine: Engine::new(),
            inbox: Inbox::new(INBOX_CAPACITY),
            staged: Vec::new(),
            deferred: Vec::new(),
            handlers: Handlers::new(),
            snapshot: Arc::new(RwLock::new(Snapshot::default())),
            load_delay_policy: LoadDelayPolicy::default(),
            masked: true,
            view: None,
        };
        renderer.apply_config(config);
        renderer
    }

    /// Applies every setting from `config`. Invalid values are logged and
    /// skipped individually.
    pub fn apply_config(&mut self, config: &RendererConfig) {
        self.set_container_size(config.container);
        self.set_canvas_margin(config.canvas_margin);
        self.set_canvas_percent_margin(config.canvas_percent_margin);
        self.set_lane_thickness(config.lane_thickness);
        self.set_masked(config.masked);
        self.set_smoothness(config.smoothness);
        self.set_speed(config.speed);
        self.set_redisplay(config.redisplay);
        self.set_z_index(config.z_index);
        self.set_recording(config.recording);
        self.set_load_delay_policy(config.load_delay_policy);
        self.set_pending_capacity(config.pending_capacity);
        self.set_max_wait_ticks(config.max_wait_ticks);
    }

    // =========================================================================
    // CONTROL
    // =========================================================================

    /// Starts or resumes the renderer.
    ///
    /// From stopped, time restarts at zero. Descriptors passed to
    /// [`Self::load`] while not running are dispatched now.
    pub fn start(&mut self) -> StartOutcome {
        let outcome = self.engine.start();
        match outcome {
            StartOutcome::Fresh => {
                self.inbox.clear();
                tracing::info!("renderer started");
            }
            StartOutcome::Resumed => {
                tracing::info!(time = self.engine.time(), "renderer resumed");
            }
            StartOutcome::AlreadyRunning => return outcome,
        }
        self.inbox.set_running(true);

        if !self.deferred.is_empty() {
            let deferred = std::mem::take(&mut self.deferred);
            tracing::debug!(count = deferred.len(), "dispatching deferred load");
            self.stage_loaded(deferred);
        }
        outcome
    }

    /// Freezes the clock. Received descriptors are dropped until the next
    /// start. Returns false if the renderer was not running.
    pub fn pause(&mut self) -> bool {
        if !self.engine.pause() {
            return false;
        }
        self.inbox.set_running(false);
        tracing::info!(time = self.engine.time(), "renderer paused");
        true
    }

    /// Stops and resets: sprites, lanes, queues, recording log, inbox and
    /// deferred load are all discarded. Settings and hooks survive.
    pub fn stop(&mut self) {
        self.engine.stop();
        self.inbox.set_running(false);
        let discarded = self.inbox.clear() + self.staged.len() + self.deferred.len();
        self.staged.clear();
        self.deferred.clear();
        self.publish();
        tracing::info!(discarded, "renderer stopped");
    }

    /// Queues a descriptor for the next tick. Dropped unless running.
    pub fn receive(&mut self, descriptor: Descriptor) -> bool {
        if !self.engine.is_running() {
            tracing::debug!(
                sprite_name = %descriptor.sprite_name,
                "renderer not running, descriptor dropped"
            );
            return false;
        }
        self.staged.push(descriptor);
        true
    }

    /// Feeds a batch of descriptors, typically a previous session from
    /// [`Self::replay_records`].
    ///
    /// While running they are received right away. Otherwise they wait for
    /// the next [`Self::start`]. Delays are handled per
    /// [`LoadDelayPolicy`].
    pub fn load<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = Descriptor>,
    {
        if self.engine.is_running() {
            self.stage_loaded(descriptors);
        } else {
            let before = self.deferred.len();
            self.deferred.extend(descriptors);
            tracing::debug!(count = self.deferred.len() - before, "load deferred until start");
        }
    }

    fn stage_loaded<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = Descriptor>,
    {
        let elapsed = self.engine.elapsed();
        let policy = self.load_delay_policy;
        self.staged.extend(descriptors.into_iter().map(|mut descriptor| {
            if policy == LoadDelayPolicy::Restamp {
                descriptor.delay = (descriptor.effective_delay() - elapsed).max(0.0);
            }
            descriptor
        }));
    }

    /// Advances one frame. `dt` is wall time since the previous frame; it is
    /// ignored while a time source is installed.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let external = self.handlers.sample_time();
        let incoming = if self.engine.is_running() {
            let mut incoming = std::mem::take(&mut self.staged);
            incoming.extend(self.inbox.drain());
            incoming
        } else {
            Vec::new()
        };

        let report = self.engine.tick(dt, external, incoming);
        self.dispatch_events();
        self.publish();
        report
    }

    fn dispatch_events(&mut self) {
        for event in self.engine.drain_events() {
            self.handlers.notify(&event);
        }
    }

    fn publish(&self) {
        self.snapshot.write().refresh(&self.engine);
    }

    // =========================================================================
    // REMOVAL & QUERIES
    // =========================================================================

    /// Finishes every present sprite of type `name` (all sprites for `None`).
    /// Returns how many were removed.
    pub fn remove_present_sprites_with_name(&mut self, name: Option<&str>) -> usize {
        let removed = self.engine.remove_present_sprites_with_name(name);
        if removed > 0 {
            self.dispatch_events();
            self.publish();
        }
        tracing::debug!(?name, removed, "present sprites removed");
        removed
    }

    /// Finishes the sprite carrying `identifier`. Returns false if there is
    /// none.
    pub fn remove_sprite_with_identifier(&mut self, identifier: &str) -> bool {
        match self.engine.remove_sprite_with_identifier(identifier) {
            Ok(sprite) => {
                self.dispatch_events();
                self.publish();
                tracing::debug!(%sprite, identifier, "sprite removed");
                true
            }
            Err(error) => {
                tracing::debug!(%error, "removal ignored");
                false
            }
        }
    }

    /// Number of sprites on screen of type `name` (all sprites for `None`).
    #[must_use]
    pub fn sprites_number_with_name(&self, name: Option<&str>) -> usize {
        self.engine.sprites_number_with_name(name)
    }

    /// Recorded entries in admission order.
    #[must_use]
    pub fn records(&self) -> &[RecordEntry] {
        self.engine.records()
    }

    /// The recorded session as descriptors for [`Self::load`].
    #[must_use]
    pub fn replay_records(&self) -> Vec<Descriptor> {
        self.engine.replay()
    }

    /// Current logical time.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.engine.time()
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.engine.run_state()
    }

    /// True while running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Usable canvas region after margins.
    #[must_use]
    pub fn canvas(&self) -> Rect {
        self.engine.lanes().canvas()
    }

    /// Descriptors not yet on a lane: staged, in the inbox, deferred, or
    /// queued inside the engine.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.engine.backlog() + self.staged.len() + self.inbox.len() + self.deferred.len()
    }

    /// The engine, for inspection.
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// New handle for feeding descriptors from other threads.
    #[must_use]
    pub fn receiver(&self) -> ReceiverHandle {
        self.inbox.handle()
    }

    /// New reader of the published snapshot.
    #[must_use]
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader::new(Arc::clone(&self.snapshot))
    }

    // =========================================================================
    // HOOKS & VIEW
    // =========================================================================

    /// Replaces all host hooks.
    pub fn set_handlers(&mut self, handlers: Handlers) {
        self.handlers = handlers;
    }

    /// Host hooks, for installing or clearing one of them.
    pub fn handlers_mut(&mut self) -> &mut Handlers {
        &mut self.handlers
    }

    /// Associates the host view.
    pub fn attach_view(&mut self, view: ViewHandle) {
        self.view = Some(view);
    }

    /// Forgets the host view.
    pub fn detach_view(&mut self) -> Option<ViewHandle> {
        self.view.take()
    }

    /// The associated host view, if any.
    #[must_use]
    pub const fn view(&self) -> Option<ViewHandle> {
        self.view
    }

    // =========================================================================
    // SETTINGS
    // =========================================================================

    /// Sets absolute canvas margins.
    pub fn set_canvas_margin(&mut self, margin: Option<EdgeInsets>) {
        self.engine.set_canvas_margin(margin);
    }

    /// Sets canvas margins as fractions of the container. They win over
    /// absolute margins.
    pub fn set_canvas_percent_margin(&mut self, margin: Option<EdgeInsets>) {
        self.engine.set_canvas_percent_margin(margin);
    }

    /// Reports the host container size.
    pub fn set_container_size(&mut self, size: Size) {
        if let Err(error) = self.engine.set_container_size(size) {
            tracing::warn!(%error, "container size rejected");
        }
    }

    /// Sets the lane thickness.
    pub fn set_lane_thickness(&mut self, thickness: f32) {
        if let Err(error) = self.engine.set_lane_thickness(thickness) {
            tracing::warn!(%error, "lane thickness rejected");
        }
    }

    /// Sets whether the canvas intercepts input.
    pub fn set_masked(&mut self, masked: bool) {
        self.masked = masked;
    }

    /// Whether the canvas intercepts input.
    #[must_use]
    pub const fn is_masked(&self) -> bool {
        self.masked
    }

    /// Sets burst smoothing in [0, 1].
    pub fn set_smoothness(&mut self, smoothness: f64) {
        if let Err(error) = self.engine.set_smoothness(smoothness) {
            tracing::warn!(%error, kept = self.engine.smoothness(), "smoothness rejected");
        }
    }

    /// Current smoothing coefficient.
    #[must_use]
    pub const fn smoothness(&self) -> f64 {
        self.engine.smoothness()
    }

    /// Sets the clock speed. Non-positive values are ignored.
    pub fn set_speed(&mut self, speed: f64) {
        if let Err(error) = self.engine.set_speed(speed) {
            tracing::warn!(%error, kept = self.engine.speed(), "speed rejected");
        }
    }

    /// Current speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.engine.speed()
    }

    /// Enables re-showing items after the time source seeks backwards.
    pub fn set_redisplay(&mut self, redisplay: bool) {
        self.engine.set_redisplay(redisplay);
    }

    /// Whether redisplay is enabled.
    #[must_use]
    pub const fn redisplay(&self) -> bool {
        self.engine.redisplay()
    }

    /// Enables z-index draw ordering.
    pub fn set_z_index(&mut self, enabled: bool) {
        self.engine.set_z_index_ordering(enabled);
    }

    /// Whether z-index draw ordering is enabled.
    #[must_use]
    pub const fn z_index(&self) -> bool {
        self.engine.z_index_ordering()
    }

    /// Enables recording of received descriptors.
    pub fn set_recording(&mut self, recording: bool) {
        self.engine.set_recording(recording);
    }

    /// Whether recording is enabled.
    #[must_use]
    pub const fn recording(&self) -> bool {
        self.engine.recording()
    }

    /// Sets how [`Self::load`] treats delays.
    pub fn set_load_delay_policy(&mut self, policy: LoadDelayPolicy) {
        self.load_delay_policy = policy;
    }

    /// Current load delay policy.
    #[must_use]
    pub const fn load_delay_policy(&self) -> LoadDelayPolicy {
        self.load_delay_policy
    }

    /// Sets the smoother queue depth before high smoothness drops items.
    pub fn set_pending_capacity(&mut self, capacity: usize) {
        self.engine.set_pending_capacity(capacity);
    }

    /// Sets how many ticks an item may wait for a lane.
    pub fn set_max_wait_ticks(&mut self, ticks: u32) {
        self.engine.set_max_wait_ticks(ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use barrage_shared::SpriteStage;

    #[test]
    fn test_receive_before_start_is_dropped() {
        let mut renderer = Renderer::new();
        assert!(!renderer.receive(Descriptor::new("a", "x")));
        renderer.start();
        renderer.tick(0.1);
        assert_eq!(renderer.sprites_number_with_name(None), 0);
    }

    #[test]
    fn test_received_item_shows_next_tick() {
        let mut renderer = Renderer::new();
        renderer.start();
        assert!(renderer.receive(Descriptor::new("a", "x")));
        renderer.tick(0.1);
        assert_eq!(renderer.sprites_number_with_name(Some("a")), 1);
        assert_eq!(renderer.reader().sprites_number_with_name(Some("a")), 1);
    }

    #[test]
    fn test_restamp_policy_subtracts_elapsed() {
        let mut renderer = Renderer::new();
        renderer.set_load_delay_policy(LoadDelayPolicy::Restamp);
        renderer.start();
        renderer.tick(2.0);

        // Restamped to a 1s delay, due one second after the ingesting tick.
        renderer.load(vec![Descriptor::new("a", "x").with_delay(3.0)]);
        renderer.tick(0.5);
        assert_eq!(renderer.sprites_number_with_name(None), 0);
        renderer.tick(1.2);
        assert_eq!(renderer.sprites_number_with_name(None), 1);
    }

    #[test]
    fn test_load_while_paused_dispatches_on_resume() {
        let mut renderer = Renderer::new();
        renderer.start();
        renderer.tick(0.1);
        renderer.pause();
        renderer.load(vec![Descriptor::new("a", "x")]);
        renderer.tick(0.1);
        assert_eq!(renderer.sprites_number_with_name(None), 0);

        assert_eq!(renderer.start(), StartOutcome::Resumed);
        renderer.tick(0.1);
        assert_eq!(renderer.sprites_number_with_name(None), 1);
    }

    #[test]
    fn test_observer_sees_forced_end() {
        let ends = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ends);
        let mut renderer = Renderer::new();
        renderer.handlers_mut().set_stage_observer(move |event| {
            if event.stage == SpriteStage::End {
                assert_eq!(event.param("reason"), Some("removed_by_identifier"));
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });
        renderer.start();
        renderer.receive(Descriptor::new("a", "x").with_identifier("msg-1"));
        renderer.tick(0.1);

        assert!(renderer.remove_sprite_with_identifier("msg-1"));
        assert!(!renderer.remove_sprite_with_identifier("msg-1"));
        assert_eq!(ends.load(Ordering::Relaxed), 1);
        assert_eq!(renderer.reader().sprites_number_with_name(None), 0);
    }

    #[test]
    fn test_rejected_settings_keep_previous() {
        let mut renderer = Renderer::new();
        renderer.set_speed(2.0);
        renderer.set_speed(0.0);
        renderer.set_speed(-1.0);
        assert!((renderer.speed() - 2.0).abs() < f64::EPSILON);

        renderer.set_smoothness(0.4);
        renderer.set_smoothness(1.2);
        assert!((renderer.smoothness() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_margin_wins() {
        let mut renderer = Renderer::new();
        renderer.set_container_size(Size::new(1000.0, 500.0));
        renderer.set_canvas_margin(Some(EdgeInsets::uniform(10.0)));
        renderer.set_canvas_percent_margin(Some(EdgeInsets::new(0.0, 0.5, 0.0, 0.5)));
        let canvas = renderer.canvas();
        assert!(canvas.width.abs() < f32::EPSILON);
        assert!((canvas.height - 500.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_view_handle_is_stored() {
        let mut renderer = Renderer::new();
        renderer.attach_view(ViewHandle::new(7));
        assert_eq!(renderer.view().map(ViewHandle::id), Some(7));
        assert_eq!(renderer.detach_view(), Some(ViewHandle::new(7)));
        assert!(renderer.view().is_none());
    }
}

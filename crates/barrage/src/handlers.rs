//! Optional host hooks.
//!
//! The renderer works without any of them. A host that plays video sets a
//! time source so items stick to playback positions; a host that animates
//! sprites sets a stage observer to learn when they enter and leave.

use std::fmt;

use barrage_shared::LifecycleEvent;

/// Supplies the external playback time in seconds.
pub type TimeSource = Box<dyn Fn() -> f64 + Send>;

/// Receives begin/end notifications.
pub type StageObserver = Box<dyn FnMut(&LifecycleEvent) + Send>;

/// The set of optional host hooks.
#[derive(Default)]
pub struct Handlers {
    time_source: Option<TimeSource>,
    stage_observer: Option<StageObserver>,
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("time_source", &self.time_source.is_some())
            .field("stage_observer", &self.stage_observer.is_some())
            .finish()
    }
}

impl Handlers {
    /// No hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::set_time_source`].
    #[must_use]
    pub fn with_time_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> f64 + Send + 'static,
    {
        self.set_time_source(source);
        self
    }

    /// Builder form of [`Self::set_stage_observer`].
    #[must_use]
    pub fn with_stage_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&LifecycleEvent) + Send + 'static,
    {
        self.set_stage_observer(observer);
        self
    }

    /// Follows an external clock instead of integrating tick deltas.
    pub fn set_time_source<F>(&mut self, source: F)
    where
        F: Fn() -> f64 + Send + 'static,
    {
        self.time_source = Some(Box::new(source));
    }

    /// Goes back to the internal clock.
    pub fn clear_time_source(&mut self) {
        self.time_source = None;
    }

    /// Installs the lifecycle observer.
    pub fn set_stage_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&LifecycleEvent) + Send + 'static,
    {
        self.stage_observer = Some(Box::new(observer));
    }

    /// Removes the lifecycle observer.
    pub fn clear_stage_observer(&mut self) {
        self.stage_observer = None;
    }

    /// True if an external clock is installed.
    #[must_use]
    pub fn has_time_source(&self) -> bool {
        self.time_source.is_some()
    }

    /// Samples the external clock. Non-finite samples are ignored.
    #[must_use]
    pub fn sample_time(&self) -> Option<f64> {
        self.time_source
            .as_ref()
            .map(|source| source())
            .filter(|time| time.is_finite())
    }

    /// Forwards an event to the observer, if any.
    pub fn notify(&mut self, event: &LifecycleEvent) {
        if let Some(observer) = self.stage_observer.as_mut() {
            observer(event);
        }
    }
}

/// Non-owning reference to the host view that displays the canvas.
///
/// The renderer only stores it so the host can find its view again; it never
/// keeps the view alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewHandle(u64);

impl ViewHandle {
    /// Wraps a host-assigned view id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The host-assigned id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

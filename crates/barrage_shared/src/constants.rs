//! # Engine Constants
//!
//! Defaults shared by the engine and the configuration layer. Every value here
//! can be overridden through `RendererConfig` except where noted.

// =============================================================================
// TIMING
// =============================================================================

/// Default traversal duration in logical seconds, used when a descriptor
/// carries a non-positive or non-finite duration.
pub const DEFAULT_DURATION: f64 = 5.0;

/// Default speed multiplier of the logical clock.
pub const DEFAULT_SPEED: f64 = 1.0;

/// Default tick rate of the frame driver (display refresh).
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Ticks the frame driver runs in one pump before it gives up on the backlog.
/// Not configurable.
pub const MAX_CATCH_UP_TICKS: u32 = 5;

// =============================================================================
// ADMISSION
// =============================================================================

/// Pending queue depth beyond which high smoothness starts dropping the oldest
/// backlog.
pub const DEFAULT_PENDING_CAPACITY: usize = 256;

/// Smoothness at or above which queue overflow drops items instead of delaying
/// them.
pub const HIGH_SMOOTHNESS: f64 = 0.5;

/// Minimum number of items admitted per tick while the queue is non-empty.
pub const MIN_ADMISSIONS_PER_TICK: usize = 1;

/// Capacity of the cross-thread ingestion channel. Not configurable.
pub const INBOX_CAPACITY: usize = 4096;

// =============================================================================
// LANES
// =============================================================================

/// Number of ticks an admitted item may wait for a free lane before it is
/// dropped.
pub const DEFAULT_MAX_WAIT_TICKS: u32 = 30;

/// Default lane thickness in canvas units (height of a horizontal lane, width
/// of a vertical one).
pub const DEFAULT_LANE_THICKNESS: f32 = 32.0;

/// Upper bound on lanes per axis, whatever the container and thickness.
/// Not configurable.
pub const MAX_LANES: usize = 4096;

/// Default container size used until the host reports its real bounds.
pub const DEFAULT_CONTAINER_WIDTH: f32 = 1280.0;

/// Default container height.
pub const DEFAULT_CONTAINER_HEIGHT: f32 = 720.0;

/// Tolerance for comparing logical times.
pub const TIME_EPSILON: f64 = 1e-9;

//! # BARRAGE Shared Types
//!
//! Plain data exchanged between the engine and its host:
//!
//! - [`Descriptor`]: one incoming barrage item, as received from the feed
//! - [`RecordEntry`]: a descriptor captured by the recording log
//! - [`LifecycleEvent`]: begin/end notifications for the sprite factory
//! - Canvas geometry ([`Size`], [`Rect`], [`EdgeInsets`])
//!
//! Everything here is `serde`-serializable so a host can persist a recorded
//! session and feed it back through `load` later.
//!
//! ## Time
//!
//! All times are logical seconds as `f64`. The engine's clock decides what a
//! second means (speed multiplier, external playback clock).

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod constants;
pub mod descriptor;
pub mod events;
pub mod geometry;
pub mod record;

pub use descriptor::{Descriptor, Direction, LaneAxis};
pub use events::{LifecycleEvent, SpriteId, SpriteStage};
pub use geometry::{resolve_canvas, EdgeInsets, Rect, Size};
pub use record::RecordEntry;

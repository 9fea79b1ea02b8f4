//! # BARRAGE Core Engine
//!
//! Scheduling and lane allocation for barrage (danmaku) overlays:
//! - Logical clock that can pause, resume, change speed and follow a seekable
//!   host clock
//! - Burst smoothing before lane allocation
//! - Collision-free first-fit lane packing
//! - Begin/end lifecycle tracking with forced removal
//! - Recording with speed-independent delays
//!
//! ## Architecture Rules
//!
//! 1. **One tick owns everything** - No locks inside the engine; the caller
//!    drives [`Engine::tick`] from a single thread
//! 2. **No drawing** - The engine reserves lanes and reports lifecycle stages;
//!    the host decides what a sprite looks like
//! 3. **Never fail the caller** - Bad settings return [`EngineError`] and leave
//!    the previous value in place
//!
//! ## Example
//!
//! ```rust,ignore
//! use barrage_core::Engine;
//! use barrage_shared::Descriptor;
//!
//! let mut engine = Engine::new();
//! engine.start();
//! engine.tick(1.0 / 60.0, None, vec![Descriptor::new("walk", "hello")]);
//! assert_eq!(engine.sprites_number_with_name(None), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod engine;
pub mod error;
pub mod lanes;
pub mod lifecycle;
pub mod recording;
pub mod schedule;
pub mod smoother;

pub use clock::{ClockSample, LogicalClock, RunState, StartOutcome};
pub use engine::{Engine, TickReport};
pub use error::{EngineError, EngineResult};
pub use lanes::{Lane, LaneAllocator, LaneSlot, Reservation};
pub use lifecycle::{RemovalReason, Sprite, SpriteLifecycleManager, Stage};
pub use recording::RecordingLog;
pub use schedule::{DelayQueue, RedisplayHistory, Rewind};
pub use smoother::{AdmissionBatch, AdmissionSmoother};

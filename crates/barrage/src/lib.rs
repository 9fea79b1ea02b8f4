//! # BARRAGE
//!
//! Barrage (danmaku) renderer control surface. Items arrive from a live
//! feed, get smoothed, packed onto collision-free lanes and handed to the
//! host as begin/end notifications plus a published snapshot. Drawing is
//! left to the host.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use barrage::{Descriptor, Renderer, TickLoop};
//!
//! let mut renderer = Renderer::new();
//! let feed = renderer.receiver();
//! renderer.start();
//!
//! std::thread::spawn(move || {
//!     feed.receive(Descriptor::new("walk", "hello"));
//! });
//!
//! let mut frames = TickLoop::default();
//! loop {
//!     frames.pump(&mut renderer);
//!     frames.wait_for_next_tick();
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod inbox;
pub mod renderer;
pub mod snapshot;
pub mod tick;

pub use config::{LoadDelayPolicy, RendererConfig};
pub use error::{BarrageError, BarrageResult};
pub use handlers::{Handlers, StageObserver, TimeSource, ViewHandle};
pub use inbox::{Inbox, ReceiverHandle};
pub use renderer::Renderer;
pub use snapshot::{Snapshot, SnapshotReader, SpriteView};
pub use tick::{TickLoop, TickStats};

pub use barrage_core::{RunState, StartOutcome, TickReport};
pub use barrage_shared::{
    Descriptor, Direction, EdgeInsets, LaneAxis, LifecycleEvent, Rect, RecordEntry, Size,
    SpriteId, SpriteStage,
};

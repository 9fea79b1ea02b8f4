//! # Published Snapshot
//!
//! Render threads and UI code read a copy of the renderer state instead of
//! borrowing the engine. The owner republishes it after every tick and after
//! forced removals.
//!
//! ```text
//! owner thread: tick ──publish──► Arc<RwLock<Snapshot>> ◄──read── SnapshotReader (any thread)
//! ```

use std::sync::Arc;

use barrage_core::{Engine, Stage};
use barrage_shared::{Direction, LaneAxis, Rect, RecordEntry, SpriteId};
use parking_lot::RwLock;

/// What a host needs to draw one sprite.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteView {
    /// Sprite id.
    pub id: SpriteId,
    /// Type tag.
    pub sprite_name: String,
    /// Stable identifier, if the descriptor had one.
    pub identifier: Option<String>,
    /// Payload.
    pub content: String,
    /// Traversal direction.
    pub direction: Direction,
    /// Lane axis.
    pub axis: LaneAxis,
    /// Lane index on that axis.
    pub lane: usize,
    /// Lane rectangle in canvas coordinates.
    pub lane_rect: Rect,
    /// Z-index.
    pub z_index: i32,
    /// Traversal progress in [0, 1].
    pub progress: f64,
}

/// Renderer state as of the last publish.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    /// Logical time.
    pub time: f64,
    /// Active sprites in draw order.
    pub sprites: Vec<SpriteView>,
    /// Recorded entries in admission order.
    pub records: Vec<RecordEntry>,
}

impl Snapshot {
    /// Number of active sprites matching the type filter.
    #[must_use]
    pub fn sprites_number_with_name(&self, name: Option<&str>) -> usize {
        self.sprites
            .iter()
            .filter(|sprite| match name {
                Some(name) => sprite.sprite_name == name,
                None => true,
            })
            .count()
    }

    /// Refreshes from the engine. Records are append-only between stops, so
    /// only the new tail is copied.
    pub(crate) fn refresh(&mut self, engine: &Engine) {
        let now = engine.time();
        self.time = now;

        self.sprites.clear();
        for sprite in engine.draw_order() {
            if sprite.stage != Stage::Active {
                continue;
            }
            self.sprites.push(SpriteView {
                id: sprite.id,
                sprite_name: sprite.descriptor.sprite_name.clone(),
                identifier: sprite.descriptor.identifier.clone(),
                content: sprite.descriptor.content.clone(),
                direction: sprite.descriptor.direction,
                axis: sprite.slot.axis,
                lane: sprite.slot.index,
                lane_rect: engine.lanes().lane_rect(sprite.slot),
                z_index: sprite.descriptor.z_index,
                progress: sprite.progress(now),
            });
        }

        let records = engine.records();
        if records.len() < self.records.len() {
            self.records.clear();
        }
        let known = self.records.len();
        self.records.extend_from_slice(&records[known..]);
    }
}

/// Read-only, cloneable view of the latest snapshot.
#[derive(Clone, Debug, Default)]
pub struct SnapshotReader {
    inner: Arc<RwLock<Snapshot>>,
}

impl SnapshotReader {
    pub(crate) fn new(inner: Arc<RwLock<Snapshot>>) -> Self {
        Self { inner }
    }

    /// Runs `f` against the current snapshot under a read lock.
    pub fn with<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        f(&self.inner.read())
    }

    /// Logical time as of the last publish.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.inner.read().time
    }

    /// Copy of the recorded entries.
    #[must_use]
    pub fn records(&self) -> Vec<RecordEntry> {
        self.inner.read().records.clone()
    }

    /// Number of active sprites matching the type filter.
    #[must_use]
    pub fn sprites_number_with_name(&self, name: Option<&str>) -> usize {
        self.inner.read().sprites_number_with_name(name)
    }

    /// Copy of the active sprites in draw order.
    #[must_use]
    pub fn sprites(&self) -> Vec<SpriteView> {
        self.inner.read().sprites.clone()
    }
}

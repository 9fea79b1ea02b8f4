//! # Sprite Lifecycle
//!
//! ```text
//!  spawn          enter_at reached          exit_at reached / forced
//! ───────> Pending ───────────────> Active ─────────────────────────> Finished
//!                      Begin event                 End event, lane released
//! ```
//!
//! Finished sprites are dropped immediately; only Pending and Active sprites
//! are stored. Storage order is admission order.

use std::collections::BTreeMap;

use barrage_shared::constants::TIME_EPSILON;
use barrage_shared::{Descriptor, LifecycleEvent, SpriteId, SpriteStage};

use crate::error::{EngineError, EngineResult};
use crate::lanes::{LaneAllocator, LaneSlot, Reservation};

/// Stage of a stored sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Lane reserved, not yet visible.
    Pending,
    /// Traversing the canvas.
    Active,
}

/// Why a sprite was finished early.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalReason {
    /// Removed by type filter.
    ByName,
    /// Removed by identifier.
    ByIdentifier,
    /// Removed because the clock was rewound before its enter time.
    Rewind,
}

impl RemovalReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::ByName => "removed_by_name",
            Self::ByIdentifier => "removed_by_identifier",
            Self::Rewind => "rewind",
        }
    }
}

/// A placed barrage item.
#[derive(Clone, Debug)]
pub struct Sprite {
    /// Session-unique id.
    pub id: SpriteId,
    /// The descriptor this sprite renders.
    pub descriptor: Descriptor,
    /// Reserved lane.
    pub slot: LaneSlot,
    /// Current stage.
    pub stage: Stage,
    /// Scheduled enter time.
    pub enter_at: f64,
    /// Scheduled exit time.
    pub exit_at: f64,
}

impl Sprite {
    /// Creates a pending sprite from a lane reservation.
    #[must_use]
    pub fn new(id: SpriteId, descriptor: Descriptor, reservation: Reservation) -> Self {
        Self {
            id,
            descriptor,
            slot: reservation.slot,
            stage: Stage::Pending,
            enter_at: reservation.enter_at,
            exit_at: reservation.exit_at,
        }
    }

    /// Traversal progress in [0, 1] at `now`.
    #[must_use]
    pub fn progress(&self, now: f64) -> f64 {
        let span = self.exit_at - self.enter_at;
        if span <= 0.0 {
            return 1.0;
        }
        ((now - self.enter_at) / span).clamp(0.0, 1.0)
    }

    fn event(&self, stage: SpriteStage, time: f64, reason: Option<RemovalReason>) -> LifecycleEvent {
        let mut params: BTreeMap<String, String> = self.descriptor.params.clone();
        params.insert("lane".to_owned(), self.slot.index.to_string());
        params.insert("axis".to_owned(), self.slot.axis.as_str().to_owned());
        if let Some(reason) = reason {
            params.insert("reason".to_owned(), reason.as_str().to_owned());
        }
        LifecycleEvent {
            stage,
            sprite: self.id,
            sprite_name: self.descriptor.sprite_name.clone(),
            identifier: self.descriptor.identifier.clone(),
            time,
            params,
        }
    }
}

/// Owns every live sprite and the lifecycle events they produce.
#[derive(Debug, Default)]
pub struct SpriteLifecycleManager {
    sprites: Vec<Sprite>,
    events: Vec<LifecycleEvent>,
}

impl SpriteLifecycleManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a freshly placed sprite.
    pub fn spawn(&mut self, sprite: Sprite) {
        self.sprites.push(sprite);
    }

    /// Moves due Pending sprites to Active, emitting Begin.
    pub fn activate_due(&mut self, now: f64) {
        for sprite in &mut self.sprites {
            if sprite.stage == Stage::Pending && sprite.enter_at <= now {
                sprite.stage = Stage::Active;
                self.events.push(sprite.event(SpriteStage::Begin, now, None));
            }
        }
    }

    /// Finishes Active sprites whose window has elapsed, emitting End and
    /// releasing their lanes.
    pub fn finish_expired(&mut self, now: f64, lanes: &mut LaneAllocator) -> usize {
        self.finish_where(now, lanes, None, |sprite| {
            sprite.stage == Stage::Active && sprite.exit_at <= now + TIME_EPSILON
        })
    }

    /// Force-finishes every present sprite matching the type filter.
    pub fn remove_with_name(&mut self, name: Option<&str>, now: f64, lanes: &mut LaneAllocator) -> usize {
        self.finish_where(now, lanes, Some(RemovalReason::ByName), |sprite| {
            sprite.descriptor.matches_name(name)
        })
    }

    /// Force-finishes the sprite carrying `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownIdentifier`] if no present sprite has it.
    pub fn remove_with_identifier(
        &mut self,
        identifier: &str,
        now: f64,
        lanes: &mut LaneAllocator,
    ) -> EngineResult<SpriteId> {
        let id = self
            .sprites
            .iter()
            .find(|sprite| sprite.descriptor.identifier.as_deref() == Some(identifier))
            .map(|sprite| sprite.id)
            .ok_or_else(|| EngineError::UnknownIdentifier(identifier.to_owned()))?;

        self.finish_where(now, lanes, Some(RemovalReason::ByIdentifier), |sprite| sprite.id == id);
        Ok(id)
    }

    /// Force-finishes sprites scheduled to enter after `now`. Used on rewind.
    pub fn remove_entering_after(&mut self, now: f64, lanes: &mut LaneAllocator) -> usize {
        self.finish_where(now, lanes, Some(RemovalReason::Rewind), |sprite| sprite.enter_at > now)
    }

    fn finish_where<F>(
        &mut self,
        now: f64,
        lanes: &mut LaneAllocator,
        reason: Option<RemovalReason>,
        mut predicate: F,
    ) -> usize
    where
        F: FnMut(&Sprite) -> bool,
    {
        let mut finished = 0;
        let events = &mut self.events;
        self.sprites.retain(|sprite| {
            if !predicate(sprite) {
                return true;
            }
            lanes.release(sprite.slot, sprite.id, now);
            // A pending sprite was never shown, so it has no End to report.
            if sprite.stage == Stage::Active {
                events.push(sprite.event(SpriteStage::End, now, reason));
            }
            finished += 1;
            false
        });
        finished
    }

    /// Number of Active sprites matching the type filter.
    #[must_use]
    pub fn count_active(&self, name: Option<&str>) -> usize {
        self.sprites
            .iter()
            .filter(|sprite| sprite.stage == Stage::Active && sprite.descriptor.matches_name(name))
            .count()
    }

    /// True if the sprite is still stored.
    #[must_use]
    pub fn contains(&self, id: SpriteId) -> bool {
        self.sprites.iter().any(|sprite| sprite.id == id)
    }

    /// Live sprites in admission order.
    #[must_use]
    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// Draw order of live sprites.
    ///
    /// With `by_z_index`, sprites are sorted by ascending z-index (higher is
    /// drawn later, i.e. on top) with admission order breaking ties.
    /// Otherwise admission order is used directly.
    #[must_use]
    pub fn draw_order(&self, by_z_index: bool) -> Vec<&Sprite> {
        let mut ordered: Vec<&Sprite> = self.sprites.iter().collect();
        if by_z_index {
            ordered.sort_by_key(|sprite| sprite.descriptor.z_index);
        }
        ordered
    }

    /// Takes the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drops every sprite and pending event without notifications.
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.events.clear();
    }
}

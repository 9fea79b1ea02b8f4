//! # Lane Allocator
//!
//! Assigns each admitted item a track so concurrently traversing items never
//! overlap.
//!
//! ## Strategy
//!
//! First fit by earliest free time:
//!
//! ```text
//! lane 0  ██████████░░░░░░░░   busy_until = 4.2
//! lane 1  ████░░░░░░░░░░░░░░   busy_until = 1.0  ← now = 1.5, picked
//! lane 2  ░░░░░░░░░░░░░░░░░░   busy_until = 0.0
//! ```
//!
//! Lanes are scanned in index order; the first with `busy_until <= now` is
//! reserved until `now + duration`. Horizontal and vertical travel use
//! independent lane sets. A set only grows when every lane it already holds
//! is busy, and never past [`MAX_LANES`].
//!
//! ## Margins
//!
//! The usable region (and therefore the lane count) is resolved from the
//! container and margins on every pass. Shrinking the region stops new
//! allocations on lanes that fell outside it; sprites already placed there
//! finish undisturbed.

use barrage_shared::constants::{
    DEFAULT_CONTAINER_HEIGHT, DEFAULT_CONTAINER_WIDTH, DEFAULT_LANE_THICKNESS, MAX_LANES,
    TIME_EPSILON,
};
use barrage_shared::{resolve_canvas, EdgeInsets, LaneAxis, Rect, Size, SpriteId};

use crate::error::{EngineError, EngineResult};

/// Address of a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneSlot {
    /// Lane set.
    pub axis: LaneAxis,
    /// Index within the set, 0 nearest the canvas origin.
    pub index: usize,
}

/// A successful reservation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reservation {
    /// Reserved lane.
    pub slot: LaneSlot,
    /// Scheduled enter time.
    pub enter_at: f64,
    /// Scheduled exit time; the lane is free again from this instant.
    pub exit_at: f64,
}

/// One track.
#[derive(Clone, Debug, Default)]
pub struct Lane {
    /// Time from which the lane is free.
    pub busy_until: f64,
    /// Current occupant, if any.
    pub occupant: Option<SpriteId>,
}

impl Lane {
    /// True if the lane can take a new occupant at `now`.
    #[must_use]
    pub fn is_free(&self, now: f64) -> bool {
        self.busy_until <= now + TIME_EPSILON
    }
}

/// First-fit lane allocator over a margin-reduced canvas.
#[derive(Clone, Debug)]
pub struct LaneAllocator {
    horizontal: Vec<Lane>,
    vertical: Vec<Lane>,
    container: Size,
    margin: Option<EdgeInsets>,
    percent_margin: Option<EdgeInsets>,
    lane_thickness: f32,
}

impl Default for LaneAllocator {
    fn default() -> Self {
        Self::new(Size::new(DEFAULT_CONTAINER_WIDTH, DEFAULT_CONTAINER_HEIGHT))
    }
}

impl LaneAllocator {
    /// Creates an allocator for a container of the given size.
    #[must_use]
    pub fn new(container: Size) -> Self {
        Self {
            horizontal: Vec::new(),
            vertical: Vec::new(),
            container,
            margin: None,
            percent_margin: None,
            lane_thickness: DEFAULT_LANE_THICKNESS,
        }
    }

    /// Sets the container size. Takes effect on the next allocation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidContainer`] for negative or non-finite
    /// dimensions.
    pub fn set_container(&mut self, container: Size) -> EngineResult<()> {
        let valid = |v: f32| v.is_finite() && v >= 0.0;
        if !valid(container.width) || !valid(container.height) {
            return Err(EngineError::InvalidContainer {
                width: container.width,
                height: container.height,
            });
        }
        self.container = container;
        Ok(())
    }

    /// Sets absolute margins. Takes effect on the next allocation.
    pub fn set_margin(&mut self, margin: Option<EdgeInsets>) {
        self.margin = margin;
    }

    /// Sets percent margins (fractions of the container). Dominant over
    /// absolute margins when set.
    pub fn set_percent_margin(&mut self, margin: Option<EdgeInsets>) {
        self.percent_margin = margin;
    }

    /// Sets the lane thickness.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidLaneThickness`] for non-positive values.
    pub fn set_lane_thickness(&mut self, thickness: f32) -> EngineResult<()> {
        if !thickness.is_finite() || thickness <= 0.0 {
            return Err(EngineError::InvalidLaneThickness(thickness));
        }
        self.lane_thickness = thickness;
        Ok(())
    }

    /// Container size.
    #[must_use]
    pub const fn container(&self) -> Size {
        self.container
    }

    /// Lane thickness.
    #[must_use]
    pub const fn lane_thickness(&self) -> f32 {
        self.lane_thickness
    }

    /// Usable canvas region, resolved from the current container and margins.
    #[must_use]
    pub fn canvas(&self) -> Rect {
        resolve_canvas(self.container, self.margin, self.percent_margin)
    }

    /// Number of lanes available to new allocations on an axis, capped at
    /// [`MAX_LANES`].
    #[must_use]
    pub fn lane_count(&self, axis: LaneAxis) -> usize {
        let canvas = self.canvas();
        if canvas.is_empty() {
            return 0;
        }
        let extent = match axis {
            LaneAxis::Horizontal => canvas.height,
            LaneAxis::Vertical => canvas.width,
        };
        ((extent / self.lane_thickness).floor() as usize).clamp(1, MAX_LANES)
    }

    /// Placement rectangle of a lane within the current canvas.
    #[must_use]
    pub fn lane_rect(&self, slot: LaneSlot) -> Rect {
        let canvas = self.canvas();
        let offset = slot.index as f32 * self.lane_thickness;
        match slot.axis {
            LaneAxis::Horizontal => Rect::new(
                canvas.x,
                canvas.y + offset,
                canvas.width,
                self.lane_thickness.min(canvas.height),
            ),
            LaneAxis::Vertical => Rect::new(
                canvas.x + offset,
                canvas.y,
                self.lane_thickness.min(canvas.width),
                canvas.height,
            ),
        }
    }

    /// Reserves the first free lane on `axis` for `[now, now + duration)`.
    ///
    /// Returns `None` when every usable lane is busy.
    pub fn reserve(
        &mut self,
        axis: LaneAxis,
        now: f64,
        duration: f64,
        occupant: SpriteId,
    ) -> Option<Reservation> {
        let count = self.lane_count(axis);
        let lanes = self.lanes_mut(axis);
        let known = lanes.len().min(count);

        let index = match lanes[..known].iter().position(|lane| lane.is_free(now)) {
            Some(index) => index,
            None if known < count => {
                lanes.push(Lane::default());
                known
            }
            None => return None,
        };
        let exit_at = now + duration;
        let lane = &mut lanes[index];
        lane.busy_until = exit_at;
        lane.occupant = Some(occupant);

        Some(Reservation {
            slot: LaneSlot { axis, index },
            enter_at: now,
            exit_at,
        })
    }

    /// Releases a lane held by `occupant`.
    ///
    /// An early release (forced removal) frees the lane from `now`. Releasing
    /// a lane that has since been handed to someone else does nothing.
    pub fn release(&mut self, slot: LaneSlot, occupant: SpriteId, now: f64) {
        if let Some(lane) = self.lanes_mut(slot.axis).get_mut(slot.index) {
            if lane.occupant == Some(occupant) {
                lane.occupant = None;
                lane.busy_until = lane.busy_until.min(now);
            }
        }
    }

    /// Pulls unoccupied lanes back to `now` after the clock jumped
    /// backwards. Lanes still held by a live sprite keep their window.
    pub fn rewind(&mut self, now: f64) {
        for lane in self.horizontal.iter_mut().chain(self.vertical.iter_mut()) {
            if lane.occupant.is_none() {
                lane.busy_until = lane.busy_until.min(now);
            }
        }
    }

    /// Current occupant of a lane.
    #[must_use]
    pub fn occupant(&self, slot: LaneSlot) -> Option<SpriteId> {
        self.lanes(slot.axis).get(slot.index).and_then(|lane| lane.occupant)
    }

    /// Lanes of one axis, including ones outside the current canvas.
    #[must_use]
    pub fn lanes(&self, axis: LaneAxis) -> &[Lane] {
        match axis {
            LaneAxis::Horizontal => &self.horizontal,
            LaneAxis::Vertical => &self.vertical,
        }
    }

    fn lanes_mut(&mut self, axis: LaneAxis) -> &mut Vec<Lane> {
        match axis {
            LaneAxis::Horizontal => &mut self.horizontal,
            LaneAxis::Vertical => &mut self.vertical,
        }
    }

    /// Frees every lane. Configuration is kept.
    pub fn clear(&mut self) {
        self.horizontal.clear();
        self.vertical.clear();
    }
}

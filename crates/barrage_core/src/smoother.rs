//! # Admission Smoother
//!
//! Flattens bursts so N descriptors received in one frame do not turn into N
//! lane allocations in that same frame.
//!
//! ## Policy
//!
//! ```text
//! quota = max(1, ceil(depth * (1 - smoothness)))
//!
//! smoothness 0.0  →  whole queue every tick   (lowest latency)
//! smoothness 1.0  →  one item per tick        (steadiest pacing)
//! ```
//!
//! Under sustained overload with high smoothness, the oldest items beyond
//! `capacity` are dropped.

use std::collections::VecDeque;

use barrage_shared::constants::{DEFAULT_PENDING_CAPACITY, HIGH_SMOOTHNESS, MIN_ADMISSIONS_PER_TICK};

use crate::error::{EngineError, EngineResult};

/// Items released by one call to [`AdmissionSmoother::admit`].
#[derive(Debug)]
pub struct AdmissionBatch<T> {
    /// Items admitted this tick, oldest first.
    pub admitted: Vec<T>,
    /// Items dropped from the head of the queue by the overflow policy.
    pub dropped: usize,
}

/// Bounded pending queue with proportional per-tick admission.
#[derive(Debug)]
pub struct AdmissionSmoother<T> {
    queue: VecDeque<T>,
    smoothness: f64,
    capacity: usize,
    dropped_total: u64,
}

impl<T> Default for AdmissionSmoother<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PENDING_CAPACITY)
    }
}

impl<T> AdmissionSmoother<T> {
    /// Creates a smoother with no smoothing and the given overflow capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity.min(DEFAULT_PENDING_CAPACITY)),
            smoothness: 0.0,
            capacity: capacity.max(1),
            dropped_total: 0,
        }
    }

    /// Sets the smoothing coefficient.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSmoothness`] for values outside [0, 1];
    /// the previous value is retained.
    pub fn set_smoothness(&mut self, smoothness: f64) -> EngineResult<()> {
        if !(0.0..=1.0).contains(&smoothness) {
            return Err(EngineError::InvalidSmoothness(smoothness));
        }
        self.smoothness = smoothness;
        Ok(())
    }

    /// Current smoothing coefficient.
    #[must_use]
    pub const fn smoothness(&self) -> f64 {
        self.smoothness
    }

    /// Sets the overflow capacity. Zero is treated as one.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    /// Overflow capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends an item at the tail.
    pub fn push(&mut self, item: T) {
        self.queue.push_back(item);
    }

    /// Number of items waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total items dropped by the overflow policy since creation.
    #[must_use]
    pub const fn dropped_total(&self) -> u64 {
        self.dropped_total
    }

    /// Number of items the next [`admit`](Self::admit) releases, ignoring
    /// overflow drops.
    #[must_use]
    pub fn quota(&self) -> usize {
        let depth = self.queue.len();
        if depth == 0 {
            return 0;
        }
        if self.smoothness <= 0.0 {
            return depth;
        }
        let share = (depth as f64 * (1.0 - self.smoothness)).ceil() as usize;
        share.max(MIN_ADMISSIONS_PER_TICK).min(depth)
    }

    /// Applies the overflow policy, then releases this tick's quota.
    pub fn admit(&mut self) -> AdmissionBatch<T> {
        let mut dropped = 0;
        if self.smoothness >= HIGH_SMOOTHNESS && self.queue.len() > self.capacity {
            dropped = self.queue.len() - self.capacity;
            self.queue.drain(..dropped);
            self.dropped_total += dropped as u64;
        }

        let quota = self.quota();
        AdmissionBatch {
            admitted: self.queue.drain(..quota).collect(),
            dropped,
        }
    }

    /// Discards everything waiting.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

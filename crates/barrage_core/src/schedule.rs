//! Delay scheduling and redisplay history.
//!
//! [`DelayQueue`] holds descriptors whose requested delay has not elapsed yet.
//! [`RedisplayHistory`] remembers where every placed item sat on the timeline
//! so a seek-back can bring it back.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use barrage_shared::constants::TIME_EPSILON;
use barrage_shared::{Descriptor, SpriteId};

struct Scheduled {
    due: f64,
    seq: u64,
    descriptor: Descriptor,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed: BinaryHeap is a max-heap, we want the earliest due first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of descriptors keyed by due time. Equal due times release in
/// insertion order.
#[derive(Default)]
pub struct DelayQueue {
    heap: BinaryHeap<Scheduled>,
    seq: u64,
}

impl std::fmt::Debug for DelayQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayQueue").field("len", &self.heap.len()).finish()
    }
}

impl DelayQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a descriptor for release at `due`.
    pub fn push(&mut self, due: f64, descriptor: Descriptor) {
        self.seq += 1;
        self.heap.push(Scheduled {
            due,
            seq: self.seq,
            descriptor,
        });
    }

    /// Releases every descriptor due at or before `now`, earliest first.
    pub fn pop_due(&mut self, now: f64) -> Vec<Descriptor> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|next| next.due <= now + TIME_EPSILON) {
            if let Some(next) = self.heap.pop() {
                due.push(next.descriptor);
            }
        }
        due
    }

    /// Number of scheduled descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drops everything.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[derive(Clone, Debug)]
struct Shown {
    sprite: SpriteId,
    descriptor: Descriptor,
    enter_at: f64,
    exit_at: f64,
}

/// What a seek-back brings back.
#[derive(Debug, Default)]
pub struct Rewind {
    /// Descriptors whose window contains the new time. Re-admit now.
    pub readmit: Vec<Descriptor>,
    /// Descriptors whose window starts after the new time, with that start.
    pub reschedule: Vec<(f64, Descriptor)>,
}

/// Timeline positions of placed items, kept only while redisplay is enabled.
#[derive(Debug, Default)]
pub struct RedisplayHistory {
    shown: Vec<Shown>,
}

impl RedisplayHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers a placed item.
    pub fn remember(&mut self, sprite: SpriteId, descriptor: Descriptor, enter_at: f64, exit_at: f64) {
        self.shown.push(Shown {
            sprite,
            descriptor,
            enter_at,
            exit_at,
        });
    }

    /// Splits history after a seek-back to `now`.
    ///
    /// Entries whose sprite is still alive are kept untouched. Every entry
    /// handed back is removed; it is remembered again once re-placed.
    pub fn rewind<F>(&mut self, now: f64, is_alive: F) -> Rewind
    where
        F: Fn(SpriteId) -> bool,
    {
        let mut rewind = Rewind::default();
        self.shown.retain(|shown| {
            if is_alive(shown.sprite) {
                return true;
            }
            if shown.enter_at > now {
                rewind.reschedule.push((shown.enter_at, shown.descriptor.clone()));
                false
            } else if now < shown.exit_at {
                rewind.readmit.push(shown.descriptor.clone());
                false
            } else {
                true
            }
        });
        rewind
    }

    /// Number of remembered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shown.len()
    }

    /// True if nothing is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.shown.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_queue_releases_in_due_order() {
        let mut queue = DelayQueue::new();
        queue.push(3.0, Descriptor::new("a", "late"));
        queue.push(1.0, Descriptor::new("a", "early"));
        queue.push(1.0, Descriptor::new("a", "early-second"));

        assert!(queue.pop_due(0.5).is_empty());
        let due: Vec<String> = queue.pop_due(2.0).into_iter().map(|d| d.content).collect();
        assert_eq!(due, vec!["early", "early-second"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(3.0)[0].content, "late");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_rewind_splits_history() {
        let mut history = RedisplayHistory::new();
        history.remember(SpriteId(1), Descriptor::new("a", "window-4-7"), 4.0, 7.0);
        history.remember(SpriteId(2), Descriptor::new("a", "window-6-9"), 6.0, 9.0);
        history.remember(SpriteId(3), Descriptor::new("a", "window-1-3"), 1.0, 3.0);
        history.remember(SpriteId(4), Descriptor::new("a", "alive"), 4.5, 9.5);

        let rewind = history.rewind(5.0, |id| id == SpriteId(4));

        assert_eq!(rewind.readmit.len(), 1);
        assert_eq!(rewind.readmit[0].content, "window-4-7");
        assert_eq!(rewind.reschedule.len(), 1);
        assert!((rewind.reschedule[0].0 - 6.0).abs() < 1e-9);
        assert_eq!(history.len(), 2);
    }
}

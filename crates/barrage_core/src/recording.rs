//! # Recording Log
//!
//! Captures every descriptor the engine takes in while recording is enabled,
//! stamped with its delay from the run's start epoch on the logical clock.
//!
//! ```text
//! start epoch ──┬── 0.8s ── 2.1s ──── 2.1s ── 4.0s ──> logical time
//!               │    │       │         │       │
//! records:      │   [a]     [b]       [c]     [d]      (admission order)
//! ```
//!
//! Delays are logical, so a session recorded at 2x speed replays in sync at 1x.

use barrage_shared::{Descriptor, RecordEntry};

/// Append-only log of recorded descriptors.
#[derive(Debug, Default, Clone)]
pub struct RecordingLog {
    entries: Vec<RecordEntry>,
}

impl RecordingLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Appends a descriptor admitted at `now` in a run that began at `epoch`.
    pub fn append(&mut self, descriptor: Descriptor, now: f64, epoch: f64) {
        self.entries.push(RecordEntry::new(descriptor, (now - epoch).max(0.0)));
    }

    /// Recorded entries in admission order.
    #[must_use]
    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors ready to be passed back to `load`.
    #[must_use]
    pub fn replay(&self) -> Vec<Descriptor> {
        self.entries.iter().map(RecordEntry::to_descriptor).collect()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_is_relative_to_epoch() {
        let mut log = RecordingLog::new();
        log.append(Descriptor::new("a", "1"), 10.5, 10.0);
        log.append(Descriptor::new("a", "2"), 12.0, 10.0);

        let delays: Vec<f64> = log.entries().iter().map(|e| e.delay).collect();
        assert_eq!(delays, vec![0.5, 2.0]);
        assert_eq!(log.entries()[1].descriptor.content, "2");
    }

    #[test]
    fn test_replay_preserves_order_and_delay() {
        let mut log = RecordingLog::new();
        log.append(Descriptor::new("a", "first"), 1.0, 0.0);
        log.append(Descriptor::new("b", "second").with_delay(0.5), 3.0, 0.0);

        let replay = log.replay();
        assert_eq!(replay[0].content, "first");
        assert!((replay[0].delay - 1.0).abs() < 1e-9);
        assert!((replay[1].delay - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_clear() {
        let mut log = RecordingLog::new();
        log.append(Descriptor::new("a", "1"), 1.0, 0.0);
        log.clear();
        assert!(log.is_empty());
    }
}

//! Recorded descriptors.

use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;

/// A descriptor captured by the recording log.
///
/// `delay` is measured on the logical clock from the run's start epoch, so a
/// recording made at speed 2.0 replays correctly at speed 1.0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// The descriptor as it was received.
    pub descriptor: Descriptor,
    /// Admission time relative to the start epoch, in logical seconds.
    pub delay: f64,
}

impl RecordEntry {
    /// Creates a new entry.
    #[must_use]
    pub const fn new(descriptor: Descriptor, delay: f64) -> Self {
        Self { descriptor, delay }
    }

    /// Returns a descriptor ready to be fed back through `load`.
    ///
    /// The recorded delay is added to whatever delay the descriptor originally
    /// requested, so replaying from the start epoch reproduces the session.
    #[must_use]
    pub fn to_descriptor(&self) -> Descriptor {
        let mut descriptor = self.descriptor.clone();
        descriptor.delay = self.delay + self.descriptor.effective_delay();
        descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_descriptor_carries_recorded_delay() {
        let entry = RecordEntry::new(Descriptor::new("walk", "a").with_delay(0.5), 2.0);
        let replay = entry.to_descriptor();
        assert!((replay.delay - 2.5).abs() < 1e-9);
        assert_eq!(replay.sprite_name, "walk");
    }

    #[test]
    fn test_negative_requested_delay_ignored() {
        let entry = RecordEntry::new(Descriptor::new("walk", "a").with_delay(-3.0), 1.0);
        assert!((entry.to_descriptor().delay - 1.0).abs() < 1e-9);
    }
}

//! Barrage item descriptors.
//!
//! A descriptor is what the feed hands to the renderer. It says what to show
//! (opaque to the engine), how it is grouped (`sprite_name`), how long it
//! travels and when it should start.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DURATION;

/// Travel direction of a sprite across the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Enters at the right edge, leaves at the left edge.
    #[default]
    RightToLeft,
    /// Enters at the left edge, leaves at the right edge.
    LeftToRight,
    /// Enters at the top edge, leaves at the bottom edge.
    TopToBottom,
    /// Enters at the bottom edge, leaves at the top edge.
    BottomToTop,
}

impl Direction {
    /// Returns the lane axis this direction travels along.
    #[must_use]
    pub const fn axis(self) -> LaneAxis {
        match self {
            Self::RightToLeft | Self::LeftToRight => LaneAxis::Horizontal,
            Self::TopToBottom | Self::BottomToTop => LaneAxis::Vertical,
        }
    }
}

/// Lane orientation.
///
/// Horizontal lanes are rows stacked along the canvas height; vertical lanes
/// are columns stacked along the canvas width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneAxis {
    /// Rows, for left/right travel.
    Horizontal,
    /// Columns, for up/down travel.
    Vertical,
}

impl LaneAxis {
    /// Stable lowercase name, used in lifecycle params.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// One barrage item as received from the feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Descriptor {
    /// Payload handed through to the sprite factory. Opaque to the engine.
    pub content: String,
    /// Type tag used for grouping, counting and removal.
    pub sprite_name: String,
    /// Optional stable identifier for targeted removal.
    pub identifier: Option<String>,
    /// Requested delay from the moment of receipt, in logical seconds.
    pub delay: f64,
    /// Estimated traversal duration in logical seconds.
    pub duration: f64,
    /// Draw order hint. Higher values are drawn above lower ones.
    pub z_index: i32,
    /// Timestamp assigned by the source feed. Informational only.
    pub timestamp: f64,
    /// Travel direction; decides which lane set the item competes for.
    pub direction: Direction,
    /// Free-form parameters, forwarded in lifecycle events.
    pub params: BTreeMap<String, String>,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self {
            content: String::new(),
            sprite_name: String::new(),
            identifier: None,
            delay: 0.0,
            duration: DEFAULT_DURATION,
            z_index: 0,
            timestamp: 0.0,
            direction: Direction::default(),
            params: BTreeMap::new(),
        }
    }
}

impl Descriptor {
    /// Creates a descriptor with the given type tag and payload.
    #[must_use]
    pub fn new(sprite_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sprite_name: sprite_name.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Sets the stable identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Sets the delay from receipt.
    #[must_use]
    pub const fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the traversal duration.
    #[must_use]
    pub const fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the z-index.
    #[must_use]
    pub const fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Sets the source timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the travel direction.
    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Adds a free-form parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Returns the lane axis this item competes for.
    #[must_use]
    pub const fn axis(&self) -> LaneAxis {
        self.direction.axis()
    }

    /// Traversal duration actually used by the engine.
    ///
    /// Non-positive and non-finite durations fall back to [`DEFAULT_DURATION`].
    #[must_use]
    pub fn effective_duration(&self) -> f64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            self.duration
        } else {
            DEFAULT_DURATION
        }
    }

    /// Delay actually used by the engine. Negative and non-finite delays are 0.
    #[must_use]
    pub fn effective_delay(&self) -> f64 {
        if self.delay.is_finite() && self.delay > 0.0 {
            self.delay
        } else {
            0.0
        }
    }

    /// Returns true if this descriptor matches an optional type filter.
    #[must_use]
    pub fn matches_name(&self, name: Option<&str>) -> bool {
        match name {
            Some(name) => self.sprite_name == name,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_axis() {
        assert_eq!(Direction::RightToLeft.axis(), LaneAxis::Horizontal);
        assert_eq!(Direction::LeftToRight.axis(), LaneAxis::Horizontal);
        assert_eq!(Direction::TopToBottom.axis(), LaneAxis::Vertical);
        assert_eq!(Direction::BottomToTop.axis(), LaneAxis::Vertical);
    }

    #[test]
    fn test_effective_duration_falls_back() {
        assert_eq!(Descriptor::new("a", "x").with_duration(3.0).effective_duration(), 3.0);
        assert_eq!(Descriptor::new("a", "x").with_duration(0.0).effective_duration(), DEFAULT_DURATION);
        assert_eq!(Descriptor::new("a", "x").with_duration(-1.0).effective_duration(), DEFAULT_DURATION);
        assert_eq!(Descriptor::new("a", "x").with_duration(f64::NAN).effective_duration(), DEFAULT_DURATION);
    }

    #[test]
    fn test_effective_delay_clamps() {
        assert_eq!(Descriptor::new("a", "x").with_delay(-2.0).effective_delay(), 0.0);
        assert_eq!(Descriptor::new("a", "x").with_delay(f64::INFINITY).effective_delay(), 0.0);
        assert_eq!(Descriptor::new("a", "x").with_delay(1.5).effective_delay(), 1.5);
    }

    #[test]
    fn test_matches_name() {
        let descriptor = Descriptor::new("walk", "hello");
        assert!(descriptor.matches_name(None));
        assert!(descriptor.matches_name(Some("walk")));
        assert!(!descriptor.matches_name(Some("float")));
    }

    #[test]
    fn test_partial_descriptor_from_toml() {
        let descriptor: Descriptor = toml::from_str(
            r#"
            sprite_name = "float"
            content = "hi"
            direction = "top_to_bottom"
            "#,
        )
        .unwrap();

        assert_eq!(descriptor.sprite_name, "float");
        assert_eq!(descriptor.duration, DEFAULT_DURATION);
        assert_eq!(descriptor.axis(), LaneAxis::Vertical);
        assert!(descriptor.identifier.is_none());
    }
}

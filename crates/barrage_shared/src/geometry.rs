//! Canvas geometry.
//!
//! The engine does not lay anything out; it only needs to know how much of
//! the container is usable for lanes after margins are applied.

use serde::{Deserialize, Serialize};

/// A width/height pair in canvas units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Size {
    /// Creates a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X position (left edge).
    pub x: f32,
    /// Y position (top edge).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a rectangle at the origin covering `size`.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns true if the rectangle has no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Shrinks the rectangle by per-edge insets. Never produces negative sizes.
    #[must_use]
    pub fn inset(&self, insets: EdgeInsets) -> Self {
        Self::new(
            self.x + insets.left,
            self.y + insets.top,
            (self.width - insets.left - insets.right).max(0.0),
            (self.height - insets.top - insets.bottom).max(0.0),
        )
    }
}

/// Per-edge insets.
///
/// Used both as absolute canvas units and as fractions of the container size
/// (percent margins), depending on context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeInsets {
    /// Top inset.
    pub top: f32,
    /// Left inset.
    pub left: f32,
    /// Bottom inset.
    pub bottom: f32,
    /// Right inset.
    pub right: f32,
}

impl EdgeInsets {
    /// No insets.
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    /// Creates insets from explicit edges.
    #[must_use]
    pub const fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self { top, left, bottom, right }
    }

    /// Same inset on every edge.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Converts fractional insets into absolute units for a container.
    #[must_use]
    pub fn scaled(&self, container: Size) -> Self {
        Self::new(
            self.top * container.height,
            self.left * container.width,
            self.bottom * container.height,
            self.right * container.width,
        )
    }
}

/// Resolves the usable canvas region for a container.
///
/// Percent margins win over absolute ones when both are set. Evaluated fresh
/// every time; callers must not cache the result across margin changes.
#[must_use]
pub fn resolve_canvas(
    container: Size,
    absolute: Option<EdgeInsets>,
    percent: Option<EdgeInsets>,
) -> Rect {
    let insets = match (percent, absolute) {
        (Some(percent), _) => percent.scaled(container),
        (None, Some(absolute)) => absolute,
        (None, None) => EdgeInsets::ZERO,
    };
    Rect::from_size(container).inset(insets)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: Size = Size::new(1000.0, 500.0);

    #[test]
    fn test_no_margins_is_whole_container() {
        assert_eq!(resolve_canvas(CONTAINER, None, None), Rect::new(0.0, 0.0, 1000.0, 500.0));
    }

    #[test]
    fn test_absolute_margins() {
        let canvas = resolve_canvas(CONTAINER, Some(EdgeInsets::new(10.0, 20.0, 30.0, 40.0)), None);
        assert_eq!(canvas, Rect::new(20.0, 10.0, 940.0, 460.0));
    }

    #[test]
    fn test_percent_wins_over_absolute() {
        let canvas = resolve_canvas(
            CONTAINER,
            Some(EdgeInsets::uniform(100.0)),
            Some(EdgeInsets::new(0.1, 0.0, 0.5, 0.0)),
        );
        assert_eq!(canvas, Rect::new(0.0, 50.0, 1000.0, 200.0));
    }

    #[test]
    fn test_percent_can_collapse_width() {
        let canvas = resolve_canvas(CONTAINER, None, Some(EdgeInsets::new(0.0, 0.5, 0.0, 0.5)));
        assert_eq!(canvas.width, 0.0);
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_oversized_margins_never_go_negative() {
        let canvas = resolve_canvas(CONTAINER, Some(EdgeInsets::uniform(900.0)), None);
        assert_eq!(canvas.width, 0.0);
        assert_eq!(canvas.height, 0.0);
    }
}

//! # Renderer Configuration
//!
//! Every setting of [`crate::Renderer`] in one serde struct, loadable from
//! TOML. Missing keys fall back to their defaults, so a config file only
//! needs the values it changes:
//!
//! ```toml
//! smoothness = 0.3
//! redisplay = true
//! container = { width = 1920.0, height = 1080.0 }
//! canvas_percent_margin = { top = 0.1, bottom = 0.5 }
//! ```

use std::path::Path;

use barrage_shared::constants::{
    DEFAULT_CONTAINER_HEIGHT, DEFAULT_CONTAINER_WIDTH, DEFAULT_LANE_THICKNESS,
    DEFAULT_MAX_WAIT_TICKS, DEFAULT_PENDING_CAPACITY, DEFAULT_SPEED, DEFAULT_TICK_RATE,
};
use barrage_shared::{EdgeInsets, Size};
use serde::{Deserialize, Serialize};

use crate::error::{BarrageError, BarrageResult};

/// How `load` treats the delay carried by each descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadDelayPolicy {
    /// Keep the recorded delay as is. Replaying a recording from a fresh
    /// start reproduces the original timeline.
    #[default]
    Preserve,
    /// Subtract the current elapsed time from each delay, clamped at zero.
    /// Items whose time already passed show up immediately.
    Restamp,
}

/// Renderer settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Absolute canvas margins.
    pub canvas_margin: Option<EdgeInsets>,
    /// Canvas margins as fractions of the container. Wins over
    /// `canvas_margin` when both are set.
    pub canvas_percent_margin: Option<EdgeInsets>,
    /// Container size until the host reports its real bounds.
    pub container: Size,
    /// Lane thickness in canvas units.
    pub lane_thickness: f32,
    /// Whether the canvas intercepts input. Stored for the host only.
    pub masked: bool,
    /// Burst smoothing in [0, 1].
    pub smoothness: f64,
    /// Clock speed multiplier, must be positive.
    pub speed: f64,
    /// Re-show items after the external clock seeks backwards.
    pub redisplay: bool,
    /// Draw by ascending z-index.
    pub z_index: bool,
    /// Record every received descriptor.
    pub recording: bool,
    /// Delay handling for `load`.
    pub load_delay_policy: LoadDelayPolicy,
    /// Smoother queue depth before high smoothness drops items.
    pub pending_capacity: usize,
    /// Ticks an item may wait for a lane before it is dropped.
    pub max_wait_ticks: u32,
    /// Frame rate of the fixed-timestep driver.
    pub tick_rate: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            canvas_margin: None,
            canvas_percent_margin: None,
            container: Size::new(DEFAULT_CONTAINER_WIDTH, DEFAULT_CONTAINER_HEIGHT),
            lane_thickness: DEFAULT_LANE_THICKNESS,
            masked: true,
            smoothness: 0.0,
            speed: DEFAULT_SPEED,
            redisplay: false,
            z_index: false,
            recording: false,
            load_delay_policy: LoadDelayPolicy::Preserve,
            pending_capacity: DEFAULT_PENDING_CAPACITY,
            max_wait_ticks: DEFAULT_MAX_WAIT_TICKS,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }
}

impl RendererConfig {
    /// Parses and validates a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`BarrageError::Parse`] for malformed TOML and
    /// [`BarrageError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> BarrageResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`BarrageError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> BarrageResult<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loading renderer config");
        Self::from_toml_str(&source)
    }

    /// Checks every value against the ranges the engine accepts.
    ///
    /// # Errors
    ///
    /// Returns [`BarrageError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> BarrageResult<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(invalid(format!("speed must be positive, got {}", self.speed)));
        }
        if !(0.0..=1.0).contains(&self.smoothness) {
            return Err(invalid(format!(
                "smoothness must be within [0, 1], got {}",
                self.smoothness
            )));
        }
        if !self.lane_thickness.is_finite() || self.lane_thickness <= 0.0 {
            return Err(invalid(format!(
                "lane_thickness must be positive, got {}",
                self.lane_thickness
            )));
        }
        let Size { width, height } = self.container;
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(invalid(format!("container must be non-negative, got {width}x{height}")));
        }
        if self.tick_rate == 0 {
            return Err(invalid("tick_rate must be at least 1".to_owned()));
        }
        if let Some(percent) = self.canvas_percent_margin {
            let edges = [percent.top, percent.left, percent.bottom, percent.right];
            if edges.iter().any(|edge| !(0.0..=1.0).contains(edge)) {
                return Err(invalid(format!(
                    "canvas_percent_margin edges must be within [0, 1], got {percent:?}"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> BarrageError {
    BarrageError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = RendererConfig::from_toml_str("").unwrap();
        assert_eq!(config, RendererConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = RendererConfig::from_toml_str(
            r#"
            smoothness = 0.3
            redisplay = true
            load_delay_policy = "restamp"
            container = { width = 1920.0, height = 1080.0 }
            canvas_percent_margin = { top = 0.1, bottom = 0.5 }
            "#,
        )
        .unwrap();

        assert!((config.smoothness - 0.3).abs() < 1e-12);
        assert!(config.redisplay);
        assert_eq!(config.load_delay_policy, LoadDelayPolicy::Restamp);
        assert_eq!(config.container, Size::new(1920.0, 1080.0));
        let margin = config.canvas_percent_margin.unwrap();
        assert!((margin.bottom - 0.5).abs() < f32::EPSILON);
        assert!(margin.left.abs() < f32::EPSILON);
        assert!((config.speed - DEFAULT_SPEED).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_non_positive_speed() {
        let err = RendererConfig::from_toml_str("speed = 0.0").unwrap_err();
        assert!(matches!(err, BarrageError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_smoothness_out_of_range() {
        let err = RendererConfig::from_toml_str("smoothness = 1.5").unwrap_err();
        assert!(matches!(err, BarrageError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = RendererConfig::from_toml_str("speed = [").unwrap_err();
        assert!(matches!(err, BarrageError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RendererConfig::from_file("/nonexistent/barrage.toml").unwrap_err();
        assert!(matches!(err, BarrageError::Io(_)));
    }
}

//! # Engine Error Types
//!
//! Errors raised inside the engine. None of them cross the renderer's control
//! surface: the facade logs them and carries on with the previous state.

use thiserror::Error;

/// Errors that can occur in the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Speed multiplier must be finite and strictly positive.
    #[error("invalid speed {0}: must be finite and > 0")]
    InvalidSpeed(f64),

    /// Smoothness must be finite and within [0, 1].
    #[error("invalid smoothness {0}: must be within [0, 1]")]
    InvalidSmoothness(f64),

    /// Lane thickness must be finite and strictly positive.
    #[error("invalid lane thickness {0}: must be finite and > 0")]
    InvalidLaneThickness(f32),

    /// Container size must be finite and non-negative.
    #[error("invalid container size {width}x{height}")]
    InvalidContainer {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },

    /// No present sprite carries the identifier.
    #[error("no present sprite with identifier {0:?}")]
    UnknownIdentifier(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

//! # Renderer Error Types
//!
//! Only configuration loading reports errors to the caller. Every control
//! operation on [`crate::Renderer`] degrades to a logged no-op instead.

use thiserror::Error;

/// Errors surfaced by configuration loading.
#[derive(Error, Debug)]
pub enum BarrageError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`crate::RendererConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config parsed but holds values the engine rejects.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for configuration loading.
pub type BarrageResult<T> = Result<T, BarrageError>;

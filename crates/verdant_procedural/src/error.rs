//! # World Error Types
//!
//! Generation and streaming never fail; only loading and validating
//! configuration can.

use thiserror::Error;

/// Errors that can occur while setting up a world.
#[derive(Error, Debug)]
pub enum WorldError {
    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for world setup operations.
pub type WorldResult<T> = Result<T, WorldError>;

//! Error types for the flow-particles core.

use thiserror::Error;

/// Errors produced by simulation operations.
///
/// None of these are raised from inside a frame step: per-particle faults
/// fall back to neutral values instead. Errors surface only at the
/// construction and configuration boundaries.
#[derive(Debug, Error)]
pub enum SimError {
    /// Width or height was zero when creating a surface-sized buffer.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A configuration value was rejected (e.g. NaN or infinite).
    #[error("invalid configuration for '{name}': {reason}")]
    InvalidConfig { name: String, reason: String },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// An I/O failure while writing output.
    #[error("i/o error: {0}")]
    Io(String),
}

impl SimError {
    /// Shorthand for [`SimError::InvalidConfig`].
    pub fn invalid_config(name: &str, reason: impl Into<String>) -> Self {
        SimError::InvalidConfig {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

//! Error types for Horizon Entry.
//!
//! Only construction and configuration faults are errors. An edit that the
//! constrained buffer refuses is reported as a plain outcome value, never as
//! an error.

use thiserror::Error;

/// The main error type for Horizon Entry operations.
#[derive(Debug, Error)]
pub enum EntryError {
    /// A mask could not be built from its pattern.
    #[error("Mask error: {0}")]
    Mask(#[from] MaskError),
    /// A numeric field was given an unusable configuration.
    #[error("Number error: {0}")]
    Number(#[from] NumberError),
    /// Field configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Mask construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    /// The pattern has no characters at all.
    #[error("the mask cannot be empty")]
    EmptyPattern,
    /// The pattern ends with an escape character that escapes nothing.
    #[error("the mask \"{pattern}\" contains a dangling escape")]
    DanglingEscape {
        /// The offending pattern.
        pattern: String,
    },
    /// Every position of the pattern is a literal.
    #[error("the mask \"{pattern}\" must contain some editable characters")]
    NoEditablePosition {
        /// The offending pattern.
        pattern: String,
    },
}

/// Numeric field configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    /// The lower bound of a range is above its upper bound.
    #[error("maximum range value {max} must be greater than minimum value {min}")]
    InvertedRange {
        /// The requested lower bound.
        min: String,
        /// The requested upper bound.
        max: String,
    },
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid field configuration: {message}")]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    /// Create a configuration error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The underlying message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A specialized Result type for Horizon Entry operations.
pub type Result<T> = std::result::Result<T, EntryError>;

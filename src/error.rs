//! Error types for volaug.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by augmentation operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An array has the wrong number of axes or an empty axis.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Image and label (or batch members) disagree on shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Technique index outside the configured technique list.
    #[error("unsupported technique index {index} (configured techniques: {available})")]
    UnsupportedTechnique {
        /// Requested index.
        index: usize,
        /// Number of techniques the configuration enables.
        available: usize,
    },

    /// Invalid augmentation parameters.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A transform failed after its inputs were validated.
    #[error("{operation} failed: {reason}")]
    TransformError {
        /// Name of the transform.
        operation: &'static str,
        /// Underlying cause.
        reason: String,
    },

    /// The batch worker pool could not be created.
    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

impl Error {
    pub(crate) fn transform(operation: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::TransformError {
            operation,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_technique_message() {
        let err = Error::UnsupportedTechnique {
            index: 9,
            available: 6,
        };
        assert_eq!(
            err.to_string(),
            "unsupported technique index 9 (configured techniques: 6)"
        );
    }

    #[test]
    fn test_transform_helper() {
        let err = Error::transform("swirl", "bad axes");
        assert!(err.to_string().contains("swirl failed: bad axes"));
    }
}

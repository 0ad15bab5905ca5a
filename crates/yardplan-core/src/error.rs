//! Error handling for YardPlan
//!
//! Provides error types for every layer of the planner:
//! - Validation errors (user input that is rejected without mutating state)
//! - Design file errors (save files that cannot be loaded)
//! - Asset errors (3D models that could not be loaded)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Validation error type
///
/// Raised when user input is rejected. The triggering action is aborted and
/// no state is mutated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Polygon outline is unusable
    #[error("Invalid polygon: {reason}")]
    InvalidPolygon {
        /// Why the polygon was rejected.
        reason: String,
    },

    /// A dimension that must be positive was zero or negative
    #[error("{field} must be greater than zero (got {value})")]
    NonPositiveDimension {
        /// The offending field name.
        field: String,
        /// The rejected value.
        value: f64,
    },

    /// A value fell outside its accepted range
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        /// The offending field name.
        field: String,
        /// The rejected value.
        value: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },

    /// Action not allowed while a polygon is being drawn
    #[error("Finish or cancel the current drawing first")]
    DrawingActive,

    /// Drawing action requested while no drawing is in progress
    #[error("No drawing in progress")]
    NoDrawing,

    /// Colour string is not `#rrggbb`
    #[error("Invalid colour '{value}', expected #rrggbb")]
    InvalidColor {
        /// The rejected colour string.
        value: String,
    },

    /// Element kind does not support rotation
    #[error("{kind} elements cannot be rotated")]
    NotRotatable {
        /// Display name of the element kind.
        kind: String,
    },
}

impl ValidationError {
    /// Shorthand for an [`ValidationError::InvalidPolygon`].
    pub fn invalid_polygon(reason: impl Into<String>) -> Self {
        Self::InvalidPolygon {
            reason: reason.into(),
        }
    }

    /// Checks that `value` is finite and strictly positive.
    pub fn require_positive(field: &str, value: f64) -> std::result::Result<f64, Self> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Self::NonPositiveDimension {
                field: field.to_string(),
                value,
            })
        }
    }

    /// Checks that `value` is finite and within `[min, max]`.
    pub fn require_range(
        field: &str,
        value: f64,
        min: f64,
        max: f64,
    ) -> std::result::Result<f64, Self> {
        if value.is_finite() && value >= min && value <= max {
            Ok(value)
        } else {
            Err(Self::OutOfRange {
                field: field.to_string(),
                value,
                min,
                max,
            })
        }
    }
}

/// Design file error type
///
/// Represents save files that could not be read or understood.
#[derive(Error, Debug)]
pub enum DesignFileError {
    /// File is not valid JSON or does not match the expected layout
    #[error("Could not parse design file: {0}")]
    Parse(#[from] serde_json::Error),

    /// File has no version marker
    #[error("Design file has no version field")]
    MissingVersion,

    /// File carries neither elements, a custom house nor a lot
    #[error("Design file contains no design data")]
    Empty,

    /// File was written by a newer, incompatible format revision
    #[error("Unsupported design file version {version}")]
    UnknownVersion {
        /// Version string found in the file.
        version: String,
    },
}

/// Asset loading error type
///
/// Model loading failures are recovered by substituting a placeholder mesh;
/// these errors are logged and never shown to the user.
#[derive(Error, Debug)]
pub enum AssetError {
    /// Model file could not be read
    #[error("Failed to read model {path}: {source}")]
    Io {
        /// Path of the model file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Model file contents could not be decoded
    #[error("Failed to decode model {path}: {reason}")]
    Parse {
        /// Path of the model file.
        path: String,
        /// Decoder message.
        reason: String,
    },

    /// Model decoded to zero triangles
    #[error("Model {path} contains no geometry")]
    EmptyMesh {
        /// Path of the model file.
        path: String,
    },
}

/// Main error type for YardPlan
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// User input validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Design file error
    #[error(transparent)]
    DesignFile(#[from] DesignFileError),

    /// Asset loading error
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Element id not present in the store
    #[error("Element {id} not found")]
    NotFound {
        /// The missing element id.
        id: u64,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error should be shown to the user as a validation alert
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a design file error
    pub fn is_design_file_error(&self) -> bool {
        matches!(self, Error::DesignFile(_))
    }

    /// Check if this is an asset error
    pub fn is_asset_error(&self) -> bool {
        matches!(self, Error::Asset(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::DesignFile(DesignFileError::Parse(err))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert_eq!(ValidationError::require_positive("width", 3.0), Ok(3.0));
        assert!(ValidationError::require_positive("width", 0.0).is_err());
        assert!(ValidationError::require_positive("width", -1.0).is_err());
        assert!(ValidationError::require_positive("width", f64::NAN).is_err());
    }

    #[test]
    fn test_require_range_inclusive() {
        assert!(ValidationError::require_range("hour", 0.0, 0.0, 24.0).is_ok());
        assert!(ValidationError::require_range("hour", 24.0, 0.0, 24.0).is_ok());
        assert!(ValidationError::require_range("hour", 24.5, 0.0, 24.0).is_err());
    }

    #[test]
    fn test_error_classification() {
        let err: Error = ValidationError::DrawingActive.into();
        assert!(err.is_validation_error());
        assert!(!err.is_design_file_error());

        let err: Error = DesignFileError::MissingVersion.into();
        assert!(err.is_design_file_error());
        assert_eq!(err.to_string(), "Design file has no version field");
    }
}

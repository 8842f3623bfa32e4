//! Error types for grid construction and geometry queries.

use thiserror::Error;

/// Result type alias for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur while building or querying a corner-point grid.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum GridError {
    /// An input array does not have the length implied by the grid dimensions.
    #[error("shape mismatch for {what}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        /// Which array was inconsistent.
        what: &'static str,
        /// Length implied by the declared dimensions.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// The grid dimensions are invalid.
    #[error("invalid grid dimensions: {ncol}x{nrow}x{nlay}")]
    InvalidDimensions {
        /// Number of columns (i).
        ncol: usize,
        /// Number of rows (j).
        nrow: usize,
        /// Number of layers (k).
        nlay: usize,
    },

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A cell index lies outside the grid.
    #[error("cell ({i}, {j}, {k}) is out of range")]
    OutOfRange {
        /// Column index.
        i: usize,
        /// Row index.
        j: usize,
        /// Layer index.
        k: usize,
    },

    /// A well path could not be built from the supplied samples.
    #[error("invalid well path: {0}")]
    InvalidWellPath(String),
}

impl GridError {
    /// Create a shape mismatch error.
    #[must_use]
    pub const fn shape_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            actual,
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(details: impl Into<String>) -> Self {
        Self::InvalidConfiguration(details.into())
    }

    /// Create an invalid well path error.
    #[must_use]
    pub fn invalid_well_path(details: impl Into<String>) -> Self {
        Self::InvalidWellPath(details.into())
    }

    /// Check if this is a shape mismatch error.
    #[must_use]
    pub const fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub const fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GridError::shape_mismatch("zcorn", 64, 63);
        let msg = err.to_string();
        assert!(msg.contains("zcorn"));
        assert!(msg.contains("64"));
        assert!(msg.contains("63"));

        let err = GridError::InvalidDimensions {
            ncol: 0,
            nrow: 2,
            nlay: 3,
        };
        assert!(err.to_string().contains("0x2x3"));

        let err = GridError::invalid_configuration("epsilon must be positive");
        assert!(err.to_string().contains("epsilon"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(GridError::shape_mismatch("coord", 1, 2).is_shape_mismatch());
        assert!(!GridError::shape_mismatch("coord", 1, 2).is_invalid_configuration());
        assert!(GridError::invalid_configuration("x").is_invalid_configuration());
        assert!(!GridError::invalid_well_path("empty").is_shape_mismatch());
    }
}

//! Error types for resampling.

use reservoir_surface::SurfaceError;
use reservoir_types::GridError;
use thiserror::Error;

/// Result type alias for resampling operations.
pub type ResampleResult<T> = Result<T, ResampleError>;

/// Errors that can occur while resampling properties.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ResampleError {
    /// An input array does not fit the geometry it is paired with.
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Which input was inconsistent.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// No sample could be located and some were covered only by degenerate cells.
    #[error("degenerate geometry: {samples} samples fell only in degenerate cells")]
    DegenerateGeometry {
        /// Number of samples covered only by degenerate cells.
        samples: usize,
    },

    /// Parameters are invalid or unsuited to the property kind.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Grid construction or lookup error.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Surface construction error.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl ResampleError {
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

    /// Check if this is a degenerate geometry error.
    #[must_use]
    pub const fn is_degenerate_geometry(&self) -> bool {
        matches!(self, Self::DegenerateGeometry { .. })
    }

    /// Check if this error reports mismatched input sizes, directly or from
    /// a wrapped grid or surface error.
    #[must_use]
    pub const fn is_shape_mismatch(&self) -> bool {
        match self {
            Self::ShapeMismatch { .. } => true,
            Self::Grid(e) => e.is_shape_mismatch(),
            Self::Surface(e) => e.is_shape_mismatch(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResampleError::DegenerateGeometry { samples: 3 };
        assert!(err.to_string().contains("3 samples"));
        assert!(err.is_degenerate_geometry());

        let err = ResampleError::invalid_configuration("unknown policy 'median'");
        assert!(format!("{err}").contains("median"));
    }

    #[test]
    fn test_from_grid_error() {
        let err: ResampleError = GridError::shape_mismatch("property", 4, 3).into();
        assert!(err.is_shape_mismatch());
        assert!(matches!(err, ResampleError::Grid(_)));
        assert_eq!(
            err.to_string(),
            "shape mismatch for property: expected 4 values, got 3"
        );
    }
}

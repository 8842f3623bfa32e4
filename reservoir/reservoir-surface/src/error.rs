//! Error types for surface construction.

use thiserror::Error;

/// Result type alias for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Errors that can occur while building a regular surface.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SurfaceError {
    /// Node spacing is not positive and finite.
    #[error("invalid spacing: xinc={xinc}, yinc={yinc} (both must be positive)")]
    InvalidSpacing {
        /// Spacing along the local x axis.
        xinc: f64,
        /// Spacing along the local y axis.
        yinc: f64,
    },

    /// Rotation is outside `[0, 360)` degrees.
    #[error("invalid rotation {0} (must be in [0, 360) degrees)")]
    InvalidRotation(f64),

    /// A dimension is zero.
    #[error("invalid surface dimensions: {ncol}x{nrow}")]
    InvalidDimensions {
        /// Number of nodes along the local x axis.
        ncol: usize,
        /// Number of nodes along the local y axis.
        nrow: usize,
    },

    /// The value array does not have one entry per node.
    #[error("shape mismatch: expected {expected} node values, got {actual}")]
    ShapeMismatch {
        /// `ncol * nrow`.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
}

impl SurfaceError {
    /// Check if this is a shape mismatch error.
    #[must_use]
    pub const fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SurfaceError::InvalidSpacing {
            xinc: 0.0,
            yinc: 25.0,
        };
        assert!(err.to_string().contains("xinc=0"));

        let err = SurfaceError::ShapeMismatch {
            expected: 6,
            actual: 5,
        };
        assert!(err.is_shape_mismatch());
        assert_eq!(
            err.to_string(),
            "shape mismatch: expected 6 node values, got 5"
        );
    }
}

//! Geometric tolerances and search options.
//!
//! [`GeometryConfig`] is passed explicitly to every index build and query, so
//! two calls with the same configuration always give the same answer.
//!
//! # Presets
//!
//! - [`GeometryConfig::default()`] - balanced settings for field-scale grids
//! - [`GeometryConfig::strict()`] - tight tolerances, no degenerate cells
//! - [`GeometryConfig::lenient()`] - looser tolerances for noisy or collapsed grids
//!
//! # Example
//!
//! ```
//! use reservoir_types::GeometryConfig;
//!
//! let config = GeometryConfig::default()
//!     .with_epsilon(1e-7)
//!     .with_include_inactive(true);
//! assert!(config.validate().is_ok());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Default relative volume tolerance for degeneracy checks.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Default barycentric tolerance for the inside-cell test.
pub const DEFAULT_CONTAIN_TOLERANCE: f64 = 1e-9;

/// Configuration for cell geometry checks and spatial search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometryConfig {
    /// Relative volume tolerance. A cell is degenerate when its volume is at
    /// or below `epsilon * s^3`, with `s` the largest extent of its bounding box.
    pub epsilon: f64,

    /// Barycentric tolerance for point-in-tetrahedron tests. Also scales the
    /// bounding-box padding used by the spatial index.
    pub contain_tolerance: f64,

    /// Whether degenerate cells take part in point location.
    pub include_degenerate: bool,

    /// Whether inactive cells take part in point location.
    pub include_inactive: bool,

    /// Number of grid columns (and rows) covered by one bucket of the
    /// per-layer search grid.
    pub bucket_columns: usize,

    /// Whether to build the per-layer index in parallel (via rayon).
    pub parallel: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            contain_tolerance: DEFAULT_CONTAIN_TOLERANCE,
            include_degenerate: false,
            include_inactive: false,
            bucket_columns: 2,
            parallel: true,
        }
    }
}

impl GeometryConfig {
    /// Tight tolerances for synthetic or CAD-like grids.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            epsilon: 1e-12,
            contain_tolerance: 1e-12,
            ..Self::default()
        }
    }

    /// Looser tolerances for grids with many pinched-out cells.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            epsilon: 1e-6,
            contain_tolerance: 1e-6,
            ..Self::default()
        }
    }

    /// Set the relative volume tolerance.
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the barycentric tolerance.
    #[must_use]
    pub const fn with_contain_tolerance(mut self, tolerance: f64) -> Self {
        self.contain_tolerance = tolerance;
        self
    }

    /// Include or exclude degenerate cells from point location.
    #[must_use]
    pub const fn with_include_degenerate(mut self, include: bool) -> Self {
        self.include_degenerate = include;
        self
    }

    /// Include or exclude inactive cells from point location.
    #[must_use]
    pub const fn with_include_inactive(mut self, include: bool) -> Self {
        self.include_inactive = include;
        self
    }

    /// Set the bucket size of the per-layer search grid, in grid columns.
    #[must_use]
    pub const fn with_bucket_columns(mut self, columns: usize) -> Self {
        self.bucket_columns = columns;
        self
    }

    /// Enable or disable parallel index construction.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Whether `other` gives the same location answers as `self`.
    ///
    /// Compares every field except [`parallel`](Self::parallel), which only
    /// changes how work is scheduled.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn same_geometry(&self, other: &Self) -> bool {
        self.epsilon == other.epsilon
            && self.contain_tolerance == other.contain_tolerance
            && self.include_degenerate == other.include_degenerate
            && self.include_inactive == other.include_inactive
            && self.bucket_columns == other.bucket_columns
    }

    /// Check that all values are in range.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfiguration`] if a tolerance is negative or
    /// not finite, or if `bucket_columns` is zero.
    pub fn validate(&self) -> GridResult<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(GridError::invalid_configuration(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        if !self.contain_tolerance.is_finite() || self.contain_tolerance < 0.0 {
            return Err(GridError::invalid_configuration(format!(
                "contain_tolerance must be finite and non-negative, got {}",
                self.contain_tolerance
            )));
        }
        if self.bucket_columns == 0 {
            return Err(GridError::invalid_configuration(
                "bucket_columns must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GeometryConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.include_degenerate);
        assert!(!config.include_inactive);
        assert!((config.epsilon - DEFAULT_EPSILON).abs() < f64::EPSILON);
    }

    #[test]
    fn test_presets_ordering() {
        assert!(GeometryConfig::strict().epsilon < GeometryConfig::default().epsilon);
        assert!(GeometryConfig::lenient().epsilon > GeometryConfig::default().epsilon);
        assert!(GeometryConfig::strict().validate().is_ok());
        assert!(GeometryConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GeometryConfig::default()
            .with_epsilon(1e-5)
            .with_contain_tolerance(1e-4)
            .with_include_degenerate(true)
            .with_bucket_columns(4)
            .with_parallel(false);
        assert!((config.epsilon - 1e-5).abs() < f64::EPSILON);
        assert!((config.contain_tolerance - 1e-4).abs() < f64::EPSILON);
        assert!(config.include_degenerate);
        assert_eq!(config.bucket_columns, 4);
        assert!(!config.parallel);
    }

    #[test]
    fn test_same_geometry_ignores_parallel() {
        let config = GeometryConfig::default();
        assert!(config.same_geometry(&config.with_parallel(false)));
        assert!(!config.same_geometry(&config.with_include_inactive(true)));
        assert!(!config.same_geometry(&config.with_bucket_columns(3)));
        assert!(!config.same_geometry(&GeometryConfig::lenient()));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = GeometryConfig::default().with_epsilon(-1.0).validate();
        assert!(matches!(err, Err(GridError::InvalidConfiguration(_))));

        let err = GeometryConfig::default()
            .with_contain_tolerance(f64::NAN)
            .validate();
        assert!(matches!(err, Err(GridError::InvalidConfiguration(_))));

        let err = GeometryConfig::default().with_bucket_columns(0).validate();
        assert!(matches!(err, Err(GridError::InvalidConfiguration(_))));
    }
}

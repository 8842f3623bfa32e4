//! Parameters for resampling.
//!
//! # Example
//!
//! ```
//! use reservoir_resample::{AggregationPolicy, ResampleParams};
//!
//! let params = ResampleParams::default()
//!     .with_policy("majority".parse().unwrap())
//!     .with_samples_per_axis(3);
//! assert_eq!(params.policy, AggregationPolicy::Majority);
//! assert!(params.validate().is_ok());
//! ```

use std::fmt;
use std::str::FromStr;

use reservoir_types::{is_undef_int, GeometryConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ResampleError, ResampleResult};

/// How source cells hit by one target cell are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AggregationPolicy {
    /// Value of the source cell containing the target cell center.
    #[default]
    Nearest,
    /// Unweighted mean over the distinct source cells hit.
    Mean,
    /// Mean weighted by the number of sub-samples per source cell.
    VolumeWeightedMean,
    /// Code with the most sub-samples; ties go to the smallest code.
    Majority,
}

impl AggregationPolicy {
    /// All policies.
    pub const ALL: [Self; 4] = [
        Self::Nearest,
        Self::Mean,
        Self::VolumeWeightedMean,
        Self::Majority,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Mean => "mean",
            Self::VolumeWeightedMean => "volume_weighted_mean",
            Self::Majority => "majority",
        }
    }

    /// Whether the policy averages values (continuous properties only).
    #[must_use]
    pub const fn is_mean(self) -> bool {
        matches!(self, Self::Mean | Self::VolumeWeightedMean)
    }
}

impl fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregationPolicy {
    type Err = ResampleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "nearest" => Ok(Self::Nearest),
            "mean" | "average" => Ok(Self::Mean),
            "volume_weighted_mean" | "weighted_mean" => Ok(Self::VolumeWeightedMean),
            "majority" | "mode" => Ok(Self::Majority),
            _ => Err(ResampleError::invalid_configuration(format!(
                "unknown aggregation policy '{s}'"
            ))),
        }
    }
}

/// Which surface lookups feed a target cell in surface-to-grid sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SurfaceSampling {
    /// One lookup at the cell center.
    #[default]
    CellCenter,
    /// Mean of lookups at the four top corners.
    TopCorners,
}

/// Filter applied to a well zone log before it is compared with the grid.
///
/// The shift is applied first, then the zone and depth ranges; both ranges
/// exclude their bounds.
///
/// # Example
///
/// ```
/// use reservoir_resample::ZoneLogFilter;
///
/// let filter = ZoneLogFilter::default().with_shift(-1).with_zone_range(0, 5);
/// assert_eq!(filter.apply(3, 1000.0), Some(2));
/// assert_eq!(filter.apply(1, 1000.0), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneLogFilter {
    /// Added to every defined log code.
    pub shift: i32,

    /// Keep shifted codes strictly between the two bounds.
    pub zone_range: Option<(i32, i32)>,

    /// Keep points whose depth lies strictly between the two bounds.
    pub depth_range: Option<(f64, f64)>,
}

impl ZoneLogFilter {
    /// Set the code shift.
    #[must_use]
    pub const fn with_shift(mut self, shift: i32) -> Self {
        self.shift = shift;
        self
    }

    /// Keep codes strictly between `low` and `high`.
    #[must_use]
    pub const fn with_zone_range(mut self, low: i32, high: i32) -> Self {
        self.zone_range = Some((low, high));
        self
    }

    /// Keep points strictly between depths `top` and `base`.
    #[must_use]
    pub const fn with_depth_range(mut self, top: f64, base: f64) -> Self {
        self.depth_range = Some((top, base));
        self
    }

    /// The shifted code of a log sample at depth `z`, or `None` when the
    /// code is undefined or filtered out.
    #[must_use]
    pub fn apply(&self, code: i32, z: f64) -> Option<i32> {
        if is_undef_int(code) {
            return None;
        }
        if let Some((top, base)) = self.depth_range {
            if !(z > top && z < base) {
                return None;
            }
        }
        let code = code.saturating_add(self.shift);
        match self.zone_range {
            Some((low, high)) if !(code > low && code < high) => None,
            _ => Some(code),
        }
    }

    /// Check that the ranges are ordered.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::InvalidConfiguration`] if a range is empty
    /// or a depth bound is not finite.
    pub fn validate(&self) -> ResampleResult<()> {
        if let Some((low, high)) = self.zone_range {
            if low >= high {
                return Err(ResampleError::invalid_configuration(format!(
                    "zone range ({low}, {high}) is empty"
                )));
            }
        }
        if let Some((top, base)) = self.depth_range {
            if !(top.is_finite() && base.is_finite() && top < base) {
                return Err(ResampleError::invalid_configuration(format!(
                    "depth range ({top}, {base}) is empty or not finite"
                )));
            }
        }
        Ok(())
    }
}

/// Parameters shared by all resampling operations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResampleParams {
    /// Tolerances and search options for the source index.
    pub geometry: GeometryConfig,

    /// Aggregation used by grid-to-grid resampling.
    pub policy: AggregationPolicy,

    /// Sub-samples per axis inside each target cell for the aggregating
    /// policies (`samples_per_axis^3` points per cell).
    pub samples_per_axis: usize,

    /// Whether to process target points in parallel (via rayon).
    pub parallel: bool,
}

impl Default for ResampleParams {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            policy: AggregationPolicy::Nearest,
            samples_per_axis: 2,
            parallel: true,
        }
    }
}

impl ResampleParams {
    /// Parameters for a given policy with default everything else.
    #[must_use]
    pub fn for_policy(policy: AggregationPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Set the geometry configuration.
    #[must_use]
    pub const fn with_geometry(mut self, geometry: GeometryConfig) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the aggregation policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: AggregationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the number of sub-samples per axis.
    #[must_use]
    pub const fn with_samples_per_axis(mut self, samples: usize) -> Self {
        self.samples_per_axis = samples;
        self
    }

    /// Enable or disable parallel processing.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that all values are in range.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::InvalidConfiguration`] if `samples_per_axis`
    /// is zero or the geometry configuration is invalid.
    pub fn validate(&self) -> ResampleResult<()> {
        self.geometry
            .validate()
            .map_err(|e| ResampleError::invalid_configuration(e.to_string()))?;
        if self.samples_per_axis == 0 {
            return Err(ResampleError::invalid_configuration(
                "samples_per_axis must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("nearest".parse::<AggregationPolicy>(), Ok(AggregationPolicy::Nearest));
        assert_eq!("Mean".parse::<AggregationPolicy>(), Ok(AggregationPolicy::Mean));
        assert_eq!(
            "volume-weighted-mean".parse::<AggregationPolicy>(),
            Ok(AggregationPolicy::VolumeWeightedMean)
        );
        assert_eq!(" majority ".parse::<AggregationPolicy>(), Ok(AggregationPolicy::Majority));
        assert!(matches!(
            "median".parse::<AggregationPolicy>(),
            Err(ResampleError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_policy_name_roundtrip() {
        for policy in AggregationPolicy::ALL {
            assert_eq!(policy.to_string().parse::<AggregationPolicy>(), Ok(policy));
        }
        assert!(AggregationPolicy::Mean.is_mean());
        assert!(!AggregationPolicy::Majority.is_mean());
    }

    #[test]
    fn test_default_params() {
        let params = ResampleParams::default();
        assert_eq!(params.policy, AggregationPolicy::Nearest);
        assert_eq!(params.samples_per_axis, 2);
        assert!(params.parallel);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_zone_log_filter() {
        let filter = ZoneLogFilter::default();
        assert_eq!(filter.apply(0, 0.0), Some(0));
        assert_eq!(filter.apply(reservoir_types::UNDEF_INT, 0.0), None);

        let filter = filter.with_shift(2).with_zone_range(2, 10).with_depth_range(1000.0, 1100.0);
        assert!(filter.validate().is_ok());
        assert_eq!(filter.apply(1, 1050.0), Some(3));
        assert_eq!(filter.apply(0, 1050.0), None);
        assert_eq!(filter.apply(8, 1050.0), None);
        assert_eq!(filter.apply(1, 1000.0), None);
        assert_eq!(filter.apply(1, 1100.5), None);

        assert!(ZoneLogFilter::default().with_zone_range(3, 3).validate().is_err());
        assert!(ZoneLogFilter::default().with_depth_range(10.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_invalid_params() {
        let params = ResampleParams::default().with_samples_per_axis(0);
        assert!(params.validate().is_err());

        let params = ResampleParams::for_policy(AggregationPolicy::Mean)
            .with_geometry(GeometryConfig::default().with_epsilon(-1.0));
        assert!(matches!(
            params.validate(),
            Err(ResampleError::InvalidConfiguration(_))
        ));
    }
}

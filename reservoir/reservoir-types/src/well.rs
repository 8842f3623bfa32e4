//! Well trajectories.
//!
//! A [`WellPath`] is an ordered list of survey points with a measured depth
//! (MD) per point. Without supplied MD values the path length from the
//! first point is used.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::error::{GridError, GridResult};

/// A well trajectory with measured depth per point.
///
/// # Example
///
/// ```
/// use reservoir_types::{Point3, WellPath};
///
/// let well = WellPath::try_new(vec![
///     Point3::new(0.0, 0.0, 1000.0),
///     Point3::new(0.0, 0.0, 1010.0),
///     Point3::new(0.0, 5.0, 1010.0),
/// ])
/// .unwrap();
///
/// assert!((well.total_md() - 15.0).abs() < 1e-10);
/// let p = well.point_at_md(12.0).unwrap();
/// assert!((p.y - 2.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WellPath {
    name: Option<String>,
    points: Vec<Point3<f64>>,
    md: Vec<f64>,
}

impl WellPath {
    /// Create a path with MD computed as cumulative 3D length.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidWellPath`] if `points` is empty or holds a
    /// non-finite coordinate.
    pub fn try_new(points: Vec<Point3<f64>>) -> GridResult<Self> {
        check_points(&points)?;
        let md = cumulative_lengths(&points);
        Ok(Self {
            name: None,
            points,
            md,
        })
    }

    /// Create a path with supplied measured depths.
    ///
    /// # Errors
    ///
    /// - [`GridError::ShapeMismatch`] if `md` and `points` differ in length.
    /// - [`GridError::InvalidWellPath`] if `points` is empty, or `md` is not
    ///   finite and non-decreasing.
    pub fn with_measured_depth(points: Vec<Point3<f64>>, md: Vec<f64>) -> GridResult<Self> {
        check_points(&points)?;
        if md.len() != points.len() {
            return Err(GridError::shape_mismatch("md", points.len(), md.len()));
        }
        if md.iter().any(|d| !d.is_finite()) {
            return Err(GridError::invalid_well_path("measured depth must be finite"));
        }
        if let Some(pos) = md.windows(2).position(|w| w[1] < w[0]) {
            return Err(GridError::invalid_well_path(format!(
                "measured depth decreases at point {}",
                pos + 1
            )));
        }
        Ok(Self {
            name: None,
            points,
            md,
        })
    }

    /// Attach a name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Well name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Survey points.
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Measured depth per point.
    #[must_use]
    pub fn md(&self) -> &[f64] {
        &self.md
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// MD range from first to last point.
    #[must_use]
    pub fn total_md(&self) -> f64 {
        match (self.md.first(), self.md.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Bounding box of the survey points.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.points)
    }

    /// Position at measured depth `md`, linear between survey points.
    ///
    /// Returns `None` outside the MD range of the path.
    #[must_use]
    pub fn point_at_md(&self, md: f64) -> Option<Point3<f64>> {
        let first = *self.md.first()?;
        let last = *self.md.last()?;
        if !(first..=last).contains(&md) {
            return None;
        }
        // First survey point with MD >= md.
        let hi = self.md.partition_point(|&d| d < md);
        if hi == 0 {
            return Some(self.points[0]);
        }
        let lo = hi - 1;
        let span = self.md[hi] - self.md[lo];
        if span <= 0.0 {
            return Some(self.points[hi]);
        }
        let t = (md - self.md[lo]) / span;
        Some(self.points[lo] + (self.points[hi] - self.points[lo]) * t)
    }

    /// Resample the path at a regular MD step, keeping both end points.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfiguration`] if `step` is not positive.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn densify(&self, step: f64) -> GridResult<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(GridError::invalid_configuration(format!(
                "densify step must be positive, got {step}"
            )));
        }
        let first = self.md[0];
        let last = self.md[self.md.len() - 1];
        let count = ((last - first) / step).floor() as usize;

        let mut md: Vec<f64> = (0..=count)
            .map(|n| (first + step * n as f64).min(last))
            .collect();
        if md.last().is_some_and(|&d| last - d > step * 1e-9) {
            md.push(last);
        }
        let points = md
            .iter()
            .filter_map(|&d| self.point_at_md(d))
            .collect::<Vec<_>>();
        let mut path = Self::with_measured_depth(points, md)?;
        path.name.clone_from(&self.name);
        Ok(path)
    }
}

fn check_points(points: &[Point3<f64>]) -> GridResult<()> {
    if points.is_empty() {
        return Err(GridError::invalid_well_path("a well path needs at least one point"));
    }
    if points
        .iter()
        .any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    {
        return Err(GridError::invalid_well_path("coordinates must be finite"));
    }
    Ok(())
}

fn cumulative_lengths(points: &[Point3<f64>]) -> Vec<f64> {
    let mut md = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    md.push(acc);
    for pair in points.windows(2) {
        acc += (pair[1] - pair[0]).norm();
        md.push(acc);
    }
    md
}

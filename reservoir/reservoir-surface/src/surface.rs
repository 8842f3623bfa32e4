//! Rotated regular-raster surfaces.
//!
//! Node `(i, j)` lies at `origin + R(rotation) * (i * xinc, j * yinc)` where
//! `R` rotates counter-clockwise around the origin. Values are stored with
//! `i` fastest (`i + ncol * j`).

#![allow(clippy::cast_precision_loss)]

use nalgebra::Point3;
use reservoir_types::{is_undef, Aabb, UNDEF};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SurfaceError, SurfaceResult};

/// Local coordinates within this distance of a node (in node units) snap to it.
const NODE_SNAP: f64 = 1e-9;

/// Result of a surface lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceSample {
    /// The point lies outside the raster.
    Outside,
    /// The point lies inside, but a contributing node is undefined.
    Undefined,
    /// Interpolated value.
    Value(f64),
}

impl SurfaceSample {
    /// The value, if defined.
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Outside | Self::Undefined => None,
        }
    }

    /// Whether the point was outside the raster.
    #[must_use]
    pub const fn is_outside(self) -> bool {
        matches!(self, Self::Outside)
    }
}

/// A rotated regular surface with bilinear lookup.
///
/// # Example
///
/// ```
/// use reservoir_surface::RegularSurface;
///
/// let surf = RegularSurface::try_new(
///     0.0, 0.0, 10.0, 10.0, 3, 2, 0.0,
///     vec![100.0, 110.0, 120.0, 100.0, 110.0, 120.0],
/// )
/// .unwrap();
///
/// assert_eq!(surf.value_at(10.0, 0.0), Some(110.0));
/// assert_eq!(surf.value_at(15.0, 5.0), Some(115.0));
/// assert_eq!(surf.value_at(25.0, 0.0), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegularSurface {
    xori: f64,
    yori: f64,
    xinc: f64,
    yinc: f64,
    ncol: usize,
    nrow: usize,
    rotation: f64,
    values: Vec<f64>,
}

impl RegularSurface {
    /// Create a surface.
    ///
    /// `rotation` is in degrees counter-clockwise, in `[0, 360)`.
    ///
    /// # Errors
    ///
    /// - [`SurfaceError::InvalidSpacing`] if `xinc` or `yinc` is not positive.
    /// - [`SurfaceError::InvalidRotation`] if `rotation` is out of range.
    /// - [`SurfaceError::InvalidDimensions`] if `ncol` or `nrow` is zero.
    /// - [`SurfaceError::ShapeMismatch`] if `values.len() != ncol * nrow`.
    #[allow(clippy::too_many_arguments)]
    pub fn try_new(
        xori: f64,
        yori: f64,
        xinc: f64,
        yinc: f64,
        ncol: usize,
        nrow: usize,
        rotation: f64,
        values: Vec<f64>,
    ) -> SurfaceResult<Self> {
        if !(xinc.is_finite() && xinc > 0.0 && yinc.is_finite() && yinc > 0.0) {
            return Err(SurfaceError::InvalidSpacing { xinc, yinc });
        }
        if !(0.0..360.0).contains(&rotation) {
            return Err(SurfaceError::InvalidRotation(rotation));
        }
        if ncol == 0 || nrow == 0 {
            return Err(SurfaceError::InvalidDimensions { ncol, nrow });
        }
        if values.len() != ncol * nrow {
            return Err(SurfaceError::ShapeMismatch {
                expected: ncol * nrow,
                actual: values.len(),
            });
        }
        Ok(Self {
            xori,
            yori,
            xinc,
            yinc,
            ncol,
            nrow,
            rotation,
            values,
        })
    }

    /// A surface with the same geometry and every node set to `value`.
    #[must_use]
    pub fn filled(&self, value: f64) -> Self {
        Self {
            values: vec![value; self.values.len()],
            ..self.clone()
        }
    }

    /// A surface with the same geometry and new node values.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::ShapeMismatch`] if the value count differs.
    pub fn with_values(&self, values: Vec<f64>) -> SurfaceResult<Self> {
        if values.len() != self.values.len() {
            return Err(SurfaceError::ShapeMismatch {
                expected: self.values.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            values,
            ..self.clone()
        })
    }

    /// Origin x.
    #[must_use]
    pub const fn xori(&self) -> f64 {
        self.xori
    }

    /// Origin y.
    #[must_use]
    pub const fn yori(&self) -> f64 {
        self.yori
    }

    /// Spacing along the local x axis.
    #[must_use]
    pub const fn xinc(&self) -> f64 {
        self.xinc
    }

    /// Spacing along the local y axis.
    #[must_use]
    pub const fn yinc(&self) -> f64 {
        self.yinc
    }

    /// Number of nodes along the local x axis.
    #[must_use]
    pub const fn ncol(&self) -> usize {
        self.ncol
    }

    /// Number of nodes along the local y axis.
    #[must_use]
    pub const fn nrow(&self) -> usize {
        self.nrow
    }

    /// Rotation in degrees counter-clockwise.
    #[must_use]
    pub const fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Node values, `i` fastest.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Whether `other` has the same origin, spacing, dimensions and rotation.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn same_geometry(&self, other: &Self) -> bool {
        self.xori == other.xori
            && self.yori == other.yori
            && self.xinc == other.xinc
            && self.yinc == other.yinc
            && self.ncol == other.ncol
            && self.nrow == other.nrow
            && self.rotation == other.rotation
    }

    /// World `(x, y)` of node `(i, j)`.
    #[must_use]
    pub fn node_xy(&self, i: usize, j: usize) -> (f64, f64) {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let lx = i as f64 * self.xinc;
        let ly = j as f64 * self.yinc;
        (
            self.xori + lx * cos - ly * sin,
            self.yori + lx * sin + ly * cos,
        )
    }

    /// Value at node `(i, j)`, `None` if undefined or out of range.
    #[must_use]
    pub fn node_value(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.ncol || j >= self.nrow {
            return None;
        }
        Some(self.values[i + self.ncol * j]).filter(|&v| !is_undef(v))
    }

    /// World `(x, y)` of every node, in value order.
    #[must_use]
    pub fn xy_values(&self) -> Vec<(f64, f64)> {
        (0..self.nrow)
            .flat_map(|j| (0..self.ncol).map(move |i| (i, j)))
            .map(|(i, j)| self.node_xy(i, j))
            .collect()
    }

    /// Defined nodes as `(x, y, value)` points.
    #[must_use]
    pub fn to_points(&self) -> Vec<Point3<f64>> {
        self.xy_values()
            .into_iter()
            .zip(&self.values)
            .filter(|(_, v)| !is_undef(**v))
            .map(|((x, y), &v)| Point3::new(x, y, v))
            .collect()
    }

    /// Number of undefined nodes.
    #[must_use]
    pub fn undefined_count(&self) -> usize {
        self.values.iter().filter(|&&v| is_undef(v)).count()
    }

    /// Bounding box of the raster footprint in x and y, and of the defined
    /// values in z. With no defined node the z range is empty.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for (i, j) in [
            (0, 0),
            (self.ncol - 1, 0),
            (0, self.nrow - 1),
            (self.ncol - 1, self.nrow - 1),
        ] {
            let (x, y) = self.node_xy(i, j);
            aabb.min.x = aabb.min.x.min(x);
            aabb.min.y = aabb.min.y.min(y);
            aabb.max.x = aabb.max.x.max(x);
            aabb.max.y = aabb.max.y.max(y);
        }
        for &v in self.values.iter().filter(|v| !is_undef(**v)) {
            aabb.min.z = aabb.min.z.min(v);
            aabb.max.z = aabb.max.z.max(v);
        }
        aabb
    }

    /// Bilinear value at world `(x, y)`.
    ///
    /// Returns `None` outside the raster or when a contributing node is
    /// undefined. A point on a node returns that node's value unchanged.
    #[must_use]
    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        self.sample(x, y).value()
    }

    /// Bilinear lookup that tells outside and undefined apart.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> SurfaceSample {
        let (u, v) = self.local(x, y);
        let umax = (self.ncol - 1) as f64;
        let vmax = (self.nrow - 1) as f64;
        if !(u >= -NODE_SNAP && u <= umax + NODE_SNAP && v >= -NODE_SNAP && v <= vmax + NODE_SNAP)
        {
            return SurfaceSample::Outside;
        }

        let (i0, fu) = cell_and_fraction(u.clamp(0.0, umax), self.ncol);
        let (j0, fv) = cell_and_fraction(v.clamp(0.0, vmax), self.nrow);

        let mut acc = 0.0;
        for (di, dj, w) in [
            (0, 0, (1.0 - fu) * (1.0 - fv)),
            (1, 0, fu * (1.0 - fv)),
            (0, 1, (1.0 - fu) * fv),
            (1, 1, fu * fv),
        ] {
            if w == 0.0 {
                continue;
            }
            let z = self.values[(i0 + di) + self.ncol * (j0 + dj)];
            if is_undef(z) {
                return SurfaceSample::Undefined;
            }
            acc += w * z;
        }
        SurfaceSample::Value(acc)
    }

    /// Values at many points, [`UNDEF`] where the lookup fails.
    #[must_use]
    pub fn values_at(&self, points: &[(f64, f64)]) -> Vec<f64> {
        points
            .iter()
            .map(|&(x, y)| self.value_at(x, y).unwrap_or(UNDEF))
            .collect()
    }

    /// World `(x, y)` to fractional node coordinates `(u, v)`.
    fn local(&self, x: f64, y: f64) -> (f64, f64) {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let dx = x - self.xori;
        let dy = y - self.yori;
        (
            (dx * cos + dy * sin) / self.xinc,
            (-dx * sin + dy * cos) / self.yinc,
        )
    }
}

/// Lower node index and fraction for fractional coordinate `t` on `n` nodes.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cell_and_fraction(t: f64, n: usize) -> (usize, f64) {
    if n < 2 {
        return (0, 0.0);
    }
    let i = (t.floor() as usize).min(n - 2);
    let mut f = t - i as f64;
    if f < NODE_SNAP {
        f = 0.0;
    } else if f > 1.0 - NODE_SNAP {
        f = 1.0;
    }
    (i, f)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plane(rotation: f64) -> RegularSurface {
        // z = 1000 + 2 * i + 10 * j
        let (ncol, nrow) = (4, 3);
        let values = (0..nrow)
            .flat_map(|j| (0..ncol).map(move |i| 1000.0 + 2.0 * f64::from(i) + 10.0 * f64::from(j)))
            .collect();
        RegularSurface::try_new(500.0, 800.0, 25.0, 50.0, 4, 3, rotation, values).unwrap()
    }

    #[test]
    fn test_validation() {
        let ok = |xinc, rot, n, len| {
            RegularSurface::try_new(0.0, 0.0, xinc, 1.0, n, 1, rot, vec![0.0; len])
        };
        assert!(ok(1.0, 0.0, 2, 2).is_ok());
        assert!(matches!(ok(0.0, 0.0, 2, 2), Err(SurfaceError::InvalidSpacing { .. })));
        assert!(matches!(ok(f64::NAN, 0.0, 2, 2), Err(SurfaceError::InvalidSpacing { .. })));
        assert!(matches!(ok(1.0, 360.0, 2, 2), Err(SurfaceError::InvalidRotation(_))));
        assert!(matches!(ok(1.0, -1.0, 2, 2), Err(SurfaceError::InvalidRotation(_))));
        assert!(matches!(ok(1.0, 0.0, 0, 0), Err(SurfaceError::InvalidDimensions { .. })));
        assert!(ok(1.0, 0.0, 2, 3).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn test_exact_nodes_unrotated() {
        let surf = plane(0.0);
        for j in 0..3 {
            for i in 0..4 {
                let (x, y) = surf.node_xy(i, j);
                assert_eq!(surf.value_at(x, y), surf.node_value(i, j));
            }
        }
    }

    #[test]
    fn test_exact_nodes_rotated() {
        let surf = plane(30.0);
        for j in 0..3 {
            for i in 0..4 {
                let (x, y) = surf.node_xy(i, j);
                assert_eq!(surf.value_at(x, y), surf.node_value(i, j));
            }
        }
    }

    #[test]
    fn test_bilinear_reproduces_plane() {
        let surf = plane(0.0);
        // Local (1.5, 0.25) in node units.
        let z = surf.value_at(500.0 + 37.5, 800.0 + 12.5).unwrap();
        assert_relative_eq!(z, 1000.0 + 3.0 + 2.5, epsilon = 1e-9);

        let surf = plane(90.0);
        // Rotated 90 degrees: local x points along world +y.
        let z = surf.value_at(500.0 - 25.0, 800.0 + 50.0).unwrap();
        assert_relative_eq!(z, 1000.0 + 4.0 + 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_outside() {
        let surf = plane(0.0);
        assert_eq!(surf.sample(499.0, 800.0), SurfaceSample::Outside);
        assert_eq!(surf.sample(500.0 + 75.1, 800.0), SurfaceSample::Outside);
        assert_eq!(surf.sample(f64::NAN, 800.0), SurfaceSample::Outside);
        assert!(surf.value_at(500.0 + 75.0, 800.0 + 100.0).is_some());
    }

    #[test]
    fn test_undefined_propagation() {
        let surf = plane(0.0);
        let mut values = surf.values().to_vec();
        values[1 + 4] = UNDEF; // node (1, 1)
        let surf = surf.with_values(values).unwrap();

        assert_eq!(surf.sample(500.0 + 37.5, 800.0 + 75.0), SurfaceSample::Undefined);
        assert_eq!(surf.value_at(500.0 + 25.0, 800.0 + 50.0), None);
        // Neighbour node exactly: zero weight on (1, 1).
        assert_eq!(surf.value_at(500.0 + 50.0, 800.0 + 50.0), Some(1014.0));
        // Cell not touching (1, 1).
        assert!(surf.value_at(500.0 + 62.5, 800.0 + 25.0).is_some());
        assert!(surf.value_at(500.0 + 62.5, 800.0 + 75.0).is_some());
        assert_eq!(surf.undefined_count(), 1);
        assert_eq!(surf.to_points().len(), 11);
    }

    #[test]
    fn test_single_row_surface() {
        let surf = RegularSurface::try_new(0.0, 0.0, 1.0, 1.0, 3, 1, 0.0, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(surf.value_at(1.5, 0.0), Some(2.5));
        assert_eq!(surf.value_at(1.5, 0.5), None);
    }

    #[test]
    fn test_xy_values_and_bounds() {
        let surf = plane(0.0);
        let xy = surf.xy_values();
        assert_eq!(xy.len(), 12);
        assert_eq!(xy[5], (525.0, 850.0));
        let b = surf.bounds();
        assert_relative_eq!(b.min.x, 500.0);
        assert_relative_eq!(b.max.y, 900.0);
        assert_relative_eq!(b.max.z, 1026.0);
        assert!(surf.same_geometry(&surf.filled(UNDEF)));
        assert_eq!(surf.filled(UNDEF).undefined_count(), 12);
        assert!(surf.with_values(vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_values_at() {
        let surf = plane(0.0);
        let out = surf.values_at(&[(500.0, 800.0), (0.0, 0.0)]);
        assert_eq!(out, vec![1000.0, UNDEF]);
    }
}

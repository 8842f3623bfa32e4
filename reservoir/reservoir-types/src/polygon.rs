//! Closed plan-view polygons.

use nalgebra::{Point2, Point3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::error::{GridError, GridResult};

/// A closed polygon in the `(x, y)` plane.
///
/// The closing edge from the last vertex back to the first is implicit; a
/// repeated first vertex at the end is dropped.
///
/// # Example
///
/// ```
/// use reservoir_types::Polygon;
///
/// let square = Polygon::try_new(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
///     .unwrap();
/// assert!(square.contains_xy(5.0, 5.0));
/// assert!(square.contains_xy(10.0, 5.0));
/// assert!(!square.contains_xy(15.0, 5.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon {
    vertices: Vec<Point2<f64>>,
}

impl Polygon {
    /// Create a polygon from `(x, y)` vertices.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfiguration`] if fewer than three distinct
    /// vertices remain or a coordinate is not finite.
    pub fn try_new(vertices: Vec<(f64, f64)>) -> GridResult<Self> {
        let mut vertices: Vec<Point2<f64>> =
            vertices.into_iter().map(|(x, y)| Point2::new(x, y)).collect();
        if vertices.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(GridError::invalid_configuration(
                "polygon coordinates must be finite",
            ));
        }
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(GridError::invalid_configuration(format!(
                "a polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        Ok(Self { vertices })
    }

    /// The vertices, without the closing repeat.
    #[must_use]
    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    /// Plan-view bounding box; the z range is unbounded.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for v in &self.vertices {
            aabb.expand_to_include(&Point3::new(v.x, v.y, 0.0));
        }
        aabb.min.z = f64::NEG_INFINITY;
        aabb.max.z = f64::INFINITY;
        aabb
    }

    /// Whether `(x, y)` lies inside or on the boundary (even-odd rule).
    #[must_use]
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        let p = Point2::new(x, y);
        let n = self.vertices.len();
        let mut inside = false;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            if on_segment(&p, &a, &b) {
                return true;
            }
            if (a.y > p.y) != (b.y > p.y) {
                let t = (p.y - a.y) / (b.y - a.y);
                if p.x < a.x + t * (b.x - a.x) {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn on_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> bool {
    let ab = b - a;
    let ap = p - a;
    let len2 = ab.norm_squared();
    let cross = ab.x * ap.y - ab.y * ap.x;
    if cross.abs() > 1e-12 * len2.max(1.0) {
        return false;
    }
    let t = ab.dot(&ap);
    t >= 0.0 && t <= len2
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn ell() -> Polygon {
        // An L shape: the square [0, 20]^2 minus [10, 20]^2.
        Polygon::try_new(vec![
            (0.0, 0.0),
            (20.0, 0.0),
            (20.0, 10.0),
            (10.0, 10.0),
            (10.0, 20.0),
            (0.0, 20.0),
            (0.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_closing_vertex_dropped() {
        assert_eq!(ell().vertices().len(), 6);
    }

    #[test]
    fn test_contains_concave() {
        let poly = ell();
        assert!(poly.contains_xy(5.0, 5.0));
        assert!(poly.contains_xy(15.0, 5.0));
        assert!(poly.contains_xy(5.0, 15.0));
        assert!(!poly.contains_xy(15.0, 15.0));
        assert!(!poly.contains_xy(-1.0, 5.0));
        // Boundary points, including the reflex corner.
        assert!(poly.contains_xy(0.0, 7.0));
        assert!(poly.contains_xy(10.0, 10.0));
        assert!(poly.contains_xy(15.0, 10.0));
    }

    #[test]
    fn test_bounds_unbounded_in_z() {
        let b = ell().bounds();
        assert_eq!(b.min.x, 0.0);
        assert_eq!(b.max.y, 20.0);
        assert!(b.contains_z(1e12, 0.0));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Polygon::try_new(vec![(0.0, 0.0), (1.0, 0.0)]).is_err());
        assert!(Polygon::try_new(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]).is_err());
        assert!(Polygon::try_new(vec![(0.0, 0.0), (1.0, f64::NAN), (1.0, 1.0)]).is_err());
    }
}

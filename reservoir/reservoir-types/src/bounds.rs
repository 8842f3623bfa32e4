//! Axis-aligned bounding boxes.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in world coordinates.
///
/// # Example
///
/// ```
/// use reservoir_types::{Aabb, Point3};
///
/// let aabb = Aabb::new(Point3::new(0.0, 0.0, 1000.0), Point3::new(50.0, 50.0, 1010.0));
///
/// assert!(aabb.contains(&Point3::new(25.0, 25.0, 1005.0)));
/// assert!(!aabb.contains(&Point3::new(25.0, 25.0, 990.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3<f64>,
    /// Maximum corner of the bounding box.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates a new AABB from two opposite corners.
    ///
    /// The corners are reordered per axis if necessary.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates an empty (inverted) AABB, the identity for [`Aabb::union`].
    ///
    /// # Example
    ///
    /// ```
    /// use reservoir_types::{Aabb, Point3};
    ///
    /// let mut aabb = Aabb::empty();
    /// assert!(aabb.is_empty());
    /// aabb.expand_to_include(&Point3::new(1.0, 2.0, 3.0));
    /// assert!(!aabb.is_empty());
    /// ```
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Creates the smallest AABB containing all `points`.
    ///
    /// Returns an empty AABB when `points` is empty.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand_to_include(p);
        }
        aabb
    }

    /// Returns true if this box contains no point (min > max on some axis).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns the center point of the AABB.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the full size (dimensions) of the AABB.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Returns the largest extent over the three axes.
    #[must_use]
    pub fn max_extent(&self) -> f64 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }

    /// Checks if a point is inside the AABB.
    ///
    /// Points on the boundary are considered inside.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        self.contains_with_tolerance(point, 0.0)
    }

    /// Checks if a point is inside the AABB grown by `tolerance` on every side.
    #[must_use]
    pub fn contains_with_tolerance(&self, point: &Point3<f64>, tolerance: f64) -> bool {
        point.x >= self.min.x - tolerance
            && point.x <= self.max.x + tolerance
            && point.y >= self.min.y - tolerance
            && point.y <= self.max.y + tolerance
            && point.z >= self.min.z - tolerance
            && point.z <= self.max.z + tolerance
    }

    /// Checks if `(x, y)` lies inside the plan-view footprint of the AABB.
    #[must_use]
    pub fn contains_xy(&self, x: f64, y: f64, tolerance: f64) -> bool {
        x >= self.min.x - tolerance
            && x <= self.max.x + tolerance
            && y >= self.min.y - tolerance
            && y <= self.max.y + tolerance
    }

    /// Checks if `z` lies inside the vertical range of the AABB.
    #[must_use]
    pub fn contains_z(&self, z: f64, tolerance: f64) -> bool {
        z >= self.min.z - tolerance && z <= self.max.z + tolerance
    }

    /// Checks if this AABB intersects another AABB.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Expands this AABB to include a point.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Returns a new AABB that is the union of this AABB and another.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_reorders() {
        let aabb = Aabb::new(Point3::new(10.0, 0.0, 5.0), Point3::new(0.0, 10.0, 1.0));
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.max, Point3::new(10.0, 10.0, 5.0));
    }

    #[test]
    fn test_from_points() {
        let pts = [
            Point3::new(1.0, -2.0, 3.0),
            Point3::new(-1.0, 4.0, 0.5),
            Point3::new(0.0, 0.0, 9.0),
        ];
        let aabb = Aabb::from_points(&pts);
        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, 0.5));
        assert_eq!(aabb.max, Point3::new(1.0, 4.0, 9.0));
        assert_relative_eq!(aabb.max_extent(), 8.5);
    }

    #[test]
    fn test_empty_union_identity() {
        let a = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(Aabb::empty().union(&a), a);
        assert!(Aabb::from_points(&[]).is_empty());
    }

    #[test]
    fn test_contains_boundary_and_tolerance() {
        let a = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert!(a.contains(&Point3::new(1.0, 1.0, 1.0)));
        assert!(!a.contains(&Point3::new(1.0 + 1e-6, 0.5, 0.5)));
        assert!(a.contains_with_tolerance(&Point3::new(1.0 + 1e-6, 0.5, 0.5), 1e-5));
        assert!(a.contains_xy(0.5, 0.5, 0.0));
        assert!(!a.contains_z(2.0, 0.5));
    }

    #[test]
    fn test_intersects() {
        let a = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 2.0, 2.0));
        let c = Aabb::new(Point3::new(3.0, 3.0, 3.0), Point3::new(4.0, 4.0, 4.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_relative_eq!(a.center().x, 0.5);
    }
}

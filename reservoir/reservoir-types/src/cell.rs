//! Geometry of a single corner-point cell.
//!
//! A cell is a hexahedron given by eight corners in a fixed winding order.
//! Corner `c` sits at offset `(c & 1, (c >> 1) & 1, (c >> 2) & 1)` along
//! `(i, j, k)`:
//!
//! ```text
//!   top (k)            base (k + 1)
//!   2 ------- 3        6 ------- 7
//!   |         |        |         |
//!   |         |        |         |
//!   0 ------- 1        4 ------- 5
//! ```
//!
//! Volume and the inside test both use the Kuhn decomposition into six
//! tetrahedra around a main diagonal. Every tetrahedron follows a monotone
//! corner path `d -> a -> a|b -> d^7`, so neighbouring cells split their
//! shared faces along the same diagonal and the tetrahedra of a grid tile
//! space without gaps or overlaps.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;

/// Index triple of a grid cell (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellIjk {
    /// Column index along i.
    pub i: usize,
    /// Row index along j.
    pub j: usize,
    /// Layer index along k (0 is the top layer).
    pub k: usize,
}

impl CellIjk {
    /// Create a new index triple.
    #[must_use]
    pub const fn new(i: usize, j: usize, k: usize) -> Self {
        Self { i, j, k }
    }
}

impl From<(usize, usize, usize)> for CellIjk {
    fn from((i, j, k): (usize, usize, usize)) -> Self {
        Self::new(i, j, k)
    }
}

impl From<CellIjk> for (usize, usize, usize) {
    fn from(ijk: CellIjk) -> Self {
        (ijk.i, ijk.j, ijk.k)
    }
}

/// One of the four main diagonals of a hexahedral cell, named by its corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MainDiagonal {
    /// Corner 0 to corner 7.
    D07,
    /// Corner 1 to corner 6.
    D16,
    /// Corner 2 to corner 5.
    D25,
    /// Corner 3 to corner 4.
    D34,
}

impl MainDiagonal {
    /// All four main diagonals.
    pub const ALL: [Self; 4] = [Self::D07, Self::D16, Self::D25, Self::D34];

    const fn start(self) -> usize {
        match self {
            Self::D07 => 0,
            Self::D16 => 1,
            Self::D25 => 2,
            Self::D34 => 3,
        }
    }
}

/// Positively oriented Kuhn tetrahedra around diagonal 0-7.
const KUHN_TETS: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 5, 1, 7],
    [0, 3, 2, 7],
    [0, 6, 4, 7],
];

/// Corner indices of the six tetrahedra around `diagonal`, positively oriented
/// for a right-handed cell.
#[must_use]
pub fn tetrahedra_about(diagonal: MainDiagonal) -> [[usize; 4]; 6] {
    let mask = diagonal.start();
    let mirrored = mask.count_ones() % 2 == 1;
    let mut out = KUHN_TETS;
    for tet in &mut out {
        for c in tet.iter_mut() {
            *c ^= mask;
        }
        if mirrored {
            tet.swap(1, 2);
        }
    }
    out
}

/// Signed volume of the tetrahedron `(a, b, c, d)`.
#[inline]
#[must_use]
pub fn tetrahedron_volume(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> f64 {
    (b - a).dot(&(c - a).cross(&(d - a))) / 6.0
}

/// Geometry of one corner-point cell, computed on demand from the grid.
///
/// # Example
///
/// ```
/// use reservoir_types::{CellGeometry, CellIjk, Point3};
///
/// let cell = CellGeometry::from_box(
///     CellIjk::new(0, 0, 0),
///     Point3::new(0.0, 0.0, 100.0),
///     Point3::new(1.0, 1.0, 101.0),
/// );
/// assert!((cell.volume() - 1.0).abs() < 1e-12);
/// assert!(cell.contains(&Point3::new(0.5, 0.5, 100.5), 1e-9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellGeometry {
    /// Index of the cell in its grid.
    pub ijk: CellIjk,
    /// The eight corners in fixed winding order.
    pub corners: [Point3<f64>; 8],
}

impl CellGeometry {
    /// Create a cell from its corners.
    #[must_use]
    pub const fn new(ijk: CellIjk, corners: [Point3<f64>; 8]) -> Self {
        Self { ijk, corners }
    }

    /// Create an axis-aligned box cell spanning `min` (top, SW) to `max` (base, NE).
    #[must_use]
    pub fn from_box(ijk: CellIjk, min: Point3<f64>, max: Point3<f64>) -> Self {
        let mut corners = [Point3::origin(); 8];
        for (c, corner) in corners.iter_mut().enumerate() {
            *corner = Point3::new(
                if c & 1 == 0 { min.x } else { max.x },
                if c & 2 == 0 { min.y } else { max.y },
                if c & 4 == 0 { min.z } else { max.z },
            );
        }
        Self { ijk, corners }
    }

    /// Mean of the eight corners.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        mean(&self.corners)
    }

    /// Mean of the four top corners.
    #[must_use]
    pub fn top_center(&self) -> Point3<f64> {
        mean(&self.corners[..4])
    }

    /// Mean of the four base corners.
    #[must_use]
    pub fn base_center(&self) -> Point3<f64> {
        mean(&self.corners[4..])
    }

    /// Axis-aligned bounding box of the corners.
    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.corners)
    }

    /// The six tetrahedra around `diagonal` as corner points.
    #[must_use]
    pub fn tetrahedra(&self, diagonal: MainDiagonal) -> [[Point3<f64>; 4]; 6] {
        tetrahedra_about(diagonal).map(|t| t.map(|c| self.corners[c]))
    }

    /// Signed volume from the decomposition around diagonal 0-7.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.signed_volume_about(MainDiagonal::D07)
    }

    /// Signed volume from the decomposition around `diagonal`.
    ///
    /// For cells with planar faces every diagonal gives the same value.
    #[must_use]
    pub fn signed_volume_about(&self, diagonal: MainDiagonal) -> f64 {
        self.tetrahedra(diagonal)
            .iter()
            .map(|[a, b, c, d]| tetrahedron_volume(a, b, c, d))
            .sum()
    }

    /// Cell volume: the mean of the four diagonal decompositions.
    ///
    /// Negative for inverted cells.
    #[must_use]
    pub fn volume(&self) -> f64 {
        MainDiagonal::ALL
            .iter()
            .map(|&d| self.signed_volume_about(d))
            .sum::<f64>()
            / 4.0
    }

    /// Whether the cell is degenerate under relative tolerance `epsilon`.
    ///
    /// A cell is degenerate if a corner is not finite, if its bounding box
    /// has no extent, or if its volume is at or below `epsilon * s^3` where
    /// `s` is the largest extent of the bounding box.
    #[must_use]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        if self
            .corners
            .iter()
            .any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return true;
        }
        let scale = self.bounding_box().max_extent();
        if scale <= 0.0 {
            return true;
        }
        self.volume() <= epsilon * scale.powi(3)
    }

    /// Whether `point` lies inside the cell.
    ///
    /// The point must lie in at least one tetrahedron of the 0-7
    /// decomposition, with every barycentric coordinate at or above
    /// `-tolerance`. Points on a shared face are inside both cells.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>, tolerance: f64) -> bool {
        let scale = self.bounding_box().max_extent();
        let min_volume = f64::EPSILON * scale.powi(3);
        self.tetrahedra(MainDiagonal::D07)
            .iter()
            .any(|tet| barycentric_inside(tet, point, tolerance, min_volume))
    }

    /// Point at local coordinates `(u, v, w)` in `[0, 1]^3` by trilinear
    /// interpolation of the corners.
    #[must_use]
    pub fn interpolate(&self, u: f64, v: f64, w: f64) -> Point3<f64> {
        let mut acc = Vector3::zeros();
        for (c, corner) in self.corners.iter().enumerate() {
            let wu = if c & 1 == 0 { 1.0 - u } else { u };
            let wv = if c & 2 == 0 { 1.0 - v } else { v };
            let ww = if c & 4 == 0 { 1.0 - w } else { w };
            acc += corner.coords * (wu * wv * ww);
        }
        Point3::from(acc)
    }

    /// Mean vertical thickness along the four pillars.
    #[must_use]
    pub fn dz(&self) -> f64 {
        (0..4)
            .map(|c| self.corners[c + 4].z - self.corners[c].z)
            .sum::<f64>()
            / 4.0
    }

    /// Mean horizontal length of the four edges along i.
    #[must_use]
    pub fn dx(&self) -> f64 {
        self.mean_horizontal_edge(&[(0, 1), (2, 3), (4, 5), (6, 7)])
    }

    /// Mean horizontal length of the four edges along j.
    #[must_use]
    pub fn dy(&self) -> f64 {
        self.mean_horizontal_edge(&[(0, 2), (1, 3), (4, 6), (5, 7)])
    }

    fn mean_horizontal_edge(&self, edges: &[(usize, usize); 4]) -> f64 {
        edges
            .iter()
            .map(|&(a, b)| {
                let d = self.corners[b] - self.corners[a];
                d.x.hypot(d.y)
            })
            .sum::<f64>()
            / 4.0
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(points: &[Point3<f64>]) -> Point3<f64> {
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Point3::from(sum / points.len() as f64)
}

fn barycentric_inside(
    tet: &[Point3<f64>; 4],
    p: &Point3<f64>,
    tolerance: f64,
    min_volume: f64,
) -> bool {
    let [a, b, c, d] = tet;
    let total = tetrahedron_volume(a, b, c, d);
    if total.abs() <= min_volume {
        return false;
    }
    let lambdas = [
        tetrahedron_volume(p, b, c, d),
        tetrahedron_volume(a, p, c, d),
        tetrahedron_volume(a, b, p, d),
        tetrahedron_volume(a, b, c, p),
    ];
    lambdas.iter().all(|l| l / total >= -tolerance)
}

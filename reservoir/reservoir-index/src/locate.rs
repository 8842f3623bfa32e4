//! Point location in corner-point grids.

use nalgebra::Point3;
use rayon::prelude::*;
use reservoir_types::{CellIjk, CornerPointGrid, GridError, GridResult};
use tracing::debug;

use crate::index::CellIndex;

/// Outcome of locating a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// The point lies in this cell.
    Found(CellIjk),
    /// No searchable cell contains the point.
    Outside,
    /// No searchable cell contains the point, but a degenerate cell covers it.
    Degenerate,
}

impl Location {
    /// The containing cell, if found.
    #[must_use]
    pub const fn cell(self) -> Option<CellIjk> {
        match self {
            Self::Found(ijk) => Some(ijk),
            Self::Outside | Self::Degenerate => None,
        }
    }

    /// Whether a cell was found.
    #[must_use]
    pub const fn is_found(self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Finds the cell containing a point.
///
/// Candidates from the [`CellIndex`] are tested top to bottom with the
/// tetrahedral inside test; the first hit wins. A point on the face between
/// layers `k` and `k + 1` therefore resolves to `k`.
///
/// # Example
///
/// ```
/// use reservoir_index::{CellIndex, PointLocator};
/// use reservoir_types::{CellIjk, CornerPointGrid, GeometryConfig, Point3, Vector3};
///
/// let grid = CornerPointGrid::from_box(
///     (1, 1, 2).into(),
///     Point3::new(0.0, 0.0, 90.0),
///     Vector3::new(10.0, 10.0, 10.0),
/// )
/// .unwrap();
/// let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
/// let locator = PointLocator::new(&grid, &index).unwrap();
///
/// assert_eq!(locator.locate(&Point3::new(5.0, 5.0, 100.0)), Some(CellIjk::new(0, 0, 0)));
/// assert_eq!(locator.locate(&Point3::new(5.0, 5.0, 150.0)), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PointLocator<'a> {
    grid: &'a CornerPointGrid,
    index: &'a CellIndex,
}

impl<'a> PointLocator<'a> {
    /// Create a locator over `grid` using an index built from it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] if the index was built for a grid
    /// of other dimensions.
    pub fn new(grid: &'a CornerPointGrid, index: &'a CellIndex) -> GridResult<Self> {
        if grid.dims() != index.dims() {
            return Err(GridError::shape_mismatch(
                "index",
                grid.cell_count(),
                index.dims().cell_count(),
            ));
        }
        Ok(Self { grid, index })
    }

    /// The grid being searched.
    #[must_use]
    pub const fn grid(&self) -> &'a CornerPointGrid {
        self.grid
    }

    /// The index used for candidate lookup.
    #[must_use]
    pub const fn index(&self) -> &'a CellIndex {
        self.index
    }

    /// The first cell, top to bottom, that contains `point`.
    #[must_use]
    pub fn locate(&self, point: &Point3<f64>) -> Option<CellIjk> {
        let tolerance = self.index.config().contain_tolerance;
        self.index
            .candidates(point)
            .into_iter()
            .find(|&ijk| self.grid.cell(ijk).contains(point, tolerance))
    }

    /// Like [`locate`](Self::locate), but tells apart points covered only
    /// by degenerate cells.
    #[must_use]
    pub fn locate_detailed(&self, point: &Point3<f64>) -> Location {
        match self.locate(point) {
            Some(ijk) => Location::Found(ijk),
            None if self.index.degenerate_hit(point) => Location::Degenerate,
            None => Location::Outside,
        }
    }

    /// Locate many points; output order follows input order.
    #[must_use]
    pub fn locate_all(&self, points: &[Point3<f64>], parallel: bool) -> Vec<Option<CellIjk>> {
        debug!(points = points.len(), parallel, "Locating points");
        if parallel {
            points.par_iter().map(|p| self.locate(p)).collect()
        } else {
            points.iter().map(|p| self.locate(p)).collect()
        }
    }

    /// [`locate_detailed`](Self::locate_detailed) for many points.
    #[must_use]
    pub fn locate_all_detailed(&self, points: &[Point3<f64>], parallel: bool) -> Vec<Location> {
        debug!(points = points.len(), parallel, "Locating points");
        if parallel {
            points.par_iter().map(|p| self.locate_detailed(p)).collect()
        } else {
            points.iter().map(|p| self.locate_detailed(p)).collect()
        }
    }

    /// The `(i, j)` column whose shallowest searchable cell has a top face
    /// covering `(x, y)` in plan view.
    #[must_use]
    pub fn locate_column(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let tolerance = self.index.config().contain_tolerance;
        self.index
            .column_candidates(x, y)
            .into_iter()
            .find(|&ijk| {
                let c = self.grid.cell_corners(ijk);
                in_triangle_xy(x, y, &c[0], &c[1], &c[3], tolerance)
                    || in_triangle_xy(x, y, &c[0], &c[3], &c[2], tolerance)
            })
            .map(|ijk| (ijk.i, ijk.j))
    }
}

/// Plan-view barycentric test; orientation independent.
fn in_triangle_xy(
    x: f64,
    y: f64,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    tolerance: f64,
) -> bool {
    let det = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
    let scale = (b - a).xy().norm_squared().max((c - a).xy().norm_squared());
    if det.abs() <= f64::EPSILON * scale {
        return false;
    }
    let l1 = ((x - a.x) * (c.y - a.y) - (c.x - a.x) * (y - a.y)) / det;
    let l2 = ((b.x - a.x) * (y - a.y) - (x - a.x) * (b.y - a.y)) / det;
    let l0 = 1.0 - l1 - l2;
    l0 >= -tolerance && l1 >= -tolerance && l2 >= -tolerance
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use reservoir_types::{GeometryConfig, GridDims};

    fn box_grid(ncol: usize, nrow: usize, nlay: usize) -> CornerPointGrid {
        CornerPointGrid::from_box(
            GridDims::new(ncol, nrow, nlay),
            Point3::new(0.0, 0.0, 90.0),
            Vector3::new(10.0, 10.0, 10.0),
        )
        .unwrap()
    }

    #[test]
    fn test_locate_interior_points() {
        let grid = box_grid(3, 2, 2);
        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        let locator = PointLocator::new(&grid, &index).unwrap();
        for cell in grid.cells() {
            assert_eq!(locator.locate(&cell.center()), Some(cell.ijk));
        }
    }

    #[test]
    fn test_shared_face_resolves_to_upper_layer() {
        let grid = box_grid(1, 1, 2);
        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        let locator = PointLocator::new(&grid, &index).unwrap();
        let p = Point3::new(5.0, 5.0, 100.0);
        assert_eq!(locator.locate(&p), Some(CellIjk::new(0, 0, 0)));
        assert_eq!(locator.locate_detailed(&p), Location::Found(CellIjk::new(0, 0, 0)));
    }

    #[test]
    fn test_outside_and_degenerate() {
        let grid = box_grid(1, 1, 2);
        let mut zcorn = grid.zcorn().to_vec();
        // Collapse the whole of layer 0 onto z = 100.
        for c in 0..4 {
            zcorn[c] = 100.0;
        }
        let grid =
            CornerPointGrid::try_new(grid.dims(), grid.coord().to_vec(), zcorn, grid.actnum().to_vec())
                .unwrap();
        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        let locator = PointLocator::new(&grid, &index).unwrap();

        assert_eq!(locator.locate_detailed(&Point3::new(50.0, 5.0, 105.0)), Location::Outside);
        assert_eq!(
            locator.locate_detailed(&Point3::new(5.0, 5.0, 100.0)),
            Location::Found(CellIjk::new(0, 0, 1))
        );
        assert!(!Location::Degenerate.is_found());
        assert_eq!(Location::Outside.cell(), None);
    }

    #[test]
    fn test_degenerate_only_coverage() {
        let grid = box_grid(1, 1, 1);
        let mut zcorn = grid.zcorn().to_vec();
        // Collapse the base onto the top.
        for c in 4..8 {
            zcorn[c] = 90.0;
        }
        let grid =
            CornerPointGrid::try_new(grid.dims(), grid.coord().to_vec(), zcorn, grid.actnum().to_vec())
                .unwrap();
        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        let locator = PointLocator::new(&grid, &index).unwrap();
        assert_eq!(
            locator.locate_detailed(&Point3::new(5.0, 5.0, 90.0)),
            Location::Degenerate
        );
    }

    #[test]
    fn test_locate_all_preserves_order() {
        let grid = box_grid(4, 4, 3);
        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        let locator = PointLocator::new(&grid, &index).unwrap();
        let points: Vec<Point3<f64>> = grid.cells().map(|c| c.center()).rev().collect();
        let par = locator.locate_all(&points, true);
        let seq = locator.locate_all(&points, false);
        assert_eq!(par, seq);
        assert_eq!(par[0], Some(CellIjk::new(3, 3, 2)));
        assert_eq!(par.last().copied().flatten(), Some(CellIjk::new(0, 0, 0)));
        assert_eq!(
            locator.locate_all_detailed(&points, true)[0],
            Location::Found(CellIjk::new(3, 3, 2))
        );
    }

    #[test]
    fn test_locate_column() {
        let grid = box_grid(3, 3, 2);
        let mut actnum = grid.actnum().to_vec();
        actnum[grid.dims().index(CellIjk::new(2, 1, 0))] = false;
        let grid =
            CornerPointGrid::try_new(grid.dims(), grid.coord().to_vec(), grid.zcorn().to_vec(), actnum)
                .unwrap();
        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        let locator = PointLocator::new(&grid, &index).unwrap();

        assert_eq!(locator.locate_column(15.0, 25.0), Some((1, 2)));
        assert_eq!(locator.locate_column(25.0, 15.0), Some((2, 1)));
        assert_eq!(locator.locate_column(35.0, 15.0), None);
    }

    #[test]
    fn test_dims_mismatch_rejected() {
        let a = box_grid(2, 2, 2);
        let b = box_grid(2, 2, 1);
        let index = CellIndex::build(&b, &GeometryConfig::default()).unwrap();
        assert!(PointLocator::new(&a, &index).is_err());
    }
}

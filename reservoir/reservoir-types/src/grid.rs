//! Corner-point grid storage.
//!
//! Geometry is held in three flat arrays and every cell is derived on demand
//! by index lookup:
//!
//! - `coord`: `(ncol + 1) * (nrow + 1)` pillars, six values each
//!   (`xtop, ytop, ztop, xbot, ybot, zbot`), pillar `(pi, pj)` at
//!   `pj * (ncol + 1) + pi`.
//! - `zcorn`: eight corner depths per cell, cell-major in linear cell order.
//! - `actnum`: one active flag per cell.
//!
//! The linear cell order is `i + ncol * (j + nrow * k)` (i fastest).

#![allow(clippy::cast_precision_loss)]

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::cell::{CellGeometry, CellIjk};
use crate::error::{GridError, GridResult};
use crate::polygon::Polygon;
use crate::property::{GridProperty, PropertyValues, UNDEF};

/// Grid dimensions `(ncol, nrow, nlay)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridDims {
    /// Number of columns (i).
    pub ncol: usize,
    /// Number of rows (j).
    pub nrow: usize,
    /// Number of layers (k).
    pub nlay: usize,
}

impl GridDims {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(ncol: usize, nrow: usize, nlay: usize) -> Self {
        Self { ncol, nrow, nlay }
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.ncol * self.nrow * self.nlay
    }

    /// Number of pillars.
    #[must_use]
    pub const fn pillar_count(&self) -> usize {
        (self.ncol + 1) * (self.nrow + 1)
    }

    /// Whether `ijk` lies inside these dimensions.
    #[must_use]
    pub const fn contains(&self, ijk: CellIjk) -> bool {
        ijk.i < self.ncol && ijk.j < self.nrow && ijk.k < self.nlay
    }

    /// Linear index of `ijk`.
    #[inline]
    #[must_use]
    pub const fn index(&self, ijk: CellIjk) -> usize {
        ijk.i + self.ncol * (ijk.j + self.nrow * ijk.k)
    }

    /// Index triple of linear index `index`.
    #[inline]
    #[must_use]
    pub const fn ijk(&self, index: usize) -> CellIjk {
        let i = index % self.ncol;
        let rest = index / self.ncol;
        CellIjk::new(i, rest % self.nrow, rest / self.nrow)
    }

    fn validate(self) -> GridResult<Self> {
        if self.ncol == 0 || self.nrow == 0 || self.nlay == 0 {
            return Err(GridError::InvalidDimensions {
                ncol: self.ncol,
                nrow: self.nrow,
                nlay: self.nlay,
            });
        }
        Ok(self)
    }
}

impl From<(usize, usize, usize)> for GridDims {
    fn from((ncol, nrow, nlay): (usize, usize, usize)) -> Self {
        Self::new(ncol, nrow, nlay)
    }
}

/// Summary geometry of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridGeometrics {
    /// Top SW corner of cell `(0, 0, 0)`.
    pub origin: Point3<f64>,
    /// Bounding box of the cells considered.
    pub bounds: Aabb,
    /// Mean rotation of the i-direction, degrees counter-clockwise from x, in `[0, 360)`.
    pub avg_rotation: f64,
    /// Mean cell length along i.
    pub avg_dx: f64,
    /// Mean cell length along j.
    pub avg_dy: f64,
    /// Mean cell thickness.
    pub avg_dz: f64,
    /// Number of cells considered.
    pub cells: usize,
}

/// A corner-point grid: pillars, corner depths and an active mask.
///
/// # Example
///
/// ```
/// use reservoir_types::{CellIjk, CornerPointGrid, Point3, Vector3};
///
/// let grid = CornerPointGrid::from_box(
///     (2, 2, 1).into(),
///     Point3::new(0.0, 0.0, 0.0),
///     Vector3::new(1.0, 1.0, 1.0),
/// )
/// .unwrap();
///
/// assert_eq!(grid.cell_count(), 4);
/// let cell = grid.cell(CellIjk::new(1, 1, 0));
/// assert!((cell.center().x - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CornerPointGrid {
    dims: GridDims,
    coord: Vec<f64>,
    zcorn: Vec<f64>,
    actnum: Vec<bool>,
}

impl CornerPointGrid {
    /// Create a grid from raw arrays.
    ///
    /// # Errors
    ///
    /// - [`GridError::InvalidDimensions`] if any dimension is zero.
    /// - [`GridError::ShapeMismatch`] if an array length disagrees with `dims`.
    pub fn try_new(
        dims: GridDims,
        coord: Vec<f64>,
        zcorn: Vec<f64>,
        actnum: Vec<bool>,
    ) -> GridResult<Self> {
        let dims = dims.validate()?;
        let expected = dims.pillar_count() * 6;
        if coord.len() != expected {
            return Err(GridError::shape_mismatch("coord", expected, coord.len()));
        }
        let expected = dims.cell_count() * 8;
        if zcorn.len() != expected {
            return Err(GridError::shape_mismatch("zcorn", expected, zcorn.len()));
        }
        let expected = dims.cell_count();
        if actnum.len() != expected {
            return Err(GridError::shape_mismatch("actnum", expected, actnum.len()));
        }
        Ok(Self {
            dims,
            coord,
            zcorn,
            actnum,
        })
    }

    /// Create an axis-aligned box grid with all cells active.
    ///
    /// `origin` is the top SW corner; depth grows with k by `increment.z`.
    ///
    /// # Errors
    ///
    /// - [`GridError::InvalidDimensions`] if any dimension is zero.
    /// - [`GridError::InvalidConfiguration`] if an increment is not positive.
    pub fn from_box(dims: GridDims, origin: Point3<f64>, increment: Vector3<f64>) -> GridResult<Self> {
        let dims = dims.validate()?;
        if increment.iter().any(|d| !(d.is_finite() && *d > 0.0)) {
            return Err(GridError::invalid_configuration(format!(
                "box increments must be positive, got {increment:?}"
            )));
        }
        let ztop = origin.z;
        let zbot = origin.z + increment.z * dims.nlay as f64;

        let mut coord = Vec::with_capacity(dims.pillar_count() * 6);
        for pj in 0..=dims.nrow {
            for pi in 0..=dims.ncol {
                let x = origin.x + increment.x * pi as f64;
                let y = origin.y + increment.y * pj as f64;
                coord.extend_from_slice(&[x, y, ztop, x, y, zbot]);
            }
        }

        let mut zcorn = Vec::with_capacity(dims.cell_count() * 8);
        for index in 0..dims.cell_count() {
            let k = dims.ijk(index).k as f64;
            let top = origin.z + increment.z * k;
            let base = top + increment.z;
            zcorn.extend_from_slice(&[top, top, top, top, base, base, base, base]);
        }

        Self::try_new(dims, coord, zcorn, vec![true; dims.cell_count()])
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.dims.cell_count()
    }

    /// Raw pillar array.
    #[must_use]
    pub fn coord(&self) -> &[f64] {
        &self.coord
    }

    /// Raw corner depth array.
    #[must_use]
    pub fn zcorn(&self) -> &[f64] {
        &self.zcorn
    }

    /// Raw active mask.
    #[must_use]
    pub fn actnum(&self) -> &[bool] {
        &self.actnum
    }

    /// Linear index of `ijk`, checked against the dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfRange`] if `ijk` is outside the grid.
    pub fn cell_index(&self, ijk: CellIjk) -> GridResult<usize> {
        if self.dims.contains(ijk) {
            Ok(self.dims.index(ijk))
        } else {
            Err(GridError::OutOfRange {
                i: ijk.i,
                j: ijk.j,
                k: ijk.k,
            })
        }
    }

    /// Index triple of linear index `index`, or `None` past the last cell.
    #[must_use]
    pub const fn cell_ijk(&self, index: usize) -> Option<CellIjk> {
        if index < self.dims.cell_count() {
            Some(self.dims.ijk(index))
        } else {
            None
        }
    }

    /// Top and bottom endpoints of pillar `(pi, pj)`.
    ///
    /// # Panics
    ///
    /// Panics if `pi > ncol` or `pj > nrow`.
    #[must_use]
    pub fn pillar(&self, pi: usize, pj: usize) -> (Point3<f64>, Point3<f64>) {
        let p = &self.coord[(pj * (self.dims.ncol + 1) + pi) * 6..][..6];
        (Point3::new(p[0], p[1], p[2]), Point3::new(p[3], p[4], p[5]))
    }

    /// Point on pillar `(pi, pj)` at depth `z`.
    ///
    /// # Panics
    ///
    /// Panics if `pi > ncol` or `pj > nrow`.
    #[must_use]
    pub fn pillar_point(&self, pi: usize, pj: usize, z: f64) -> Point3<f64> {
        let (top, bot) = self.pillar(pi, pj);
        let dz = bot.z - top.z;
        if dz.abs() <= f64::EPSILON * top.z.abs().max(1.0) {
            return Point3::new(top.x, top.y, z);
        }
        let t = (z - top.z) / dz;
        Point3::new(top.x + t * (bot.x - top.x), top.y + t * (bot.y - top.y), z)
    }

    /// The eight corners of cell `ijk`.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` lies outside the grid.
    #[must_use]
    pub fn cell_corners(&self, ijk: CellIjk) -> [Point3<f64>; 8] {
        assert!(
            self.dims.contains(ijk),
            "cell ({}, {}, {}) is out of range",
            ijk.i,
            ijk.j,
            ijk.k
        );
        let z = &self.zcorn[self.dims.index(ijk) * 8..][..8];
        std::array::from_fn(|c| {
            self.pillar_point(ijk.i + (c & 1), ijk.j + ((c >> 1) & 1), z[c])
        })
    }

    /// Geometry of cell `ijk`.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` lies outside the grid; see [`try_cell`](Self::try_cell).
    #[must_use]
    pub fn cell(&self, ijk: CellIjk) -> CellGeometry {
        CellGeometry::new(ijk, self.cell_corners(ijk))
    }

    /// Geometry of cell `ijk`, checked against the dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfRange`] if `ijk` is outside the grid.
    pub fn try_cell(&self, ijk: CellIjk) -> GridResult<CellGeometry> {
        self.cell_index(ijk)?;
        Ok(self.cell(ijk))
    }

    /// Geometry of the cell at linear index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`cell_count`](Self::cell_count).
    #[must_use]
    pub fn cell_at(&self, index: usize) -> CellGeometry {
        self.cell(self.dims.ijk(index))
    }

    /// Iterate over all cells in linear order.
    pub fn cells(
        &self,
    ) -> impl DoubleEndedIterator<Item = CellGeometry> + ExactSizeIterator + '_ {
        (0..self.cell_count()).map(|index| self.cell_at(index))
    }

    /// Whether cell `ijk` is active.
    #[must_use]
    pub fn is_active(&self, ijk: CellIjk) -> bool {
        self.dims.contains(ijk) && self.actnum[self.dims.index(ijk)]
    }

    /// Number of active cells.
    #[must_use]
    pub fn nactive(&self) -> usize {
        self.actnum.iter().filter(|&&a| a).count()
    }

    /// Linear indices of the active cells.
    #[must_use]
    pub fn active_indices(&self) -> Vec<usize> {
        self.actnum
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| a.then_some(i))
            .collect()
    }

    /// Bounding box of all cell corners, active or not.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.cells()
            .fold(Aabb::empty(), |acc, cell| acc.union(&cell.bounding_box()))
    }

    /// The active mask as a discrete 0/1 property named `ACTNUM`.
    #[must_use]
    pub fn actnum_property(&self) -> GridProperty {
        let values = self.actnum.iter().map(|&a| i32::from(a)).collect();
        self.discrete_property("ACTNUM", values)
    }

    /// Zero-based `I`, `J` and `K` index properties.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn ijk_properties(&self) -> [GridProperty; 3] {
        let n = self.cell_count();
        let mut i = Vec::with_capacity(n);
        let mut j = Vec::with_capacity(n);
        let mut k = Vec::with_capacity(n);
        for index in 0..n {
            let ijk = self.dims.ijk(index);
            i.push(ijk.i as i32);
            j.push(ijk.j as i32);
            k.push(ijk.k as i32);
        }
        [
            self.discrete_property("I", i),
            self.discrete_property("J", j),
            self.discrete_property("K", k),
        ]
    }

    /// Cell center coordinates as `X`, `Y` and `Z` properties.
    ///
    /// With `mask`, inactive cells are undefined.
    #[must_use]
    pub fn cell_centers(&self, mask: bool) -> [GridProperty; 3] {
        let centers: Vec<Option<Point3<f64>>> = (0..self.cell_count())
            .into_par_iter()
            .map(|index| (!mask || self.actnum[index]).then(|| self.cell_at(index).center()))
            .collect();
        let axis = |f: fn(&Point3<f64>) -> f64| -> Vec<f64> {
            centers.iter().map(|c| c.as_ref().map_or(UNDEF, f)).collect()
        };
        [
            self.continuous_property("X", axis(|p| p.x)),
            self.continuous_property("Y", axis(|p| p.y)),
            self.continuous_property("Z", axis(|p| p.z)),
        ]
    }

    /// Mean pillar-wise cell thickness as a property named `dZ`.
    #[must_use]
    pub fn dz_property(&self, mask: bool) -> GridProperty {
        self.cell_property("dZ", mask, |cell| cell.dz())
    }

    /// Horizontal cell lengths along i and j as `dX` and `dY` properties.
    #[must_use]
    pub fn dxdy_properties(&self) -> [GridProperty; 2] {
        [
            self.cell_property("dX", false, |cell| cell.dx()),
            self.cell_property("dY", false, |cell| cell.dy()),
        ]
    }

    /// Cell volumes as a property named `BULKVOL`.
    #[must_use]
    pub fn bulk_volume_property(&self, mask: bool) -> GridProperty {
        self.cell_property("BULKVOL", mask, |cell| cell.volume())
    }

    /// Summary geometry over active cells, or all cells with `all_cells`.
    #[must_use]
    pub fn geometrics(&self, all_cells: bool) -> GridGeometrics {
        let mut bounds = Aabb::empty();
        let mut direction = Vector3::<f64>::zeros();
        let (mut sum_dx, mut sum_dy, mut sum_dz) = (0.0, 0.0, 0.0);
        let mut cells = 0usize;

        for (index, cell) in self.cells().enumerate() {
            if !all_cells && !self.actnum[index] {
                continue;
            }
            bounds = bounds.union(&cell.bounding_box());
            let edge = cell.corners[1] - cell.corners[0];
            let len = edge.x.hypot(edge.y);
            if len > 0.0 {
                direction += Vector3::new(edge.x / len, edge.y / len, 0.0);
            }
            sum_dx += cell.dx();
            sum_dy += cell.dy();
            sum_dz += cell.dz();
            cells += 1;
        }

        let avg = |sum: f64| if cells > 0 { sum / cells as f64 } else { 0.0 };
        let avg_rotation = direction.y.atan2(direction.x).to_degrees().rem_euclid(360.0);

        GridGeometrics {
            origin: self.cell_corners(CellIjk::new(0, 0, 0))[0],
            bounds,
            avg_rotation,
            avg_dx: avg(sum_dx),
            avg_dy: avg(sum_dy),
            avg_dz: avg(sum_dz),
            cells,
        }
    }

    /// Inactivate active cells thinner than `threshold`.
    ///
    /// Returns the number of cells that were inactivated.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfiguration`] if `threshold` is not finite.
    pub fn inactivate_by_dz(&mut self, threshold: f64) -> GridResult<usize> {
        if !threshold.is_finite() {
            return Err(GridError::invalid_configuration(format!(
                "dz threshold must be finite, got {threshold}"
            )));
        }
        let thin: Vec<usize> = (0..self.cell_count())
            .filter(|&index| self.actnum[index] && self.cell_at(index).dz() < threshold)
            .collect();
        for &index in &thin {
            self.actnum[index] = false;
        }
        info!(threshold, inactivated = thin.len(), "Inactivated thin cells");
        Ok(thin.len())
    }

    /// Translate and optionally mirror all coordinates.
    ///
    /// Each coordinate becomes `value * flip + offset` per axis. Mirroring
    /// an odd number of axes reverses the cell orientation.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfiguration`] if a flip is not +1 or -1,
    /// or an offset is not finite.
    #[allow(clippy::float_cmp)]
    pub fn translate(&mut self, offset: Vector3<f64>, flip: Vector3<f64>) -> GridResult<()> {
        if flip.iter().any(|&f| f != 1.0 && f != -1.0) {
            return Err(GridError::invalid_configuration(format!(
                "flip factors must be 1 or -1, got {flip:?}"
            )));
        }
        if offset.iter().any(|o| !o.is_finite()) {
            return Err(GridError::invalid_configuration(format!(
                "offset must be finite, got {offset:?}"
            )));
        }
        for pillar in self.coord.chunks_exact_mut(6) {
            for (axis, value) in pillar.iter_mut().enumerate() {
                *value = *value * flip[axis % 3] + offset[axis % 3];
            }
        }
        for z in &mut self.zcorn {
            *z = *z * flip.z + offset.z;
        }
        debug!(?offset, ?flip, "Translated grid coordinates");
        Ok(())
    }

    /// A single-layer grid spanning from the top of layer 0 to the base of
    /// the last layer. A column is active if any of its cells is active.
    #[must_use]
    pub fn reduce_to_one_layer(&self) -> Self {
        let GridDims { ncol, nrow, nlay } = self.dims;
        let dims = GridDims::new(ncol, nrow, 1);
        let mut zcorn = Vec::with_capacity(dims.cell_count() * 8);
        let mut actnum = Vec::with_capacity(dims.cell_count());
        for j in 0..nrow {
            for i in 0..ncol {
                let top = self.dims.index(CellIjk::new(i, j, 0)) * 8;
                let base = self.dims.index(CellIjk::new(i, j, nlay - 1)) * 8;
                zcorn.extend_from_slice(&self.zcorn[top..top + 4]);
                zcorn.extend_from_slice(&self.zcorn[base + 4..base + 8]);
                actnum.push(
                    (0..nlay).any(|k| self.actnum[self.dims.index(CellIjk::new(i, j, k))]),
                );
            }
        }
        Self {
            dims,
            coord: self.coord.clone(),
            zcorn,
            actnum,
        }
    }

    /// Inactivate active cells whose center lies inside any of `polygons`
    /// in plan view.
    ///
    /// `layer_range` limits the operation to layers `k1..=k2` (zero-based);
    /// `None` covers every layer. Returns the number of cells inactivated.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfiguration`] if `polygons` is empty or
    /// the layer range is reversed or ends past the last layer.
    pub fn inactivate_inside(
        &mut self,
        polygons: &[Polygon],
        layer_range: Option<(usize, usize)>,
    ) -> GridResult<usize> {
        self.inactivate_by_polygons(polygons, layer_range, true)
    }

    /// Inactivate active cells whose center lies outside every polygon.
    ///
    /// See [`inactivate_inside`](Self::inactivate_inside) for `layer_range`.
    ///
    /// # Errors
    ///
    /// Same as [`inactivate_inside`](Self::inactivate_inside).
    pub fn inactivate_outside(
        &mut self,
        polygons: &[Polygon],
        layer_range: Option<(usize, usize)>,
    ) -> GridResult<usize> {
        self.inactivate_by_polygons(polygons, layer_range, false)
    }

    fn inactivate_by_polygons(
        &mut self,
        polygons: &[Polygon],
        layer_range: Option<(usize, usize)>,
        inside: bool,
    ) -> GridResult<usize> {
        if polygons.is_empty() {
            return Err(GridError::invalid_configuration(
                "at least one polygon is needed",
            ));
        }
        let nlay = self.dims.nlay;
        let (k1, k2) = layer_range.unwrap_or((0, nlay - 1));
        if k1 > k2 || k2 >= nlay {
            return Err(GridError::invalid_configuration(format!(
                "layer range {k1}..={k2} does not fit {nlay} layers"
            )));
        }

        let footprints: Vec<Aabb> = polygons.iter().map(Polygon::bounds).collect();
        let per_layer = self.dims.ncol * self.dims.nrow;
        let hits: Vec<usize> = (k1 * per_layer..(k2 + 1) * per_layer)
            .into_par_iter()
            .filter(|&index| {
                if !self.actnum[index] {
                    return false;
                }
                let cell = self.cell_at(index);
                let bbox = cell.bounding_box();
                let c = cell.center();
                let in_any = polygons
                    .iter()
                    .zip(&footprints)
                    .any(|(poly, footprint)| footprint.intersects(&bbox) && poly.contains_xy(c.x, c.y));
                in_any == inside
            })
            .collect();
        for &index in &hits {
            self.actnum[index] = false;
        }
        info!(
            polygons = polygons.len(),
            k1,
            k2,
            inside,
            inactivated = hits.len(),
            "Inactivated cells by polygon"
        );
        Ok(hits.len())
    }

    /// Pinch inactive cells to zero thickness in columns that keep at least
    /// one active cell. Columns with no active cell are left alone.
    ///
    /// Each inactive cell collapses, corner by corner, onto the base of the
    /// nearest active cell above it, or onto the top of the first active
    /// cell when none lies above. Returns the number of cells collapsed.
    pub fn collapse_inactive_cells(&mut self) -> usize {
        let GridDims { ncol, nrow, nlay } = self.dims;
        let mut collapsed = 0;
        for j in 0..nrow {
            for i in 0..ncol {
                let column: Vec<usize> = (0..nlay)
                    .map(|k| self.dims.index(CellIjk::new(i, j, k)))
                    .collect();
                let Some(&first) = column.iter().find(|&&index| self.actnum[index]) else {
                    continue;
                };
                let mut anchor = [0.0; 4];
                anchor.copy_from_slice(&self.zcorn[first * 8..first * 8 + 4]);
                for &index in &column {
                    let base = index * 8;
                    if self.actnum[index] {
                        anchor.copy_from_slice(&self.zcorn[base + 4..base + 8]);
                    } else {
                        self.zcorn[base..base + 4].copy_from_slice(&anchor);
                        self.zcorn[base + 4..base + 8].copy_from_slice(&anchor);
                        collapsed += 1;
                    }
                }
            }
        }
        info!(collapsed, "Collapsed inactive cells");
        collapsed
    }

    /// A grid with every layer split into `rfactor` layers of equal
    /// pillar-wise thickness. Sub-cells inherit the active flag.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfiguration`] if `rfactor` is zero.
    pub fn refine_vertically(&self, rfactor: usize) -> GridResult<Self> {
        if rfactor == 0 {
            return Err(GridError::invalid_configuration(
                "refinement factor must be at least 1",
            ));
        }
        let GridDims { ncol, nrow, nlay } = self.dims;
        let dims = GridDims::new(ncol, nrow, nlay * rfactor);
        let mut zcorn = vec![0.0; dims.cell_count() * 8];
        let mut actnum = vec![false; dims.cell_count()];

        for index in 0..self.cell_count() {
            let ijk = self.dims.ijk(index);
            let z = &self.zcorn[index * 8..][..8];
            for sub in 0..rfactor {
                let t0 = sub as f64 / rfactor as f64;
                let t1 = (sub + 1) as f64 / rfactor as f64;
                let target = dims.index(CellIjk::new(ijk.i, ijk.j, ijk.k * rfactor + sub));
                let out = &mut zcorn[target * 8..][..8];
                for c in 0..4 {
                    let (top, bot) = (z[c], z[c + 4]);
                    out[c] = top + t0 * (bot - top);
                    out[c + 4] = if sub + 1 == rfactor {
                        bot
                    } else {
                        top + t1 * (bot - top)
                    };
                }
                actnum[target] = self.actnum[index];
            }
        }

        debug!(rfactor, nlay = dims.nlay, "Refined grid vertically");
        Self::try_new(dims, self.coord.clone(), zcorn, actnum)
    }

    /// Corner coordinates as 24 continuous properties named `X0, Y0, Z0`
    /// through `X7, Y7, Z7`, inactive cells included.
    ///
    /// Corner numbers follow [`cell_corners`](Self::cell_corners).
    #[must_use]
    pub fn xyz_corners(&self) -> Vec<GridProperty> {
        let corners: Vec<[Point3<f64>; 8]> = (0..self.cell_count())
            .into_par_iter()
            .map(|index| self.cell_corners(self.dims.ijk(index)))
            .collect();
        let mut out = Vec::with_capacity(24);
        for c in 0..8 {
            for (a, axis) in ["X", "Y", "Z"].into_iter().enumerate() {
                let values = corners.iter().map(|p| p[c][a]).collect();
                out.push(self.continuous_property(&format!("{axis}{c}"), values));
            }
        }
        out
    }

    fn cell_property(
        &self,
        name: &str,
        mask: bool,
        f: impl Fn(&CellGeometry) -> f64 + Sync,
    ) -> GridProperty {
        let values = (0..self.cell_count())
            .into_par_iter()
            .map(|index| {
                if mask && !self.actnum[index] {
                    UNDEF
                } else {
                    f(&self.cell_at(index))
                }
            })
            .collect();
        self.continuous_property(name, values)
    }

    fn continuous_property(&self, name: &str, values: Vec<f64>) -> GridProperty {
        GridProperty::from_parts(name, self.dims, PropertyValues::Continuous(values))
    }

    fn discrete_property(&self, name: &str, values: Vec<i32>) -> GridProperty {
        GridProperty::from_parts(name, self.dims, PropertyValues::Discrete(values))
    }
}

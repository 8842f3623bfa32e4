//! Per-layer bucket index over cell bounding boxes.
//!
//! The index stores one padded bounding box and one degeneracy flag per
//! cell, and for every layer `k` a coarse 2D bucket grid over the global
//! plan-view extent of the grid. Each bucket lists the cells of its layer
//! whose bounding box overlaps it.
//!
//! A query visits the layers whose depth range contains the point, looks
//! up the single bucket holding `(x, y)` and filters its cells by bounding
//! box. Candidates come out ordered by `k`, then `j`, then `i`.

#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use nalgebra::Point3;
use rayon::prelude::*;
use reservoir_types::{Aabb, CellIjk, CornerPointGrid, GeometryConfig, GridDims, GridResult};
use smallvec::SmallVec;
use tracing::{debug, info};

/// Candidate list returned by point queries.
pub type Candidates = SmallVec<[CellIjk; 8]>;

/// Regular 2D bucket layout shared by all layers.
#[derive(Debug, Clone, Copy)]
struct BucketGrid {
    xmin: f64,
    ymin: f64,
    dx: f64,
    dy: f64,
    nx: usize,
    ny: usize,
}

impl BucketGrid {
    fn new(bounds: &Aabb, dims: GridDims, bucket_columns: usize) -> Self {
        let nx = dims.ncol.div_ceil(bucket_columns);
        let ny = dims.nrow.div_ceil(bucket_columns);
        let size = bounds.size();
        let width = if size.x > 0.0 { size.x } else { 1.0 };
        let height = if size.y > 0.0 { size.y } else { 1.0 };
        Self {
            xmin: bounds.min.x,
            ymin: bounds.min.y,
            dx: width / nx as f64,
            dy: height / ny as f64,
            nx,
            ny,
        }
    }

    fn column(&self, x: f64) -> usize {
        (((x - self.xmin) / self.dx).floor().max(0.0) as usize).min(self.nx - 1)
    }

    fn row(&self, y: f64) -> usize {
        (((y - self.ymin) / self.dy).floor().max(0.0) as usize).min(self.ny - 1)
    }

    fn bucket(&self, x: f64, y: f64) -> usize {
        self.column(x) + self.nx * self.row(y)
    }

    fn len(&self) -> usize {
        self.nx * self.ny
    }
}

/// Cells of one layer, bucketed in plan view.
#[derive(Debug, Clone)]
struct LayerIndex {
    /// Union of the padded boxes of the layer's cells.
    extent: Aabb,
    /// Linear cell indices per bucket, ascending.
    buckets: Vec<Vec<usize>>,
}

impl LayerIndex {
    fn build(k: usize, dims: GridDims, grid: &BucketGrid, cell_bounds: &[Aabb]) -> Self {
        let mut buckets = vec![Vec::new(); grid.len()];
        let mut extent = Aabb::empty();

        let first = dims.ncol * dims.nrow * k;
        for index in first..first + dims.ncol * dims.nrow {
            let bbox = &cell_bounds[index];
            if bbox.is_empty() {
                continue;
            }
            extent = extent.union(bbox);
            for by in grid.row(bbox.min.y)..=grid.row(bbox.max.y) {
                for bx in grid.column(bbox.min.x)..=grid.column(bbox.max.x) {
                    buckets[bx + grid.nx * by].push(index);
                }
            }
        }

        debug!(k, zmin = extent.min.z, zmax = extent.max.z, "Built layer index");
        Self { extent, buckets }
    }

    fn contains_z(&self, z: f64) -> bool {
        self.extent.contains_z(z, 0.0)
    }
}

/// Spatial index over the cells of a corner-point grid.
///
/// Built once from a grid and a [`GeometryConfig`], immutable afterwards and
/// safe to share between threads.
///
/// # Example
///
/// ```
/// use reservoir_index::CellIndex;
/// use reservoir_types::{CellIjk, CornerPointGrid, GeometryConfig, Point3, Vector3};
///
/// let grid = CornerPointGrid::from_box(
///     (2, 2, 2).into(),
///     Point3::new(0.0, 0.0, 0.0),
///     Vector3::new(1.0, 1.0, 1.0),
/// )
/// .unwrap();
/// let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
///
/// let hits = index.candidates(&Point3::new(1.5, 0.5, 1.5));
/// assert_eq!(hits.as_slice(), &[CellIjk::new(1, 0, 1)]);
/// ```
#[derive(Debug, Clone)]
pub struct CellIndex {
    dims: GridDims,
    config: GeometryConfig,
    bounds: Aabb,
    cell_bounds: Vec<Aabb>,
    degenerate: Vec<bool>,
    active: Vec<bool>,
    buckets: BucketGrid,
    layers: Vec<LayerIndex>,
    searchable: usize,
    degenerate_count: usize,
}

impl CellIndex {
    /// Build the index for `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`reservoir_types::GridError::InvalidConfiguration`] if
    /// `config` does not validate.
    pub fn build(grid: &CornerPointGrid, config: &GeometryConfig) -> GridResult<Self> {
        config.validate()?;
        let dims = grid.dims();
        let cell_count = grid.cell_count();
        info!(
            ncol = dims.ncol,
            nrow = dims.nrow,
            nlay = dims.nlay,
            cells = cell_count,
            "Building cell index"
        );

        let summarize = |index: usize| {
            let cell = grid.cell_at(index);
            let bbox = cell.bounding_box();
            let pad = config.contain_tolerance * bbox.max_extent().max(0.0);
            let padded = if bbox.is_empty() {
                bbox
            } else {
                Aabb {
                    min: bbox.min - nalgebra::Vector3::repeat(pad),
                    max: bbox.max + nalgebra::Vector3::repeat(pad),
                }
            };
            (padded, cell.is_degenerate(config.epsilon))
        };
        let summaries: Vec<(Aabb, bool)> = if config.parallel {
            (0..cell_count).into_par_iter().map(summarize).collect()
        } else {
            (0..cell_count).map(summarize).collect()
        };
        let (cell_bounds, degenerate): (Vec<Aabb>, Vec<bool>) = summaries.into_iter().unzip();

        let bounds = cell_bounds
            .iter()
            .filter(|b| !b.is_empty())
            .fold(Aabb::empty(), |acc, b| acc.union(b));
        let buckets = BucketGrid::new(&bounds, dims, config.bucket_columns);

        let layers: Vec<LayerIndex> = if config.parallel {
            (0..dims.nlay)
                .into_par_iter()
                .map(|k| LayerIndex::build(k, dims, &buckets, &cell_bounds))
                .collect()
        } else {
            (0..dims.nlay)
                .map(|k| LayerIndex::build(k, dims, &buckets, &cell_bounds))
                .collect()
        };

        let active = grid.actnum().to_vec();
        let degenerate_count = degenerate.iter().filter(|&&d| d).count();
        let searchable = (0..cell_count)
            .filter(|&i| {
                (config.include_degenerate || !degenerate[i])
                    && (config.include_inactive || active[i])
            })
            .count();

        info!(
            searchable,
            degenerate = degenerate_count,
            buckets = buckets.len(),
            "Cell index built"
        );

        Ok(Self {
            dims,
            config: *config,
            bounds,
            cell_bounds,
            degenerate,
            active,
            buckets,
            layers,
            searchable,
            degenerate_count,
        })
    }

    /// Dimensions of the indexed grid.
    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// Configuration the index was built with.
    #[must_use]
    pub const fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Bounding box of all indexed cells, padded by the contain tolerance.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Number of cells that take part in point location.
    #[must_use]
    pub const fn searchable_count(&self) -> usize {
        self.searchable
    }

    /// Number of degenerate cells.
    #[must_use]
    pub const fn degenerate_count(&self) -> usize {
        self.degenerate_count
    }

    /// Whether cell `ijk` is degenerate. Out-of-range cells report false.
    #[must_use]
    pub fn is_degenerate(&self, ijk: CellIjk) -> bool {
        self.dims.contains(ijk) && self.degenerate[self.dims.index(ijk)]
    }

    /// Padded bounding box of cell `ijk`.
    #[must_use]
    pub fn cell_bounds(&self, ijk: CellIjk) -> Option<&Aabb> {
        if self.dims.contains(ijk) {
            self.cell_bounds.get(self.dims.index(ijk))
        } else {
            None
        }
    }

    /// Whether cell `ijk` takes part in point location.
    #[must_use]
    pub fn is_searchable(&self, ijk: CellIjk) -> bool {
        self.dims.contains(ijk) && self.searchable_at(self.dims.index(ijk))
    }

    fn searchable_at(&self, index: usize) -> bool {
        (self.config.include_degenerate || !self.degenerate[index])
            && (self.config.include_inactive || self.active[index])
    }

    /// Searchable cells whose bounding box contains `point`, ordered by
    /// increasing `k`, then `j`, then `i`.
    #[must_use]
    pub fn candidates(&self, point: &Point3<f64>) -> Candidates {
        let mut out = Candidates::new();
        if !self.bounds.contains(point) {
            return out;
        }
        let bucket = self.buckets.bucket(point.x, point.y);
        for layer in self.layers.iter().filter(|l| l.contains_z(point.z)) {
            out.extend(
                layer.buckets[bucket]
                    .iter()
                    .copied()
                    .filter(|&i| self.searchable_at(i) && self.cell_bounds[i].contains(point))
                    .map(|i| self.dims.ijk(i)),
            );
        }
        out
    }

    /// Searchable cells whose bounding box contains `(x, y)` in plan view,
    /// ordered by increasing `k`, then `j`, then `i`.
    #[must_use]
    pub fn column_candidates(&self, x: f64, y: f64) -> Vec<CellIjk> {
        if !self.bounds.contains_xy(x, y, 0.0) {
            return Vec::new();
        }
        let bucket = self.buckets.bucket(x, y);
        self.layers
            .iter()
            .flat_map(|layer| layer.buckets[bucket].iter().copied())
            .filter(|&i| self.searchable_at(i) && self.cell_bounds[i].contains_xy(x, y, 0.0))
            .map(|i| self.dims.ijk(i))
            .collect()
    }

    /// Whether the bounding box of a degenerate cell contains `point`.
    ///
    /// Inactive cells count only when the configuration includes them.
    #[must_use]
    pub fn degenerate_hit(&self, point: &Point3<f64>) -> bool {
        if self.degenerate_count == 0 || !self.bounds.contains(point) {
            return false;
        }
        let bucket = self.buckets.bucket(point.x, point.y);
        self.layers
            .iter()
            .filter(|l| l.contains_z(point.z))
            .flat_map(|layer| layer.buckets[bucket].iter().copied())
            .any(|i| {
                self.degenerate[i]
                    && (self.config.include_inactive || self.active[i])
                    && self.cell_bounds[i].contains(point)
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn box_grid(ncol: usize, nrow: usize, nlay: usize) -> CornerPointGrid {
        CornerPointGrid::from_box(
            GridDims::new(ncol, nrow, nlay),
            Point3::new(0.0, 0.0, 100.0),
            Vector3::new(10.0, 10.0, 5.0),
        )
        .unwrap()
    }

    /// Collapse the top of cell `ijk` onto its base.
    fn pinch(grid: &CornerPointGrid, ijk: CellIjk) -> CornerPointGrid {
        let mut zcorn = grid.zcorn().to_vec();
        let base = grid.dims().index(ijk) * 8;
        for c in 0..4 {
            zcorn[base + c] = zcorn[base + 4 + c];
        }
        CornerPointGrid::try_new(grid.dims(), grid.coord().to_vec(), zcorn, grid.actnum().to_vec())
            .unwrap()
    }

    #[test]
    fn test_index_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CellIndex>();
    }

    #[test]
    fn test_candidates_ordered_by_k() {
        let grid = box_grid(3, 3, 3);
        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        // On the face between k = 0 and k = 1.
        let hits = index.candidates(&Point3::new(15.0, 15.0, 105.0));
        assert_eq!(
            hits.as_slice(),
            &[CellIjk::new(1, 1, 0), CellIjk::new(1, 1, 1)]
        );
        // On the corner shared by four columns in one layer.
        let hits = index.candidates(&Point3::new(10.0, 10.0, 112.0));
        assert_eq!(
            hits.as_slice(),
            &[
                CellIjk::new(0, 0, 2),
                CellIjk::new(1, 0, 2),
                CellIjk::new(0, 1, 2),
                CellIjk::new(1, 1, 2),
            ]
        );
    }

    #[test]
    fn test_outside_bounds_is_empty() {
        let grid = box_grid(2, 2, 2);
        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        assert!(index.candidates(&Point3::new(-1.0, 5.0, 102.0)).is_empty());
        assert!(index.candidates(&Point3::new(5.0, 5.0, 99.0)).is_empty());
        assert!(index.candidates(&Point3::new(5.0, 5.0, f64::NAN)).is_empty());
        assert!(index.column_candidates(25.0, 5.0).is_empty());
    }

    #[test]
    fn test_column_candidates() {
        let grid = box_grid(2, 2, 3);
        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        let column = index.column_candidates(15.0, 5.0);
        assert_eq!(
            column,
            vec![
                CellIjk::new(1, 0, 0),
                CellIjk::new(1, 0, 1),
                CellIjk::new(1, 0, 2)
            ]
        );
    }

    #[test]
    fn test_degenerate_cells_excluded() {
        let grid = pinch(&box_grid(2, 1, 2), CellIjk::new(0, 0, 0));
        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        assert_eq!(index.degenerate_count(), 1);
        assert_eq!(index.searchable_count(), 3);
        assert!(index.is_degenerate(CellIjk::new(0, 0, 0)));
        assert!(!index.is_searchable(CellIjk::new(0, 0, 0)));

        // The pinched cell sits at z = 105 on top of (0, 0, 1).
        let p = Point3::new(5.0, 5.0, 105.0);
        assert_eq!(index.candidates(&p).as_slice(), &[CellIjk::new(0, 0, 1)]);
        assert!(index.degenerate_hit(&p));
        assert!(!index.degenerate_hit(&Point3::new(15.0, 5.0, 102.0)));

        let config = GeometryConfig::default().with_include_degenerate(true);
        let index = CellIndex::build(&grid, &config).unwrap();
        assert_eq!(index.searchable_count(), 4);
        assert_eq!(index.candidates(&p).len(), 2);
    }

    #[test]
    fn test_inactive_cells_excluded() {
        let grid = box_grid(2, 1, 1);
        let mut actnum = grid.actnum().to_vec();
        actnum[1] = false;
        let grid =
            CornerPointGrid::try_new(grid.dims(), grid.coord().to_vec(), grid.zcorn().to_vec(), actnum)
                .unwrap();
        let p = Point3::new(15.0, 5.0, 102.0);

        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        assert!(index.candidates(&p).is_empty());
        assert_eq!(index.searchable_count(), 1);

        let config = GeometryConfig::default().with_include_inactive(true);
        let index = CellIndex::build(&grid, &config).unwrap();
        assert_eq!(index.candidates(&p).as_slice(), &[CellIjk::new(1, 0, 0)]);
    }

    #[test]
    fn test_parallel_and_serial_agree() {
        let grid = box_grid(5, 4, 6);
        let par = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        let seq =
            CellIndex::build(&grid, &GeometryConfig::default().with_parallel(false)).unwrap();
        assert_eq!(par.bounds(), seq.bounds());
        for x in [0.0, 3.0, 10.0, 27.5, 50.0] {
            for z in [100.0, 101.0, 115.0, 130.0] {
                let p = Point3::new(x, 17.0, z);
                assert_eq!(par.candidates(&p), seq.candidates(&p));
            }
        }
    }

    #[test]
    fn test_bucket_sizes() {
        let grid = box_grid(7, 3, 1);
        for columns in [1, 2, 3, 10] {
            let config = GeometryConfig::default().with_bucket_columns(columns);
            let index = CellIndex::build(&grid, &config).unwrap();
            let p = Point3::new(65.0, 25.0, 102.0);
            assert_eq!(index.candidates(&p).as_slice(), &[CellIjk::new(6, 2, 0)]);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let grid = box_grid(1, 1, 1);
        let config = GeometryConfig::default().with_bucket_columns(0);
        assert!(CellIndex::build(&grid, &config).is_err());
    }

    #[test]
    fn test_cell_bounds_accessor() {
        let grid = box_grid(2, 2, 1);
        let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
        let b = index.cell_bounds(CellIjk::new(1, 1, 0)).unwrap();
        assert!(b.contains(&Point3::new(15.0, 15.0, 102.5)));
        assert!(index.cell_bounds(CellIjk::new(2, 0, 0)).is_none());
    }
}

//! Property transfer between grids, points, wells and surfaces.
//!
//! Every operation borrows its inputs, validates them before any work,
//! and writes one output slot per target. Targets are processed in
//! parallel when [`ResampleParams::parallel`] is set; the serial path gives
//! bit-identical results.

#![allow(clippy::cast_precision_loss)]

use hashbrown::HashMap;
use nalgebra::Point3;
use rayon::prelude::*;
use reservoir_index::{CellIndex, Location, PointLocator};
use reservoir_surface::RegularSurface;
use reservoir_types::{
    is_undef, is_undef_int, CornerPointGrid, GridDims, GridProperty, PropertyValues, WellPath,
    UNDEF, UNDEF_INT,
};
use tracing::{info, warn};

use crate::error::{ResampleError, ResampleResult};
use crate::params::{AggregationPolicy, ResampleParams, SurfaceSampling};
use crate::result::ResampleReport;

// =============================================================================
// Shared helpers
// =============================================================================

/// Map `f` over `0..n`, in parallel when asked. Output order is index order.
pub(crate) fn map_indexed<T, F>(n: usize, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel {
        (0..n).into_par_iter().map(f).collect()
    } else {
        (0..n).map(f).collect()
    }
}

pub(crate) fn check_property(property: &GridProperty, dims: GridDims) -> ResampleResult<()> {
    let expected = dims.cell_count();
    if property.dims() != dims || property.values().len() != expected {
        return Err(ResampleError::shape_mismatch(
            "property",
            expected,
            property.values().len(),
        ));
    }
    Ok(())
}

/// Validate parameters and inputs and build a locator over the source grid.
pub(crate) fn source_locator<'a>(
    grid: &'a CornerPointGrid,
    index: &'a CellIndex,
    property: &GridProperty,
    params: &ResampleParams,
) -> ResampleResult<PointLocator<'a>> {
    params.validate()?;
    if !index.config().same_geometry(&params.geometry) {
        return Err(ResampleError::invalid_configuration(
            "index was built with a different geometry configuration",
        ));
    }
    check_property(property, grid.dims())?;
    Ok(PointLocator::new(grid, index)?)
}

/// Fail when nothing was located and some samples hit only degenerate cells.
pub(crate) fn check_degenerate(report: &ResampleReport) -> ResampleResult<()> {
    if report.only_degenerate() {
        warn!(
            samples = report.samples,
            degenerate = report.degenerate,
            "No sample located; only degenerate cells cover the samples"
        );
        return Err(ResampleError::DegenerateGeometry {
            samples: report.degenerate,
        });
    }
    Ok(())
}

fn merge_reports(reports: impl IntoIterator<Item = ResampleReport>) -> ResampleReport {
    reports
        .into_iter()
        .fold(ResampleReport::default(), |mut acc, r| {
            acc.merge(&r);
            acc
        })
}

/// Locate `points` and gather the containing cells' values.
fn sample_points(
    locator: &PointLocator<'_>,
    property: &GridProperty,
    points: &[Point3<f64>],
    parallel: bool,
) -> ResampleResult<(PropertyValues, ResampleReport)> {
    let dims = locator.grid().dims();
    let locations = locator.locate_all_detailed(points, parallel);
    let report = ResampleReport::from_locations(&locations);
    check_degenerate(&report)?;
    let sources: Vec<Option<usize>> = locations
        .iter()
        .map(|l| l.cell().map(|ijk| dims.index(ijk)))
        .collect();
    Ok((property.values().gather(&sources), report))
}

// =============================================================================
// Grid -> points / well
// =============================================================================

/// Values of `property` at arbitrary points; points outside every cell get
/// the undefined marker.
///
/// # Errors
///
/// - [`ResampleError::InvalidConfiguration`] for invalid parameters or an
///   index built with other geometry settings.
/// - [`ResampleError::ShapeMismatch`] if `property` does not fit `grid`.
/// - [`ResampleError::DegenerateGeometry`] if no point was located and some
///   fell only in degenerate cells.
pub fn grid_to_points(
    grid: &CornerPointGrid,
    index: &CellIndex,
    property: &GridProperty,
    points: &[Point3<f64>],
    params: &ResampleParams,
) -> ResampleResult<PropertyValues> {
    grid_to_points_report(grid, index, property, points, params).map(|(values, _)| values)
}

/// [`grid_to_points`] with location counts.
///
/// # Errors
///
/// Same as [`grid_to_points`].
pub fn grid_to_points_report(
    grid: &CornerPointGrid,
    index: &CellIndex,
    property: &GridProperty,
    points: &[Point3<f64>],
    params: &ResampleParams,
) -> ResampleResult<(PropertyValues, ResampleReport)> {
    let locator = source_locator(grid, index, property, params)?;
    info!(
        property = property.name(),
        points = points.len(),
        "Sampling grid at points"
    );
    let (values, report) = sample_points(&locator, property, points, params.parallel)?;
    info!(located = report.located, outside = report.outside, "Point sampling done");
    Ok((values, report))
}

/// Values of `property` along a well, one per survey point.
///
/// # Errors
///
/// Same as [`grid_to_points`].
pub fn grid_to_well(
    grid: &CornerPointGrid,
    index: &CellIndex,
    property: &GridProperty,
    well: &WellPath,
    params: &ResampleParams,
) -> ResampleResult<PropertyValues> {
    grid_to_well_report(grid, index, property, well, params).map(|(values, _)| values)
}

/// [`grid_to_well`] with location counts.
///
/// # Errors
///
/// Same as [`grid_to_points`].
pub fn grid_to_well_report(
    grid: &CornerPointGrid,
    index: &CellIndex,
    property: &GridProperty,
    well: &WellPath,
    params: &ResampleParams,
) -> ResampleResult<(PropertyValues, ResampleReport)> {
    let locator = source_locator(grid, index, property, params)?;
    info!(
        property = property.name(),
        well = well.name().unwrap_or("unnamed"),
        points = well.len(),
        "Sampling grid along well"
    );
    sample_points(&locator, property, well.points(), params.parallel)
}

// =============================================================================
// Grid -> surface
// =============================================================================

/// Sample `property` at every node of `surface`, using the node value as
/// depth. The result has the same geometry; undefined nodes stay undefined.
///
/// # Errors
///
/// Same as [`grid_to_points`].
pub fn grid_to_surface(
    grid: &CornerPointGrid,
    index: &CellIndex,
    property: &GridProperty,
    surface: &RegularSurface,
    params: &ResampleParams,
) -> ResampleResult<RegularSurface> {
    grid_to_surface_report(grid, index, property, surface, params).map(|(surface, _)| surface)
}

/// [`grid_to_surface`] with location counts over the defined nodes.
///
/// # Errors
///
/// Same as [`grid_to_points`].
pub fn grid_to_surface_report(
    grid: &CornerPointGrid,
    index: &CellIndex,
    property: &GridProperty,
    surface: &RegularSurface,
    params: &ResampleParams,
) -> ResampleResult<(RegularSurface, ResampleReport)> {
    let locator = source_locator(grid, index, property, params)?;
    info!(
        property = property.name(),
        nodes = surface.values().len(),
        undefined = surface.undefined_count(),
        "Sampling grid onto surface"
    );

    let mut nodes = Vec::with_capacity(surface.values().len());
    let mut points = Vec::with_capacity(surface.values().len());
    for (node, ((x, y), z)) in surface.xy_values().into_iter().zip(surface.values()).enumerate() {
        if !is_undef(*z) {
            nodes.push(node);
            points.push(Point3::new(x, y, *z));
        }
    }

    let (sampled, report) = sample_points(&locator, property, &points, params.parallel)?;
    let mut values = vec![UNDEF; surface.values().len()];
    for (slot, &node) in nodes.iter().enumerate() {
        if let Some(v) = sampled.value_f64(slot) {
            values[node] = v;
        }
    }
    Ok((surface.with_values(values)?, report))
}

// =============================================================================
// Surface -> grid
// =============================================================================

/// A continuous property named `name` holding surface values per cell.
///
/// Inactive cells, cells outside the surface and cells touching undefined
/// surface nodes are undefined.
///
/// # Errors
///
/// Returns [`ResampleError::InvalidConfiguration`] for invalid parameters.
pub fn surface_to_grid(
    grid: &CornerPointGrid,
    surface: &RegularSurface,
    sampling: SurfaceSampling,
    name: &str,
    params: &ResampleParams,
) -> ResampleResult<GridProperty> {
    params.validate()?;
    info!(
        cells = grid.cell_count(),
        ?sampling,
        "Sampling surface into grid"
    );
    let actnum = grid.actnum();
    let values = map_indexed(grid.cell_count(), params.parallel, |index| {
        if !actnum[index] {
            return UNDEF;
        }
        let cell = grid.cell_at(index);
        let value = match sampling {
            SurfaceSampling::CellCenter => {
                let c = cell.center();
                surface.value_at(c.x, c.y)
            }
            SurfaceSampling::TopCorners => cell.corners[..4]
                .iter()
                .map(|p| surface.value_at(p.x, p.y))
                .sum::<Option<f64>>()
                .map(|sum| sum / 4.0),
        };
        value.unwrap_or(UNDEF)
    });
    Ok(GridProperty::continuous(name, grid.dims(), values)?)
}

// =============================================================================
// Grid -> grid
// =============================================================================

/// Resample `property` from `source` onto the cells of `target`.
///
/// The result keeps the property name and code table. Inactive target
/// cells are undefined.
///
/// # Errors
///
/// - [`ResampleError::InvalidConfiguration`] for invalid parameters, or an
///   averaging policy on a discrete property, or
///   [`AggregationPolicy::Majority`] on a continuous property.
/// - [`ResampleError::ShapeMismatch`] if `property` does not fit `source`.
/// - [`ResampleError::DegenerateGeometry`] if no sample was located and some
///   fell only in degenerate cells.
pub fn grid_to_grid(
    source: &CornerPointGrid,
    index: &CellIndex,
    property: &GridProperty,
    target: &CornerPointGrid,
    params: &ResampleParams,
) -> ResampleResult<GridProperty> {
    grid_to_grid_report(source, index, property, target, params).map(|(property, _)| property)
}

/// [`grid_to_grid`] with location counts over all samples.
///
/// # Errors
///
/// Same as [`grid_to_grid`].
pub fn grid_to_grid_report(
    source: &CornerPointGrid,
    index: &CellIndex,
    property: &GridProperty,
    target: &CornerPointGrid,
    params: &ResampleParams,
) -> ResampleResult<(GridProperty, ResampleReport)> {
    let locator = source_locator(source, index, property, params)?;
    let policy = params.policy;
    if policy.is_mean() && property.is_discrete() {
        return Err(ResampleError::invalid_configuration(format!(
            "policy '{policy}' needs a continuous property, '{}' is discrete",
            property.name()
        )));
    }
    if policy == AggregationPolicy::Majority && !property.is_discrete() {
        return Err(ResampleError::invalid_configuration(format!(
            "policy '{policy}' needs a discrete property, '{}' is continuous",
            property.name()
        )));
    }

    info!(
        property = property.name(),
        %policy,
        source_cells = source.cell_count(),
        target_cells = target.cell_count(),
        "Resampling grid to grid"
    );

    let resampler = CellResampler {
        locator,
        values: property.values(),
        target,
        samples_per_axis: params.samples_per_axis,
    };
    let n = target.cell_count();
    let (values, reports): (PropertyValues, Vec<ResampleReport>) = match policy {
        AggregationPolicy::Nearest => {
            let (sources, reports): (Vec<_>, Vec<_>) =
                map_indexed(n, params.parallel, |t| resampler.nearest(t))
                    .into_iter()
                    .unzip();
            (property.values().gather(&sources), reports)
        }
        AggregationPolicy::Mean | AggregationPolicy::VolumeWeightedMean => {
            let weighted = policy == AggregationPolicy::VolumeWeightedMean;
            let (values, reports): (Vec<_>, Vec<_>) =
                map_indexed(n, params.parallel, |t| resampler.mean(t, weighted))
                    .into_iter()
                    .unzip();
            (PropertyValues::Continuous(values), reports)
        }
        AggregationPolicy::Majority => {
            let (codes, reports): (Vec<_>, Vec<_>) =
                map_indexed(n, params.parallel, |t| resampler.majority(t))
                    .into_iter()
                    .unzip();
            (PropertyValues::Discrete(codes), reports)
        }
    };

    let report = merge_reports(reports);
    check_degenerate(&report)?;
    info!(
        samples = report.samples,
        located = report.located,
        undefined = values.undefined_count(),
        "Grid to grid done"
    );

    let out = GridProperty::new(property.name(), target.dims(), values)?
        .with_codes(property.codes().clone());
    Ok((out, report))
}

/// Per-target-cell work for grid-to-grid resampling.
struct CellResampler<'a> {
    locator: PointLocator<'a>,
    values: &'a PropertyValues,
    target: &'a CornerPointGrid,
    samples_per_axis: usize,
}

impl CellResampler<'_> {
    fn nearest(&self, t: usize) -> (Option<usize>, ResampleReport) {
        let mut report = ResampleReport::default();
        if !self.target.actnum()[t] {
            return (None, report);
        }
        let location = self.locator.locate_detailed(&self.target.cell_at(t).center());
        report.record(location);
        let dims = self.locator.grid().dims();
        (location.cell().map(|ijk| dims.index(ijk)), report)
    }

    /// Hit count per source cell over the sub-samples of target cell `t`,
    /// sorted by source index.
    fn hits(&self, t: usize) -> (Vec<(usize, usize)>, ResampleReport) {
        let mut report = ResampleReport::default();
        if !self.target.actnum()[t] {
            return (Vec::new(), report);
        }
        let cell = self.target.cell_at(t);
        let dims = self.locator.grid().dims();
        let n = self.samples_per_axis;
        let step = |a: usize| (a as f64 + 0.5) / n as f64;

        let mut tally: HashMap<usize, usize> = HashMap::new();
        for c in 0..n {
            for b in 0..n {
                for a in 0..n {
                    let p = cell.interpolate(step(a), step(b), step(c));
                    let location = self.locator.locate_detailed(&p);
                    report.record(location);
                    if let Location::Found(ijk) = location {
                        *tally.entry(dims.index(ijk)).or_insert(0) += 1;
                    }
                }
            }
        }
        let mut hits: Vec<(usize, usize)> = tally.into_iter().collect();
        hits.sort_unstable_by_key(|&(source, _)| source);
        (hits, report)
    }

    fn mean(&self, t: usize, weighted: bool) -> (f64, ResampleReport) {
        let (hits, report) = self.hits(t);
        let mut sum = 0.0;
        let mut weight = 0.0;
        for (source, count) in hits {
            if let Some(v) = self.values.value_f64(source) {
                let w = if weighted { count as f64 } else { 1.0 };
                sum += w * v;
                weight += w;
            }
        }
        let value = if weight > 0.0 { sum / weight } else { UNDEF };
        (value, report)
    }

    fn majority(&self, t: usize) -> (i32, ResampleReport) {
        let (hits, report) = self.hits(t);
        let Some(codes) = self.values.as_discrete() else {
            return (UNDEF_INT, report);
        };
        let mut votes: HashMap<i32, usize> = HashMap::new();
        for (source, count) in hits {
            let code = codes[source];
            if !is_undef_int(code) {
                *votes.entry(code).or_insert(0) += count;
            }
        }
        let winner = votes
            .into_iter()
            .max_by(|(code_a, votes_a), (code_b, votes_b)| {
                votes_a.cmp(votes_b).then(code_b.cmp(code_a))
            })
            .map_or(UNDEF_INT, |(code, _)| code);
        (winner, report)
    }
}

//! Zone properties from surfaces and zone-log comparison along wells.

use reservoir_index::{CellIndex, Location};
use reservoir_surface::RegularSurface;
use reservoir_types::{is_undef_int, CornerPointGrid, GridProperty, WellPath, UNDEF_INT};
use tracing::info;

use crate::error::{ResampleError, ResampleResult};
use crate::params::{ResampleParams, ZoneLogFilter};
use crate::resample::{check_degenerate, map_indexed, source_locator};
use crate::result::{ResampleReport, ZoneMatchReport};

/// A discrete `ZONE` property from surfaces ordered top to bottom.
///
/// The zone of a cell is one plus the number of surfaces lying at or above
/// its center depth, so cells above the first surface are zone 1 and cells
/// below the last are zone `surfaces.len() + 1`. Inactive cells and cells
/// where a surface is undefined or absent are undefined.
///
/// # Errors
///
/// Returns [`ResampleError::InvalidConfiguration`] if `surfaces` is empty or
/// the parameters are invalid.
pub fn zone_from_surfaces(
    grid: &CornerPointGrid,
    surfaces: &[RegularSurface],
    params: &ResampleParams,
) -> ResampleResult<GridProperty> {
    params.validate()?;
    if surfaces.is_empty() {
        return Err(ResampleError::invalid_configuration(
            "zone_from_surfaces needs at least one surface",
        ));
    }
    info!(
        cells = grid.cell_count(),
        surfaces = surfaces.len(),
        "Building zones from surfaces"
    );

    let actnum = grid.actnum();
    let codes = map_indexed(grid.cell_count(), params.parallel, |index| {
        if !actnum[index] {
            return UNDEF_INT;
        }
        let c = grid.cell_at(index).center();
        let mut zone = 1;
        for surface in surfaces {
            match surface.value_at(c.x, c.y) {
                Some(z) if z <= c.z => zone += 1,
                Some(_) => {}
                None => return UNDEF_INT,
            }
        }
        zone
    });

    let names = (1..=surfaces.len() + 1)
        .filter_map(|zone| i32::try_from(zone).ok())
        .map(|zone| (zone, format!("Zone{zone}")))
        .collect();
    Ok(GridProperty::discrete("ZONE", grid.dims(), codes)?.with_codes(names))
}

/// Compare a well zone log with the zone property of the cells the well
/// passes through.
///
/// Points outside the grid, and points where either zone is undefined, are
/// skipped.
///
/// # Errors
///
/// - [`ResampleError::ShapeMismatch`] if `zone_log` does not have one entry
///   per well point, or `zones` does not fit `grid`.
/// - [`ResampleError::InvalidConfiguration`] if `zones` is not discrete or
///   the parameters are invalid.
/// - [`ResampleError::DegenerateGeometry`] if no point was located and some
///   fell only in degenerate cells.
pub fn zone_mismatch(
    grid: &CornerPointGrid,
    index: &CellIndex,
    zones: &GridProperty,
    well: &WellPath,
    zone_log: &[i32],
    params: &ResampleParams,
) -> ResampleResult<ZoneMatchReport> {
    zone_mismatch_filtered(grid, index, zones, well, zone_log, &ZoneLogFilter::default(), params)
}

/// [`zone_mismatch`] with the log shifted and filtered first.
///
/// Samples removed by `filter` count as skipped.
///
/// # Errors
///
/// Same as [`zone_mismatch`], plus
/// [`ResampleError::InvalidConfiguration`] for an empty filter range.
pub fn zone_mismatch_filtered(
    grid: &CornerPointGrid,
    index: &CellIndex,
    zones: &GridProperty,
    well: &WellPath,
    zone_log: &[i32],
    filter: &ZoneLogFilter,
    params: &ResampleParams,
) -> ResampleResult<ZoneMatchReport> {
    filter.validate()?;
    let locator = source_locator(grid, index, zones, params)?;
    if zone_log.len() != well.len() {
        return Err(ResampleError::shape_mismatch(
            "zone_log",
            well.len(),
            zone_log.len(),
        ));
    }
    let Some(codes) = zones.values().as_discrete() else {
        return Err(ResampleError::invalid_configuration(format!(
            "zone property '{}' must be discrete",
            zones.name()
        )));
    };

    let locations = locator.locate_all_detailed(well.points(), params.parallel);
    check_degenerate(&ResampleReport::from_locations(&locations))?;

    let dims = grid.dims();
    let mut report = ZoneMatchReport::default();
    for ((location, &logged), point) in locations.iter().zip(zone_log).zip(well.points()) {
        let modelled = match location {
            Location::Found(ijk) => codes[dims.index(*ijk)],
            Location::Outside | Location::Degenerate => UNDEF_INT,
        };
        let Some(logged) = filter.apply(logged, point.z) else {
            report.skipped += 1;
            continue;
        };
        if is_undef_int(modelled) {
            report.skipped += 1;
            continue;
        }
        report.total += 1;
        if modelled == logged {
            report.matched += 1;
        }
    }

    info!(
        well = well.name().unwrap_or("unnamed"),
        compared = report.total,
        matched = report.matched,
        skipped = report.skipped,
        "Zone log comparison done"
    );
    Ok(report)
}

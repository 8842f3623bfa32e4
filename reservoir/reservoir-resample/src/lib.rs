//! Property resampling for reservoir geometry.
//!
//! Transfers per-cell properties between corner-point grids, point sets,
//! well paths and regular surfaces by geometric lookup:
//!
//! - [`grid_to_points`] / [`grid_to_well`] - value of the containing cell
//! - [`grid_to_surface`] - value at each surface node's `(x, y, z)`
//! - [`surface_to_grid`] - bilinear surface value per cell
//! - [`grid_to_grid`] - nearest or aggregated over sub-samples per target cell
//! - [`zone_from_surfaces`] / [`zone_mismatch`] - zonation from surfaces and
//!   agreement with a well zone log
//!
//! Every operation takes a [`ResampleParams`] and borrows its inputs; the
//! source grid's [`reservoir_index::CellIndex`] is built and owned by the caller.
//!
//! # Example
//!
//! ```
//! use reservoir_index::CellIndex;
//! use reservoir_resample::{grid_to_points, ResampleParams};
//! use reservoir_types::{CornerPointGrid, GridProperty, Point3, PropertyValues, Vector3, UNDEF};
//!
//! let grid = CornerPointGrid::from_box(
//!     (2, 1, 1).into(),
//!     Point3::new(0.0, 0.0, 0.0),
//!     Vector3::new(1.0, 1.0, 1.0),
//! )
//! .unwrap();
//! let poro = GridProperty::continuous("PORO", grid.dims(), vec![0.1, 0.3]).unwrap();
//! let params = ResampleParams::default();
//! let index = CellIndex::build(&grid, &params.geometry).unwrap();
//!
//! let values = grid_to_points(
//!     &grid,
//!     &index,
//!     &poro,
//!     &[Point3::new(1.5, 0.5, 0.5), Point3::new(9.0, 0.5, 0.5)],
//!     &params,
//! )
//! .unwrap();
//! assert_eq!(values, PropertyValues::Continuous(vec![0.3, UNDEF]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod error;
mod params;
mod resample;
mod result;
mod zones;

pub use error::{ResampleError, ResampleResult};
pub use params::{AggregationPolicy, ResampleParams, SurfaceSampling, ZoneLogFilter};
pub use resample::{
    grid_to_grid, grid_to_grid_report, grid_to_points, grid_to_points_report, grid_to_surface,
    grid_to_surface_report, grid_to_well, grid_to_well_report, surface_to_grid,
};
pub use result::{ResampleReport, ZoneMatchReport};
pub use zones::{zone_from_surfaces, zone_mismatch, zone_mismatch_filtered};

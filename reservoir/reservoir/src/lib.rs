//! Reservoir geometry toolkit: corner-point grids, surfaces, wells and
//! property resampling.
//!
//! This umbrella crate re-exports the reservoir-* crates under one API.
//!
//! # Quick Start
//!
//! ```
//! use reservoir::prelude::*;
//!
//! let grid = CornerPointGrid::from_box(
//!     GridDims::new(2, 2, 1),
//!     Point3::new(0.0, 0.0, 1000.0),
//!     Vector3::new(50.0, 50.0, 10.0),
//! )
//! .unwrap();
//! let poro = GridProperty::continuous("PORO", grid.dims(), vec![0.1, 0.2, 0.3, 0.4]).unwrap();
//!
//! let params = ResampleParams::default();
//! let index = CellIndex::build(&grid, &params.geometry).unwrap();
//! let locator = PointLocator::new(&grid, &index).unwrap();
//! assert_eq!(
//!     locator.locate(&Point3::new(75.0, 25.0, 1005.0)),
//!     Some(CellIjk::new(1, 0, 0))
//! );
//!
//! let well = WellPath::try_new(vec![
//!     Point3::new(75.0, 75.0, 990.0),
//!     Point3::new(75.0, 75.0, 1005.0),
//! ])
//! .unwrap();
//! let log = grid_to_well(&grid, &index, &poro, &well, &params).unwrap();
//! assert_eq!(log.as_continuous().unwrap()[1], 0.4);
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Grid data model: `CornerPointGrid`, `CellGeometry`,
//!   `GridProperty`, `WellPath`, `Aabb`, `GeometryConfig`
//! - [`surface`] - Rotated regular surfaces with bilinear lookup
//! - [`index`] - Spatial index over grid cells and point location
//! - [`resample`] - Property transfer between grids, points, wells and
//!   surfaces
//!
//! # Feature Flags
//!
//! - `serde` - `Serialize` / `Deserialize` for the data model and parameters

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Grid data model, cell geometry and configuration.
pub use reservoir_types as types;

/// Rotated regular surfaces.
pub use reservoir_surface as surface;

/// Cell index and point location.
pub use reservoir_index as index;

/// Property resampling.
pub use reservoir_resample as resample;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for reservoir geometry work.
///
/// # Usage
///
/// ```
/// use reservoir::prelude::*;
/// ```
pub mod prelude {
    // Data model
    pub use reservoir_types::{
        CellGeometry, CellIjk, CornerPointGrid, GeometryConfig, GridDims, GridProperty,
        Point3, Polygon, PropertyValues, Vector3, WellPath, UNDEF, UNDEF_INT,
    };

    // Surfaces
    pub use reservoir_surface::RegularSurface;

    // Location
    pub use reservoir_index::{CellIndex, Location, PointLocator};

    // Resampling
    pub use reservoir_resample::{
        grid_to_grid, grid_to_points, grid_to_surface, grid_to_well, surface_to_grid,
        AggregationPolicy, ResampleParams, SurfaceSampling,
    };
}

// =============================================================================
// Tests
// =============================================================================

//! Core data model for reservoir geometry.
//!
//! This crate provides the types every other reservoir crate builds on:
//!
//! - [`CornerPointGrid`] - pillars, corner depths and active mask
//! - [`CellGeometry`] - a single hexahedral cell derived from the grid
//! - [`GridProperty`] - per-cell continuous or discrete values
//! - [`WellPath`] - a well trajectory with measured depth
//! - [`Polygon`] - closed plan-view polygon for areal cell selection
//! - [`GeometryConfig`] - tolerances and search options
//! - [`Aabb`] - axis-aligned bounding box
//!
//! # Conventions
//!
//! Depth `z` is positive down and increases with layer index `k`. Cells are
//! stored in linear order `i + ncol * (j + nrow * k)`. Undefined values use
//! the sentinels [`UNDEF`] and [`UNDEF_INT`].
//!
//! # Example
//!
//! ```
//! use reservoir_types::{CellIjk, CornerPointGrid, GeometryConfig, Point3, Vector3};
//!
//! let grid = CornerPointGrid::from_box(
//!     (2, 2, 1).into(),
//!     Point3::new(0.0, 0.0, 0.0),
//!     Vector3::new(1.0, 1.0, 1.0),
//! )
//! .unwrap();
//!
//! let cell = grid.cell(CellIjk::new(0, 0, 0));
//! assert!(!cell.is_degenerate(GeometryConfig::default().epsilon));
//! assert!(cell.contains(&Point3::new(0.5, 0.5, 0.5), 1e-9));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod bounds;
mod cell;
mod config;
mod error;
mod grid;
mod polygon;
mod property;
mod well;

pub use bounds::Aabb;
pub use cell::{tetrahedra_about, tetrahedron_volume, CellGeometry, CellIjk, MainDiagonal};
pub use config::{GeometryConfig, DEFAULT_CONTAIN_TOLERANCE, DEFAULT_EPSILON};
pub use error::{GridError, GridResult};
pub use grid::{CornerPointGrid, GridDims, GridGeometrics};
pub use polygon::Polygon;
pub use property::{
    is_undef, is_undef_int, GridProperty, PropertyValues, UNDEF, UNDEF_INT, UNDEF_LIMIT,
};
pub use well::WellPath;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

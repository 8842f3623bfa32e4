//! Spatial index and point location for corner-point grids.
//!
//! - [`CellIndex`] - per-layer bucket grids over cell bounding boxes, built
//!   once (optionally in parallel) and then frozen
//! - [`PointLocator`] - finds the cell containing a point using the index
//!   for candidates and the tetrahedral inside test for the answer
//!
//! # Example
//!
//! ```
//! use reservoir_index::{CellIndex, Location, PointLocator};
//! use reservoir_types::{CellIjk, CornerPointGrid, GeometryConfig, Point3, Vector3};
//!
//! let grid = CornerPointGrid::from_box(
//!     (2, 2, 1).into(),
//!     Point3::new(0.0, 0.0, 0.0),
//!     Vector3::new(1.0, 1.0, 1.0),
//! )
//! .unwrap();
//! let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
//! let locator = PointLocator::new(&grid, &index).unwrap();
//!
//! assert_eq!(
//!     locator.locate_detailed(&Point3::new(1.5, 0.5, 0.5)),
//!     Location::Found(CellIjk::new(1, 0, 0))
//! );
//! assert_eq!(locator.locate_detailed(&Point3::new(5.0, 5.0, 5.0)), Location::Outside);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod index;
mod locate;

pub use index::{Candidates, CellIndex};
pub use locate::{Location, PointLocator};

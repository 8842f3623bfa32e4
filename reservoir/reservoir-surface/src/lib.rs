//! Regular surfaces for reservoir geometry.
//!
//! A [`RegularSurface`] is a rotated raster of elevation (or depth) values
//! with bilinear lookup at arbitrary world `(x, y)`. Undefined nodes carry
//! [`reservoir_types::UNDEF`] and poison every lookup they contribute to.
//!
//! # Example
//!
//! ```
//! use reservoir_surface::{RegularSurface, SurfaceSample};
//!
//! let surf = RegularSurface::try_new(
//!     0.0, 0.0, 50.0, 50.0, 2, 2, 45.0,
//!     vec![1000.0, 1010.0, 1020.0, 1030.0],
//! )
//! .unwrap();
//!
//! let (x, y) = surf.node_xy(1, 1);
//! assert_eq!(surf.value_at(x, y), Some(1030.0));
//! assert_eq!(surf.sample(-100.0, -100.0), SurfaceSample::Outside);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod error;
mod surface;

pub use error::{SurfaceError, SurfaceResult};
pub use surface::{RegularSurface, SurfaceSample};

//! Property-based tests for cell geometry.
//!
//! Run with: cargo test -p reservoir-types -- proptest

use approx::assert_relative_eq;
use proptest::prelude::*;
use reservoir_types::{
    CellGeometry, CellIjk, CornerPointGrid, GridDims, MainDiagonal, Point3, Vector3,
};

// =============================================================================
// Strategies
// =============================================================================

/// A box cell with its top SW corner and positive extents.
fn arb_box() -> impl Strategy<Value = CellGeometry> {
    (
        prop::array::uniform3(-1000.0..1000.0f64),
        prop::array::uniform3(0.5..50.0f64),
    )
        .prop_map(|([x, y, z], [dx, dy, dz])| {
            CellGeometry::from_box(
                CellIjk::default(),
                Point3::new(x, y, z),
                Point3::new(x + dx, y + dy, z + dz),
            )
        })
}

/// A box cell with every corner moved by up to 10% of the smallest extent.
fn arb_warped_cell() -> impl Strategy<Value = CellGeometry> {
    (arb_box(), prop::collection::vec(prop::array::uniform3(-0.1..0.1f64), 8)).prop_map(
        |(cell, jitter)| {
            let size = cell.bounding_box().size();
            let scale = size.x.min(size.y).min(size.z);
            let mut corners = cell.corners;
            for (corner, [jx, jy, jz]) in corners.iter_mut().zip(jitter) {
                *corner += Vector3::new(jx, jy, jz) * scale;
            }
            CellGeometry::new(cell.ijk, corners)
        },
    )
}

// =============================================================================
// Volume invariants
// =============================================================================

proptest! {
    #[test]
    fn proptest_box_volume_matches_extents(cell in arb_box()) {
        let size = cell.bounding_box().size();
        let expected = size.x * size.y * size.z;
        for diagonal in MainDiagonal::ALL {
            assert_relative_eq!(cell.signed_volume_about(diagonal), expected, max_relative = 1e-9);
        }
    }

    #[test]
    fn proptest_warped_volume_positive(cell in arb_warped_cell()) {
        prop_assert!(cell.volume() > 0.0);
        prop_assert!(cell.signed_volume() > 0.0);
        prop_assert!(!cell.is_degenerate(1e-9));
    }

    #[test]
    fn proptest_volume_translation_invariant(
        cell in arb_warped_cell(),
        offset in prop::array::uniform3(-500.0..500.0f64),
    ) {
        let offset = Vector3::new(offset[0], offset[1], offset[2]);
        let moved = CellGeometry::new(cell.ijk, cell.corners.map(|c| c + offset));
        assert_relative_eq!(moved.volume(), cell.volume(), max_relative = 1e-6);
    }
}

// =============================================================================
// Inside test
// =============================================================================

proptest! {
    #[test]
    fn proptest_center_inside(cell in arb_warped_cell()) {
        prop_assert!(cell.contains(&cell.center(), 1e-9));
    }

    #[test]
    fn proptest_interior_point_inside(
        cell in arb_box(),
        uvw in prop::array::uniform3(0.05..0.95f64),
    ) {
        let p = cell.interpolate(uvw[0], uvw[1], uvw[2]);
        prop_assert!(cell.contains(&p, 1e-9));
    }

    #[test]
    fn proptest_outside_bbox_not_inside(
        cell in arb_warped_cell(),
        shift in 1.01..3.0f64,
    ) {
        let bbox = cell.bounding_box();
        let p = bbox.center() + Vector3::new(bbox.size().x * shift, 0.0, 0.0);
        prop_assert!(!cell.contains(&p, 1e-9));
    }
}

// =============================================================================
// Grid tiling
// =============================================================================

proptest! {
    #[test]
    fn proptest_box_grid_volume_is_additive(
        ncol in 1usize..5,
        nrow in 1usize..5,
        nlay in 1usize..5,
        inc in prop::array::uniform3(0.5..20.0f64),
    ) {
        let dims = GridDims::new(ncol, nrow, nlay);
        let grid = CornerPointGrid::from_box(
            dims,
            Point3::new(0.0, 0.0, 1000.0),
            Vector3::new(inc[0], inc[1], inc[2]),
        )
        .unwrap();
        let total: f64 = grid.cells().map(|c| c.volume()).sum();
        let size = grid.bounds().size();
        assert_relative_eq!(total, size.x * size.y * size.z, max_relative = 1e-9);
    }
}

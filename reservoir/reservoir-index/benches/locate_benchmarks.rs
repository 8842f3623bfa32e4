//! Benchmarks for index construction and point location.
//!
//! Run with: cargo bench -p reservoir-index
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p reservoir-index -- --save-baseline main
//! 2. After changes: cargo bench -p reservoir-index -- --baseline main

#![allow(
    missing_docs,
    clippy::cast_precision_loss,
    clippy::unwrap_used
)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use reservoir_index::{CellIndex, PointLocator};
use reservoir_types::{CornerPointGrid, GeometryConfig, GridDims, Point3, Vector3};

// =============================================================================
// Test Grid Generation
// =============================================================================

/// Box grid with gently dipping layers so cells are not axis aligned.
fn dipping_grid(n: usize, nlay: usize) -> CornerPointGrid {
    let flat = CornerPointGrid::from_box(
        GridDims::new(n, n, nlay),
        Point3::new(0.0, 0.0, 1000.0),
        Vector3::new(50.0, 50.0, 2.0),
    )
    .unwrap();
    let dims = flat.dims();
    let mut zcorn = flat.zcorn().to_vec();
    for (index, z) in zcorn.chunks_exact_mut(8).enumerate() {
        let ijk = dims.ijk(index);
        for (c, depth) in z.iter_mut().enumerate() {
            let i = (ijk.i + (c & 1)) as f64;
            *depth += 0.5 * i;
        }
    }
    let mut coord = flat.coord().to_vec();
    for pillar in coord.chunks_exact_mut(6) {
        pillar[5] += 0.5 * n as f64;
    }
    CornerPointGrid::try_new(dims, coord, zcorn, flat.actnum().to_vec()).unwrap()
}

fn sample_points(grid: &CornerPointGrid, count: usize) -> Vec<Point3<f64>> {
    let step = (grid.cell_count() / count).max(1);
    grid.cells().step_by(step).map(|c| c.center()).collect()
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    group.sample_size(10);

    for n in [20, 50] {
        let grid = dipping_grid(n, 20);
        group.throughput(Throughput::Elements(grid.cell_count() as u64));
        for parallel in [false, true] {
            let config = GeometryConfig::default().with_parallel(parallel);
            let id = BenchmarkId::new(if parallel { "parallel" } else { "serial" }, n);
            group.bench_with_input(id, &grid, |b, grid| {
                b.iter(|| CellIndex::build(black_box(grid), &config).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate");

    let grid = dipping_grid(50, 20);
    let index = CellIndex::build(&grid, &GeometryConfig::default()).unwrap();
    let locator = PointLocator::new(&grid, &index).unwrap();
    let points = sample_points(&grid, 5000);
    group.throughput(Throughput::Elements(points.len() as u64));

    group.bench_function("locate_all_serial", |b| {
        b.iter(|| locator.locate_all(black_box(&points), false));
    });

    group.bench_function("locate_all_parallel", |b| {
        b.iter(|| locator.locate_all(black_box(&points), true));
    });

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_build, bench_locate);
criterion_main!(benches);

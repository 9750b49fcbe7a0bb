use beans_core::spatial_hash::{BucketGrid, SpatialHash};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn lattice(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| ((i % 100) as f64 * 8.0 + 4.0, (i / 100) as f64 * 8.0 + 4.0))
        .collect()
}

fn bench_spatial_hash_build(c: &mut Criterion) {
    let positions = lattice(2000);

    c.bench_function("spatial_hash_build_2000", |b| {
        b.iter(|| {
            let mut spatial = SpatialHash::new(16.0, 800, 600);
            spatial.build(&positions);
            black_box(spatial)
        })
    });
}

fn bench_spatial_hash_query(c: &mut Criterion) {
    let positions = lattice(2000);
    let mut spatial = SpatialHash::new(16.0, 800, 600);
    spatial.build(&positions);

    c.bench_function("spatial_hash_query_16_radius", |b| {
        let mut results = Vec::new();
        b.iter(|| {
            results.clear();
            spatial.query_into(400.0, 80.0, 16.0, &mut results);
            black_box(results.len())
        })
    });
}

fn bench_bucket_grid_conflicts(c: &mut Criterion) {
    let positions = lattice(2000);
    let mut grid = BucketGrid::new(15.0);
    for &(x, y) in &positions {
        grid.insert(x, y);
    }

    c.bench_function("bucket_grid_has_conflict", |b| {
        b.iter(|| black_box(grid.has_conflict(402.0, 82.0, 6.0)))
    });
}

criterion_group!(
    benches,
    bench_spatial_hash_build,
    bench_spatial_hash_query,
    bench_bucket_grid_conflicts
);
criterion_main!(benches);

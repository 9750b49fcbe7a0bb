use beans_core::placement::create_placement_strategy;
use beans_core::population::create_population_estimator;
use beans_core::Randomness;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_random_placement(c: &mut Criterion) {
    let strategy = create_placement_strategy("random", 0.5).unwrap();
    let (male, female) = create_population_estimator("density").estimate(800, 600, 5.0, 0.1, 1.0);
    let count = male + female;

    c.bench_function("random_placement_default_world", |b| {
        b.iter(|| {
            let mut rng = Randomness::seeded(7);
            black_box(strategy.place(count, 800, 600, 5.0, &mut rng).unwrap())
        })
    });
}

fn bench_grid_placement(c: &mut Criterion) {
    let strategy = create_placement_strategy("grid", 0.5).unwrap();

    c.bench_function("grid_placement_1000", |b| {
        b.iter(|| {
            let mut rng = Randomness::seeded(7);
            black_box(strategy.place(1000, 800, 600, 5.0, &mut rng).unwrap())
        })
    });
}

criterion_group!(benches, bench_random_placement, bench_grid_placement);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use embryoid_core::config::{AggregateConfig, SimConfig};
use embryoid_core::differentiation::DifferentiationParams;
use embryoid_core::simulation::Simulation;
use embryoid_core::structure;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

fn config(cell_count: usize) -> SimConfig {
    let mut config = SimConfig::default();
    config.simulation.seed = Some(42);
    config.aggregate.cell_count = cell_count;
    config
}

fn bench_seed_aggregate(c: &mut Criterion) {
    let aggregate = AggregateConfig::default();
    let params = Arc::new(DifferentiationParams::new(0.005, 0.5, 25.0, 0.5, 25.0));

    c.bench_function("seed_aggregate_1000", |b| {
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            black_box(structure::seed_aggregate(
                &aggregate,
                Arc::clone(&params),
                0,
                &mut rng,
            ))
        })
    });
}

fn bench_step(c: &mut Criterion) {
    c.bench_function("step_1000_cells", |b| {
        b.iter_batched(
            || Simulation::seeded("bench", config(1000)).unwrap(),
            |mut sim| black_box(sim.step().unwrap()),
            criterion::BatchSize::LargeInput,
        )
    });
}

fn bench_short_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    group.sample_size(10);
    group.bench_function("run_20_steps_200_cells", |b| {
        b.iter_batched(
            || {
                let mut cfg = config(200);
                cfg.simulation.end_time = 20.0;
                Simulation::seeded("bench", cfg).unwrap()
            },
            |mut sim| black_box(sim.run().unwrap().steps.len()),
            criterion::BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_seed_aggregate, bench_step, bench_short_run);
criterion_main!(benches);

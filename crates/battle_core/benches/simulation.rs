//! Simulation benchmarks for battle_core.
//!
//! Run with: `cargo bench -p battle_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use battle_core::indicators::IndicatorSnapshot;
use battle_core::stats::derive_stats;
use battle_test_utils::fixtures::seeded_simulation;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

/// Fast-forward whole matches and single ticks.
pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("fast_forward_8_entities", |b| {
        b.iter_batched(
            || seeded_simulation(8, 42),
            |mut sim| black_box(sim.fast_forward()),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("tick_12_entities", |b| {
        let mut sim = seeded_simulation(12, 7);
        b.iter(|| {
            if sim.is_finished() {
                sim = seeded_simulation(12, 7);
            }
            black_box(sim.tick())
        });
    });
}

/// Derive stats from a complete snapshot.
pub fn derivation_benchmark(c: &mut Criterion) {
    let snapshot = IndicatorSnapshot {
        population: Some(8.3e7),
        gdp: Some(3.8e12),
        gdp_growth: Some(1.5),
        exports_pct_gdp: Some(47.0),
        inflation: Some(2.1),
        gdp_per_capita: Some(45_000.0),
        investment_pct_gdp: Some(3.1),
        debt_pct_gdp: Some(66.0),
    };
    c.bench_function("derive_stats", |b| {
        b.iter(|| derive_stats(black_box(&snapshot)));
    });
}

criterion_group!(benches, simulation_benchmark, derivation_benchmark);
criterion_main!(benches);

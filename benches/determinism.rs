//! Full-run simulation benchmarks.
//!
//! Run with: cargo bench --bench determinism

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quill::{create_new_run, replay, run_autopilot, Catalog, MetaProgress, RulesConfig, RunState};

fn new_run(catalog: &Catalog, seed: &str, difficulty: u32) -> RunState {
    let meta = MetaProgress {
        max_unlocked_level: difficulty,
        ..MetaProgress::default()
    };
    create_new_run("bench", seed, catalog.starter_deck(), difficulty, meta, catalog, RulesConfig::default())
        .expect("builtin run")
}

fn bench_autopilot_run(c: &mut Criterion) {
    let catalog = Catalog::builtin().expect("builtin catalog");
    let mut group = c.benchmark_group("autopilot_run");

    for difficulty in [0u32, 5, 10] {
        let run = new_run(&catalog, "bench-seed", difficulty);
        group.bench_with_input(BenchmarkId::from_parameter(difficulty), &run, |b, run| {
            b.iter(|| {
                let result = run_autopilot(black_box(run.clone()), &catalog, 20_000).expect("autopilot");
                black_box(result)
            });
        });
    }

    group.finish();
}

fn bench_replay_and_hash(c: &mut Criterion) {
    let catalog = Catalog::builtin().expect("builtin catalog");
    let run = new_run(&catalog, "bench-replay", 0);
    let (_, log) = run_autopilot(run.clone(), &catalog, 20_000).expect("autopilot");

    c.bench_function("replay_full_log", |b| {
        b.iter(|| {
            let end = replay(black_box(run.clone()), black_box(&log), &catalog).expect("replay");
            black_box(end.compute_hash().expect("hash"))
        });
    });
}

criterion_group!(benches, bench_autopilot_run, bench_replay_and_hash);
criterion_main!(benches);

//! Benchmark for window streaming.
//!
//! TARGET: one window change (generate + evict) well under a 16ms frame
//!
//! Run with: cargo bench --package verdant_procedural --bench streaming_benchmark

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use verdant_core::Scene;
use verdant_procedural::{Behaviour, WindowMode, World, WorldConfig, WorldStreamer};

fn sliding_config() -> WorldConfig {
    let mut config = WorldConfig::default();
    config.window.mode = WindowMode::Sliding;
    config
}

fn benchmark_initial_population(c: &mut Criterion) {
    let config = sliding_config();

    let mut group = c.benchmark_group("streaming");
    group.sample_size(20);

    group.bench_function("populate_initial_window", |b| {
        b.iter(|| {
            let mut streamer = WorldStreamer::new(&config);
            let mut scene: Scene<Behaviour> = Scene::with_capacity(8_192);
            black_box(streamer.populate_initial(&mut scene))
        });
    });

    group.bench_function("slide_right_once", |b| {
        b.iter_batched(
            || {
                let mut streamer = WorldStreamer::new(&config);
                let mut scene: Scene<Behaviour> = Scene::with_capacity(8_192);
                streamer.populate_initial(&mut scene);
                (streamer, scene)
            },
            |(mut streamer, mut scene)| black_box(streamer.tick(5_000.0, 1_600.0, &mut scene)),
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn benchmark_frame(c: &mut Criterion) {
    let mut world = match World::new(WorldConfig::default()) {
        Ok(world) => world,
        Err(err) => panic!("default config must be valid: {err}"),
    };

    c.bench_function("world_step_idle_anchor", |b| {
        b.iter(|| black_box(world.step(1.0 / 60.0, 0.0)));
    });
}

criterion_group!(benches, benchmark_initial_population, benchmark_frame);
criterion_main!(benches);

//! # Lane Allocation Benchmark
//!
//! A busy live stream peaks at a few hundred items per second. One tick must
//! stay far below a 16ms frame budget even when a burst lands at once.
//!
//! Run with: `cargo bench --package barrage_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use barrage_core::{Engine, LaneAllocator};
use barrage_shared::{Descriptor, LaneAxis, Size, SpriteId};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DT: f64 = 1.0 / 60.0;

fn burst(rng: &mut StdRng, count: usize) -> Vec<Descriptor> {
    (0..count)
        .map(|i| {
            Descriptor::new("walk", format!("item {i}"))
                .with_duration(rng.gen_range(3.0..8.0))
                .with_z_index(rng.gen_range(-5..5))
        })
        .collect()
}

/// Benchmark: raw first-fit reservation on a full-height canvas.
fn bench_reserve(c: &mut Criterion) {
    c.bench_function("reserve_1080p_lanes", |b| {
        b.iter(|| {
            let mut lanes = LaneAllocator::new(Size::new(1920.0, 1080.0));
            let mut placed = 0;
            for i in 0..64u64 {
                if lanes.reserve(LaneAxis::Horizontal, 0.0, 5.0, SpriteId(i)).is_some() {
                    placed += 1;
                }
            }
            black_box(placed)
        });
    });
}

/// Benchmark: one tick absorbing a burst.
fn bench_tick_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_burst");

    for (count, smoothness) in [(50, 0.0), (500, 0.0), (500, 0.9)] {
        group.bench_with_input(
            BenchmarkId::new(format!("smoothness_{smoothness}"), count),
            &count,
            |b, &count| {
                let mut rng = StdRng::seed_from_u64(7);
                b.iter(|| {
                    let mut engine = Engine::new();
                    engine.set_smoothness(smoothness).unwrap();
                    engine.set_z_index_ordering(true);
                    engine.start();
                    let report = engine.tick(DT, None, burst(&mut rng, count));
                    black_box(engine.draw_order());
                    report.placed
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: steady state, 10 seconds of a 30 items/second feed.
fn bench_steady_feed(c: &mut Criterion) {
    c.bench_function("steady_feed_600_ticks", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            let mut engine = Engine::new();
            engine.set_smoothness(0.5).unwrap();
            engine.start();
            for tick in 0..600 {
                let incoming = if tick % 2 == 0 { burst(&mut rng, 1) } else { Vec::new() };
                engine.tick(DT, None, incoming);
            }
            black_box(engine.sprites_number_with_name(None))
        });
    });
}

criterion_group!(benches, bench_reserve, bench_tick_burst, bench_steady_feed);
criterion_main!(benches);

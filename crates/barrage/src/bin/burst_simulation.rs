//! # Burst Simulation
//!
//! Headless run of the renderer against a synthetic live feed:
//! - steady chatter of ~20 items per second
//! - a 200-item spike every 5 seconds
//! - 60Hz ticks, 60 simulated seconds
//!
//! Usage: `burst_simulation [config.toml]`
//!
//! Prints admission, drop and tick timing statistics.

use std::time::{Duration, Instant};

use barrage::{Descriptor, Direction, Renderer, RendererConfig, TickStats};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIMULATED_SECONDS: u32 = 60;
const SPIKE_EVERY_TICKS: u32 = 300;
const SPIKE_SIZE: usize = 200;
const CHATTER_PER_TICK: f64 = 20.0 / 60.0;

#[derive(Default)]
struct Totals {
    received: usize,
    finished: usize,
    dropped_overflow: usize,
    dropped_starved: usize,
    max_placed_per_tick: usize,
    max_on_screen: usize,
    max_backlog: usize,
}

fn descriptor(rng: &mut StdRng, serial: usize) -> Descriptor {
    let direction = if rng.gen_bool(0.1) {
        Direction::TopToBottom
    } else {
        Direction::RightToLeft
    };
    let sprite_name = if rng.gen_bool(0.8) { "walk" } else { "float" };
    Descriptor::new(sprite_name, format!("message {serial}"))
        .with_identifier(format!("msg-{serial}"))
        .with_duration(rng.gen_range(4.0..8.0))
        .with_z_index(rng.gen_range(0..3))
        .with_direction(direction)
}

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match RendererConfig::from_file(&path) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("cannot load {path}: {error}");
                std::process::exit(2);
            }
        },
        None => RendererConfig {
            smoothness: 0.6,
            recording: true,
            ..RendererConfig::default()
        },
    };

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              BARRAGE - BURST SIMULATION                          ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();
    println!("┌─ CONFIGURATION ──────────────────────────────────────────────────┐");
    println!("│ Container:          {}x{}", config.container.width, config.container.height);
    println!("│ Lane Thickness:     {}", config.lane_thickness);
    println!("│ Smoothness:         {}", config.smoothness);
    println!("│ Speed:              {}", config.speed);
    println!("│ Tick Rate:          {} Hz", config.tick_rate);
    println!("│ Spike:              {SPIKE_SIZE} items every {SPIKE_EVERY_TICKS} ticks");
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let mut renderer = Renderer::with_config(&config);
    let mut rng = StdRng::seed_from_u64(0xB4_88_A6_E0);
    let mut totals = Totals::default();

    let total_ticks = SIMULATED_SECONDS * config.tick_rate;
    let dt = 1.0 / f64::from(config.tick_rate);
    let budget = Duration::from_secs(1) / config.tick_rate.max(1);
    let mut stats = TickStats::new(budget);

    renderer.start();
    let wall = Instant::now();

    for tick in 0..total_ticks {
        let mut incoming = usize::from(rng.gen_bool(CHATTER_PER_TICK.min(1.0)));
        if tick > 0 && tick % SPIKE_EVERY_TICKS == 0 {
            incoming += SPIKE_SIZE;
        }
        for _ in 0..incoming {
            let item = descriptor(&mut rng, totals.received);
            if renderer.receive(item) {
                totals.received += 1;
            }
        }

        let start = Instant::now();
        let report = renderer.tick(dt);
        stats.record(start.elapsed(), &report);

        totals.finished += report.finished;
        totals.dropped_overflow += report.dropped_overflow;
        totals.dropped_starved += report.dropped_starved;
        totals.max_placed_per_tick = totals.max_placed_per_tick.max(report.placed);
        totals.max_on_screen = totals.max_on_screen.max(renderer.sprites_number_with_name(None));
        totals.max_backlog = totals.max_backlog.max(renderer.backlog());
    }

    let elapsed = wall.elapsed();

    println!("┌─ ADMISSION ──────────────────────────────────────────────────────┐");
    println!("│ Received:           {}", totals.received);
    println!("│ Placed:             {}", stats.placed());
    println!("│ Finished:           {}", totals.finished);
    println!("│ Dropped (overflow): {}", totals.dropped_overflow);
    println!("│ Dropped (no lane):  {}", totals.dropped_starved);
    println!("│ Max Placed / Tick:  {}", totals.max_placed_per_tick);
    println!("│ Max On Screen:      {}", totals.max_on_screen);
    println!("│ Max Backlog:        {}", totals.max_backlog);
    println!("│ Recorded:           {}", renderer.records().len());
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    println!("┌─ TICK PERFORMANCE ───────────────────────────────────────────────┐");
    println!("│ Real Time:          {:.3} seconds", elapsed.as_secs_f64());
    println!("│ Simulated Time:     {:.3} seconds", renderer.time());
    println!("│ Budget per Tick:    {} μs", budget.as_micros());
    println!("│ Min Tick Time:      {} μs", stats.fastest().as_micros());
    println!("│ Max Tick Time:      {} μs", stats.slowest().as_micros());
    println!("│ Mean Tick Time:     {} μs", stats.mean().as_micros());
    println!("│ Late Ticks:         {}", stats.late_ticks());
    println!("└──────────────────────────────────────────────────────────────────┘");

    renderer.stop();
}

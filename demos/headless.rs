//! # Headless Outbreak
//!
//! Runs the interaction engine without a window: a scripted pointer sweeps
//! across a random field while an infection spreads, and a census is printed
//! once per simulated second.
//!
//! Run with: `cargo run --example headless --release -- [particles] [config.json]`

use particle_interactions::prelude::*;
use particle_interactions::InfectionEngine;
use rand::Rng;

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;

fn main() {
    let count: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(800);

    let config = match std::env::args().nth(2) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("Failed to read {}: {}", path, e);
                std::process::exit(1);
            });
            InteractionConfig::from_json(&json).unwrap_or_else(|e| {
                eprintln!("Invalid config {}: {}", path, e);
                std::process::exit(1);
            })
        }
        None => default_config(),
    };
    let stages = config.infection.stages;

    println!("=== Headless Outbreak ===");
    println!("Particles: {}", count);
    println!("Stages: {}", stages);
    println!();

    let mut rng = rand::thread_rng();
    let mut particles: Vec<Particle> = (0..count)
        .map(|_| {
            let pos = Vec2::new(rng.gen_range(0.0..WIDTH), rng.gen_range(0.0..HEIGHT));
            Particle::new(pos, rng.gen_range(1.0..3.0), 0.6)
        })
        .collect();

    let mut interactions = Interactions::new(config);
    let mut pointer = Pointer::new();
    let mut time = Time::new();
    time.set_fixed_delta(Some(1.0 / 60.0));
    let mut vertices: Vec<LineVertex> = Vec::new();

    interactions.seed_infections(&mut particles, time.now());

    for frame_index in 0..(60 * 20) {
        let (now, _) = time.update();

        let sweep = (now * 0.5).sin() * 0.5 + 0.5;
        pointer.move_to(Vec2::new(sweep * WIDTH, HEIGHT * 0.5));
        if frame_index % 180 == 0 {
            pointer.press(now);
        } else {
            pointer.release();
        }

        let frame = interactions.frame(&mut particles, &pointer, now);
        vertices.clear();
        interactions.render(&frame, &particles, &mut vertices);

        if frame_index % 60 == 0 {
            let stats = InfectionEngine::stats(&particles, stages);
            let bubbled = particles.iter().filter(|p| !p.bubble.is_empty()).count();
            println!(
                "t={:5.1}s  links={:5}  bubbled={:4}  healthy={:5}  stages={:?}",
                now,
                frame.lines.len(),
                bubbled,
                stats.healthy,
                stats.per_stage
            );
        }
    }
}

fn default_config() -> InteractionConfig {
    let mut config = InteractionConfig::new();
    config
        .hover_bubble()
        .bubble(120.0, 8.0, 1.0, 0.4)
        .links(110.0, 0.5)
        .infection(18.0, 3, 1.5, 2.5);
    config.infection.initial_infections = 4;
    config.infection.tick_interval = 0.1;
    config
}

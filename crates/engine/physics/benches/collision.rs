//! Benchmark for the collision sweep
//!
//! Measures a single blocked sweep and a full wall slide of an
//! over-triangulated body against a small room.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use escher_core::Mesh;
use escher_physics::{slide, sweep, Body};
use glam::Vec3;

/// Benchmark configuration
struct BenchConfig {
    room_half_size: f32,
    room_subdivisions: u32,
    body_subdivisions: u32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            room_half_size: 4.0,
            room_subdivisions: 8,
            body_subdivisions: 2,
        }
    }
}

/// Inward-facing box room
fn create_room(config: &BenchConfig) -> Mesh {
    let half = config.room_half_size;
    Mesh::cuboid(
        Vec3::new(-half, 0.0, -half),
        Vec3::new(half, 2.0 * half, half),
        config.room_subdivisions,
    )
    .flipped()
}

fn create_body(config: &BenchConfig) -> Mesh {
    Mesh::cuboid(
        Vec3::new(-0.25, 0.0, -0.25),
        Vec3::new(0.25, 1.75, 0.25),
        config.body_subdivisions,
    )
}

fn bench_sweep(c: &mut Criterion) {
    let config = BenchConfig::default();
    let room = create_room(&config);
    let body = create_body(&config);
    let environment = [Body::fixed(&room)];
    let start = Body::fixed(&body).translated(Vec3::new(0.0, 0.5, 0.0));

    c.bench_function("sweep_blocked", |b| {
        b.iter(|| {
            black_box(sweep(
                &start,
                &environment,
                black_box(Vec3::new(0.0, -1.0, 0.0)),
                true,
            ))
        });
    });
}

fn bench_slide(c: &mut Criterion) {
    let config = BenchConfig::default();
    let room = create_room(&config);
    let body = create_body(&config);
    let environment = [Body::fixed(&room)];
    let start = Body::fixed(&body).translated(Vec3::new(0.0, 0.0, 3.5));

    c.bench_function("slide_along_wall", |b| {
        b.iter(|| {
            black_box(slide(
                &start,
                &environment,
                black_box(Vec3::new(-1.0, 0.0, 1.0)),
                8,
            ))
        });
    });
}

criterion_group!(benches, bench_sweep, bench_slide);

criterion_main!(benches);

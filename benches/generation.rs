//! Criterion benchmarks for city generation.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, Criterion};
use lsystem_city::procgen::grammar::{expand, ExpansionLimit, RuleSet};
use lsystem_city::procgen::roads::{RoadGraph, RoadType};
use lsystem_city::procgen::stitcher::{stitch, StitchConfig};
use lsystem_city::procgen::turtle::{plot, PlotConfig};
use lsystem_city::{generate_city, CityGenConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

fn seeded(angle: f32, target: usize) -> CityGenConfig {
    CityGenConfig {
        turn_angle: angle,
        limit: ExpansionLimit::DrawSymbols(target),
        seed: Some(42),
        ..Default::default()
    }
}

fn bench_grid_city(c: &mut Criterion) {
    let config = seeded(90.0, 600);
    c.bench_function("generate_grid_600", |b| {
        b.iter(|| generate_city(black_box(&config), &mut config.make_rng()))
    });
}

fn bench_hexagonal_city(c: &mut Criterion) {
    let config = seeded(60.0, 600);
    c.bench_function("generate_hexagonal_600", |b| {
        b.iter(|| generate_city(black_box(&config), &mut config.make_rng()))
    });
}

fn bench_stitch_only(c: &mut Criterion) {
    let rules = RuleSet::grid();
    let mut rng = StdRng::seed_from_u64(42);
    let Ok(instructions) = expand(&rules, ExpansionLimit::DrawSymbols(1_000), &mut rng) else {
        return;
    };
    let Ok(plotted) = plot(&instructions, &PlotConfig::for_rules(&rules, 90.0, 15.0, 0.5), None) else {
        return;
    };
    let roads = RoadGraph::from_segments(&plotted.edges, RoadType::Main);
    let config = StitchConfig::default();

    c.bench_function("stitch_grid_1000", |b| {
        b.iter(|| {
            let mut roads = roads.clone();
            stitch(&mut roads, black_box(&config))
        })
    });
}

fn bench_path_queries(c: &mut Criterion) {
    let config = seeded(90.0, 1_000);
    let Ok(city) = generate_city(&config, &mut config.make_rng()) else {
        return;
    };
    let last = city.nodes().len().saturating_sub(1);

    c.bench_function("astar_first_to_last", |b| {
        b.iter(|| city.request_path(black_box(0), black_box(last)))
    });
}

criterion_group!(
    benches,
    bench_grid_city,
    bench_hexagonal_city,
    bench_stitch_only,
    bench_path_queries
);
criterion_main!(benches);

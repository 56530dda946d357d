use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use minesweep_core::*;
use std::hint::black_box;

const TIERS: [(&str, GameConfig); 3] = [
    ("beginner", GameConfig::beginner()),
    ("intermediate", GameConfig::intermediate()),
    ("expert", GameConfig::expert()),
];

fn center(config: GameConfig) -> Coord2 {
    (config.rows() / 2, config.cols() / 2)
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for (name, config) in TIERS {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, &config| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                SafeZoneGenerator::new(seed).generate(black_box(config), center(config))
            })
        });
    }
    group.finish();
}

fn bench_first_reveal(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_reveal");
    for (name, config) in TIERS {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, &config| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                let mut session = GameSession::new(config, seed).expect("preset is valid");
                session.reveal(black_box(center(config)))
            })
        });
    }
    group.finish();
}

fn bench_flood_fill(c: &mut Criterion) {
    // an empty board opens completely from one click
    let layout = MineLayout::from_mine_coords((255, 255), &[]).expect("no mines to place");
    c.bench_function("flood_fill/255x255", |b| {
        b.iter(|| {
            let mut session = GameSession::with_layout(layout.clone());
            session.reveal(black_box((127, 127)))
        })
    });
}

criterion_group!(benches, bench_generate, bench_first_reveal, bench_flood_fill);
criterion_main!(benches);

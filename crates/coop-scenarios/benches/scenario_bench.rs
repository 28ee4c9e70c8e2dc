use coop_core::{Catalog, PlayerConfig, SimParams};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn roster(n: usize) -> Vec<PlayerConfig> {
    (0..n)
        .map(|i| PlayerConfig {
            name: format!("p{i}"),
            ..PlayerConfig::default()
        })
        .collect()
}

fn bench_sweep(c: &mut Criterion) {
    let catalog = Catalog::standard();
    let params = SimParams::default();
    let presets = coop_scenarios::standard_presets();
    let players = roster(10);
    c.bench_function("standard presets x 10 players", |b| {
        b.iter(|| {
            let _ = black_box(coop_scenarios::run_presets(
                &players, &params, &catalog, &presets,
            ));
        })
    });
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);

use coop_core::{Catalog, EquipmentCategory, PlayerConfig, SimParams};
use criterion::{criterion_group, criterion_main, Criterion};

fn roster(catalog: &Catalog, n: usize) -> Vec<PlayerConfig> {
    let defl = catalog
        .find(EquipmentCategory::Deflector, "T4L Deflector")
        .unwrap_or(0);
    let siab = catalog.find(EquipmentCategory::Siab, "T4L SIAB").unwrap_or(0);
    (0..n)
        .map(|i| {
            let mut p = PlayerConfig {
                name: format!("p{i}"),
                ..PlayerConfig::default()
            };
            p.loadout.deflector = defl;
            if i % 2 == 0 {
                p.loadout.siab = siab;
            }
            p
        })
        .collect()
}

fn bench_runs(c: &mut Criterion) {
    let catalog = Catalog::standard();
    let params = SimParams::default();
    let small = roster(&catalog, 4);
    let full = roster(&catalog, 40);
    c.bench_function("simulate_4_players", |b| {
        b.iter(|| coop_runtime::simulate(&small, &params, &catalog))
    });
    c.bench_function("simulate_40_players", |b| {
        b.iter(|| coop_runtime::simulate(&full, &params, &catalog))
    });
}

criterion_group!(benches, bench_runs);
criterion_main!(benches);

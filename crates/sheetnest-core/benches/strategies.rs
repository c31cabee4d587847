use criterion::{criterion_group, criterion_main, Criterion};

use sheetnest_core::config::NestConfig;
use sheetnest_core::model::{Design, Point, SheetPreset};
use sheetnest_core::packer::blf::BlfPacker;
use sheetnest_core::packer::grid::{MixedGridPacker, RotationSweepPacker};
use sheetnest_core::packer::NestStrategy;
use sheetnest_core::pipeline::JobControl;

fn box_design() -> Design {
    Design::new(
        "box",
        "Sample box",
        vec![vec![
            Point::new(10.0, 10.0),
            Point::new(190.0, 10.0),
            Point::new(190.0, 60.0),
            Point::new(140.0, 60.0),
            Point::new(140.0, 140.0),
            Point::new(10.0, 140.0),
        ]],
    )
    .unwrap()
}

fn bench_strategies(c: &mut Criterion) {
    let design = box_design();
    let sheet = SheetPreset::new("b1", "B1", 728.0, 1030.0, "iso-b");
    let cfg = NestConfig::builder().margin(3.0).build();

    let mut group = c.benchmark_group("strategies");
    group.sample_size(10);

    group.bench_function("grid_sweep", |b| {
        b.iter(|| {
            RotationSweepPacker { margin: cfg.margin }
                .pack(&design, &sheet, &mut JobControl::new())
                .unwrap()
        })
    });
    group.bench_function("grid_mixed", |b| {
        b.iter(|| {
            MixedGridPacker {
                margin: cfg.margin,
                rule: cfg.main_polygon,
            }
            .pack(&design, &sheet, &mut JobControl::new())
            .unwrap()
        })
    });
    group.bench_function("nfp_blf", |b| {
        b.iter(|| {
            BlfPacker::from_config(&cfg)
                .run(&design, &sheet, &mut JobControl::new())
                .unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);

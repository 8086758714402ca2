use depix::lowlevel::{DirectScalar, Kernel, PatchPlan, ReferencePlanes, UniformFill};
use depix::{
    depixelize, pixelate, AveragingMode, Color, DepixConfig, MatchConfig, NullSink, PixelGrid,
    PixelationMode,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn make_image(width: usize, height: usize) -> PixelGrid {
    PixelGrid::from_fn(width, height, |x, y| {
        let v = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
        Color::new(v as u8, (v as u8).wrapping_add(64), ((x + y) & 0xFF) as u8)
    })
    .unwrap()
}

fn bench_kernels(c: &mut Criterion) {
    let reference = make_image(512, 256);
    let planes = ReferencePlanes::build(&reference, AveragingMode::GammaCorrected).unwrap();
    let plan = PatchPlan::uniform(Color::new(120, 80, 200), 8, 8, AveragingMode::GammaCorrected)
        .unwrap();

    c.bench_function("reference_planes_512x256", |b| {
        b.iter(|| black_box(ReferencePlanes::build(&reference, AveragingMode::Linear).unwrap()));
    });

    c.bench_function("uniform_score_map_8x8", |b| {
        b.iter(|| black_box(UniformFill::score_map(&planes, &plan).unwrap()));
    });

    c.bench_function("direct_score_map_8x8", |b| {
        b.iter(|| black_box(DirectScalar::score_map(&planes, &plan).unwrap()));
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let reference = make_image(256, 128);
    let pixelated = pixelate(&reference, 8, PixelationMode::Gamma).unwrap();
    let seq_cfg = DepixConfig::default();

    c.bench_function("depixelize_256x128_block8", |b| {
        b.iter(|| black_box(depixelize(&pixelated, &reference, &seq_cfg, &NullSink).unwrap()));
    });

    if cfg!(feature = "rayon") {
        let par_cfg = DepixConfig {
            matching: MatchConfig {
                parallel: true,
                ..MatchConfig::default()
            },
            ..DepixConfig::default()
        };
        c.bench_function("depixelize_256x128_block8_parallel", |b| {
            b.iter(|| black_box(depixelize(&pixelated, &reference, &par_cfg, &NullSink).unwrap()));
        });
    }
}

criterion_group!(benches, bench_kernels, bench_pipeline);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, Criterion};

use colorcraft::model::FormatOptions;
use colorcraft::{registry, Color};

pub fn run_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("model-conversion");
    group.sample_size(50);

    let red = Color::from("color(display-p3 1 0 0)").expect("display-p3 red parses");

    group.bench_function("display-p3-to-oklch", |b| {
        b.iter(|| red.in_model(registry(), "oklch").unwrap())
    });

    group.bench_function("display-p3-to-lab", |b| {
        b.iter(|| red.in_model(registry(), "lab").unwrap())
    });

    group.bench_function("srgb-to-xyz-d65-roundtrip", |b| {
        b.iter(|| {
            let xyz = red.in_model(registry(), "xyz-d65").unwrap();
            xyz.in_model(registry(), "srgb").unwrap()
        })
    });

    group.finish();

    let mut group = c.benchmark_group("gamut-fit");
    group.sample_size(50);

    let options = FormatOptions::new("css-gamut-map");
    group.bench_function("css-gamut-map-out-of-gamut-oklch", |b| {
        b.iter(|| red.to(registry(), "srgb", &options).unwrap())
    });

    let clip_options = FormatOptions::new("clip");
    group.bench_function("clip-out-of-gamut-oklch", |b| {
        b.iter(|| red.to(registry(), "srgb", &clip_options).unwrap())
    });

    group.finish();
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);

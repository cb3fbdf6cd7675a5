use criterion::{criterion_group, criterion_main, Criterion};

use fractalcast_core::{render_to_sink_at, ColourScheme, Destination, Fractal, Frame, PlotContext};
use fractalcast_precision::PrecisionMode;

fn ctx(width: usize, height: usize, max_iterations: u32) -> PlotContext {
    PlotContext::new(
        Fractal::Mandelbrot,
        Frame::new(-2.0, -1.2, 1.0, 1.2),
        max_iterations,
        width,
        height,
        ColourScheme::All,
        PrecisionMode::Standard,
        true,
    )
    .unwrap()
}

fn fast(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let destination = Destination::File(dir.path().join("bench.ppm"));
    let mut group = c.benchmark_group("fast");

    for &(width, height) in &[(480, 320), (720, 480), (1080, 720)] {
        let plot = ctx(width, height, 255);
        group.bench_function(format!("{width}x{height} render, 4 threads"), |b| {
            b.iter(|| render_to_sink_at(&plot, &destination, 1 << 20, 4).unwrap());
        });
    }
}

fn slow(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let destination = Destination::File(dir.path().join("bench.ppm"));
    let mut group = c.benchmark_group("slow");
    group.sample_size(10);

    let plot = ctx(2160, 1440, 255);
    group.bench_function("2160x1440 render, 4 threads", |b| {
        b.iter(|| render_to_sink_at(&plot, &destination, 1 << 20, 4).unwrap());
    });

    let deep = ctx(1080, 720, 2000);
    group.bench_function("1080x720, 2000 iterations", |b| {
        b.iter(|| render_to_sink_at(&deep, &destination, 1 << 20, 4).unwrap());
    });
}

criterion_group!(benches, fast, slow);
criterion_main!(benches);

//! Frame render benchmarks.
//! Run: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use inkshake::displacement::generate_displacement;
use inkshake::frame::{render_frame, RenderParams};

fn line_art(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        if (x + y) % 37 < 3 || (x * 3 + y) % 53 < 2 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    }))
}

fn bench_render(c: &mut Criterion) {
    let source = line_art(1280, 720);

    let mut group = c.benchmark_group("render_frame");
    group.sample_size(20);

    for (label, antialias) in [("nearest_720p", false), ("bilinear_720p", true)] {
        let params = RenderParams {
            strength: 3.0,
            cell_count: 12,
            antialias,
            ..RenderParams::default()
        };
        group.bench_function(label, |b| {
            b.iter(|| black_box(render_frame(&source, &params).expect("render")));
        });
    }

    group.bench_function("displacement_720p", |b| {
        b.iter(|| black_box(generate_displacement(1280, 720, 12, 7, 3.0).expect("field")));
    });

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);

//! Codec performance benchmarks
//!
//! Benchmarks for the depth-domain transforms and the full encode/decode
//! pipeline over the bit-exact passthrough video backend, so the numbers
//! reflect the depth codec rather than the inner video coder.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zdv::codec::{filter_image, quantize_image, rescale_image, DepthCompressor};
use zdv::video::{RawVideoCodec, VideoParameters};

/// A plausible depth scene: smooth ramps with sensor holes
fn test_depth_image(width: usize, height: usize) -> Vec<u16> {
    let mut depth = vec![0u16; width * height];
    for y in 0..height {
        for x in 0..width {
            let d = 600 + ((x * 7 + y * 11) % 4000) as u16;
            depth[y * width + x] = if (x * y) % 23 == 0 { 0 } else { d };
        }
    }
    depth
}

fn bench_quantize(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantize");

    for &(width, height) in &[(320usize, 288usize), (640, 576)] {
        let depth = test_depth_image(width, height);
        let mut quantized = Vec::new();
        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &depth,
            |b, depth| {
                b.iter(|| {
                    quantize_image(black_box(depth), &mut quantized);
                    black_box(&quantized);
                })
            },
        );
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for &(width, height) in &[(320usize, 288usize), (640, 576)] {
        let depth = test_depth_image(width, height);
        let mut codes = Vec::new();
        quantize_image(&depth, &mut codes);
        rescale_image(&mut codes);

        let mut high = Vec::new();
        let mut low = Vec::new();
        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &codes,
            |b, codes| {
                b.iter(|| {
                    filter_image(black_box(codes), &mut high, &mut low);
                    black_box(&low);
                })
            },
        );
    }

    group.finish();
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");

    for &(width, height) in &[(320u32, 288u32), (640, 576)] {
        let depth = test_depth_image(width as usize, height as usize);
        let params = VideoParameters {
            width,
            height,
            ..Default::default()
        };
        let mut session = DepthCompressor::with_video_codec(Box::new(RawVideoCodec::new()));

        group.throughput(Throughput::Elements(u64::from(width * height)));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &depth,
            |b, depth| {
                b.iter(|| {
                    let frame = session.compress(&params, black_box(depth), true);
                    black_box(frame)
                })
            },
        );
    }

    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");

    for &(width, height) in &[(320u32, 288u32), (640, 576)] {
        let depth = test_depth_image(width as usize, height as usize);
        let params = VideoParameters {
            width,
            height,
            ..Default::default()
        };
        let mut encoder = DepthCompressor::with_video_codec(Box::new(RawVideoCodec::new()));
        let frame = encoder.compress(&params, &depth, true);

        let mut decoder = DepthCompressor::with_video_codec(Box::new(RawVideoCodec::new()));
        let mut depth_out = Vec::new();
        group.throughput(Throughput::Elements(u64::from(width * height)));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &frame,
            |b, frame| {
                b.iter(|| {
                    decoder
                        .decompress(black_box(frame), &mut depth_out)
                        .unwrap();
                    black_box(&depth_out);
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_quantize,
    bench_filter,
    bench_compress,
    bench_decompress
);
criterion_main!(benches);

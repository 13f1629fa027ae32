//! Benchmarks for waveshaping distortion.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_kick::dsp::distortion;

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut output = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("soft_clip", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in output.iter_mut().zip(&input) {
                    *out = distortion::soft_clip(black_box(x), black_box(4.0));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("hard_clip", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in output.iter_mut().zip(&input) {
                    *out = distortion::hard_clip(black_box(x), black_box(2.0), 1.0);
                }
            })
        });
    }

    group.finish();
}

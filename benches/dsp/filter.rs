//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_kick::dsp::filter::{FilterKind, SVFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut output = vec![0.0f32; size];

        // Fixed cutoff: coefficients stay cached
        let mut filter = SVFilter::new(SAMPLE_RATE);
        filter.set_params(800.0, 0.707);
        group.bench_with_input(BenchmarkId::new("lowpass_static", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in output.iter_mut().zip(&input) {
                    *out = filter.process(black_box(x), FilterKind::LowPass);
                }
            })
        });

        // Sweeping cutoff: coefficients recomputed every sample
        let mut filter = SVFilter::new(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("lowpass_sweep", size), &size, |b, &size| {
            b.iter(|| {
                for (i, (out, &x)) in output.iter_mut().zip(&input).enumerate() {
                    let cutoff = 8_000.0 - 7_000.0 * i as f32 / size as f32;
                    filter.set_params(cutoff, 2.0);
                    *out = filter.process(black_box(x), FilterKind::LowPass);
                }
            })
        });
    }

    group.finish();
}

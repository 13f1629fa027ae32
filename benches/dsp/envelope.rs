//! Benchmarks for breakpoint envelope evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_kick::dsp::envelope::{EnvelopeCurve, Interpolation};

use crate::BLOCK_SIZES;

/// Curve with `n` points spread evenly across [0, 1].
fn curve_with_points(n: usize) -> EnvelopeCurve {
    let mut curve = EnvelopeCurve::new();
    for i in 1..n - 1 {
        let x = i as f32 / (n - 1) as f32;
        curve.add_point(x, 1.0 - x * x).ok();
    }
    curve
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    // Point counts a hand-drawn kick curve plausibly reaches
    for &points in &[2usize, 8, 64] {
        let linear = curve_with_points(points);
        let cosine = linear.clone().with_interpolation(Interpolation::Cosine);

        for &size in BLOCK_SIZES {
            let mut output = vec![0.0f32; size];

            group.bench_with_input(
                BenchmarkId::new(format!("linear_{points}pt"), size),
                &size,
                |b, &size| {
                    b.iter(|| {
                        for (i, out) in output.iter_mut().enumerate() {
                            *out = linear.value_at(black_box(i as f32 / size as f32));
                        }
                    })
                },
            );

            group.bench_with_input(
                BenchmarkId::new(format!("cosine_{points}pt"), size),
                &size,
                |b, &size| {
                    b.iter(|| {
                        for (i, out) in output.iter_mut().enumerate() {
                            *out = cosine.value_at(black_box(i as f32 / size as f32));
                        }
                    })
                },
            );
        }
    }

    group.finish();
}

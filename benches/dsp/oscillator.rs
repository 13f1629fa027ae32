//! Benchmarks for waveform evaluation and noise generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_kick::dsp::oscillator::{NoiseSource, NoiseType, PhaseAccumulator, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let waveforms = [
        ("sine", Waveform::Sine),
        ("square", Waveform::Square),
        ("triangle", Waveform::Triangle),
        ("sawtooth", Waveform::Sawtooth),
    ];

    for &size in BLOCK_SIZES {
        let mut output = vec![0.0f32; size];

        for (name, waveform) in waveforms {
            let mut phase = PhaseAccumulator::new();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for out in output.iter_mut() {
                        *out = waveform.evaluate(phase.next(black_box(55.0), SAMPLE_RATE));
                    }
                })
            });
        }

        for (name, noise_type) in [("white", NoiseType::White), ("brownian", NoiseType::Brownian)] {
            let mut noise = NoiseSource::new(7);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for out in output.iter_mut() {
                        *out = noise.next(black_box(noise_type));
                    }
                })
            });
        }
    }

    group.finish();
}

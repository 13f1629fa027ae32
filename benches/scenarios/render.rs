//! Whole-kick rendering through the engine, and the cost of publishing edits.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_kick::{
    create_instance_with_patch, dsp::filter::FilterKind, EngineConfig, EnvelopeTarget, KickInstance,
    KickPatch, LayerId, OscillatorId,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// All three layers on, every stage enabled.
fn full_patch() -> KickPatch {
    let mut patch = KickPatch::new();
    for id in LayerId::ALL {
        let layer = patch.layer_mut(id);
        layer.set_enabled(true);
        layer.set_length(1.0).ok();
        layer.oscillator_mut(OscillatorId::Tone2).set_enabled(true);
        layer.oscillator_mut(OscillatorId::Noise).set_enabled(true);
        layer.filter_mut().set_enabled(true);
        layer.filter_mut().set_kind(FilterKind::LowPass);
        layer.distortion_mut().set_enabled(true);
        layer.distortion_mut().set_drive(4.0).ok();
        for i in 1..8 {
            let x = i as f32 / 8.0;
            let target = EnvelopeTarget::FilterCutoff { layer: id };
            if let Ok(curve) = patch.envelope_mut(target) {
                curve.add_point(x, 1.0 - x).ok();
            }
        }
    }
    patch
}

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);

    for &size in BLOCK_SIZES {
        for (name, patch) in [("default", KickPatch::new()), ("three_layers", full_patch())] {
            let KickInstance { mut engine, .. } = match create_instance_with_patch(config.clone(), patch) {
                Ok(instance) => instance,
                Err(err) => panic!("bench patch rejected: {err}"),
            };
            let mut output = vec![0.0f32; size];

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    if !engine.is_playing() {
                        engine.note_on(1.0);
                    }
                    engine.render_block(black_box(&mut output));
                })
            });
        }
    }

    // Control-path cost of one envelope edit (clone + swap)
    if let Ok(KickInstance { mut controller, .. }) = create_instance_with_patch(config, full_patch()) {
        let target = EnvelopeTarget::FilterCutoff { layer: LayerId::Layer1 };
        group.bench_function("publish_edit", |b| {
            b.iter(|| {
                controller.update_point(target, 3, black_box(0.375), 0.5).ok();
                controller.collect_garbage();
            })
        });
    }

    group.finish();
}

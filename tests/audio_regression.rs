use std::thread;

use saavy_kick::{
    create_instance, create_instance_with_patch,
    dsp::{filter::FilterKind, oscillator::NoiseType},
    io::{midi_to_message, MidiEvent},
    synth::{KickEvent, KickMessage},
    EngineConfig, EnvelopeTarget, KickError, KickInstance, KickPatch, LayerId, OscillatorId,
    StateFormat,
};

fn instance(sample_rate: f32) -> KickInstance {
    create_instance(EngineConfig::default().with_sample_rate(sample_rate)).unwrap()
}

/// Every stage switched on, so regressions anywhere in the chain show up.
fn busy_patch() -> KickPatch {
    let mut patch = KickPatch::new();
    for id in [LayerId::Layer1, LayerId::Layer2] {
        let layer = patch.layer_mut(id);
        layer.set_enabled(true);
        layer.oscillator_mut(OscillatorId::Tone2).set_enabled(true);
        layer.oscillator_mut(OscillatorId::Tone2).set_base_frequency(220.0).unwrap();
        let noise = layer.oscillator_mut(OscillatorId::Noise);
        noise.set_enabled(true);
        noise.set_amplitude(0.3).unwrap();
        noise.set_noise_type(NoiseType::Brownian).unwrap();
        layer.filter_mut().set_enabled(true);
        layer.filter_mut().set_kind(FilterKind::LowPass);
        layer.filter_mut().set_q(4.0).unwrap();
        layer.distortion_mut().set_enabled(true);
        layer.distortion_mut().set_drive(6.0).unwrap();
    }
    patch.layer_mut(LayerId::Layer2).set_length(0.45).unwrap();

    let freq = EnvelopeTarget::OscillatorFrequency {
        layer: LayerId::Layer1,
        oscillator: OscillatorId::Tone1,
    };
    let curve = patch.envelope_mut(freq).unwrap();
    curve.add_point(0.1, 0.4).unwrap();
    curve.update_point(2, 1.0, 0.2).unwrap();

    let cutoff = EnvelopeTarget::FilterCutoff { layer: LayerId::Layer1 };
    patch.envelope_mut(cutoff).unwrap().add_point(0.3, 0.2).unwrap();

    let amp = EnvelopeTarget::LayerAmplitude { layer: LayerId::Layer1 };
    patch.envelope_mut(amp).unwrap().update_point(1, 1.0, 0.0).unwrap();
    patch
}

fn render_kick(instance: &mut KickInstance, frames: usize) -> Vec<f32> {
    instance.controller.note_on(1.0).unwrap();
    (0..frames).map(|_| instance.engine.render_frame()).collect()
}

#[test]
fn renders_a_bounded_audible_kick() {
    let mut kick = instance(48_000.0);
    let samples = render_kick(&mut kick, 14_400);

    assert!(samples.iter().any(|s| s.abs() > 0.1));
    assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
}

#[test]
fn identical_instances_render_identical_samples() {
    let config = EngineConfig::default();
    let mut a = create_instance_with_patch(config.clone(), busy_patch()).unwrap();
    let mut b = create_instance_with_patch(config, busy_patch()).unwrap();

    let left = render_kick(&mut a, 24_000);
    let right = render_kick(&mut b, 24_000);
    assert_eq!(left, right);
    assert!(left.iter().any(|&s| s != 0.0));
}

#[test]
fn retriggering_reproduces_the_kick() {
    let mut kick = create_instance_with_patch(EngineConfig::default(), busy_patch()).unwrap();
    let first = render_kick(&mut kick, 4_096);
    let second = render_kick(&mut kick, 4_096);
    assert_eq!(first, second);
}

#[test]
fn idle_engine_returns_zero_without_advancing() {
    let mut kick = instance(44_100.0);
    for _ in 0..1_000 {
        assert_eq!(kick.engine.render_frame(), 0.0);
    }
    assert_eq!(kick.engine.elapsed_samples(), 0);

    // And again after a kick has finished
    render_kick(&mut kick, 44_100);
    let finished_at = kick.engine.elapsed_samples();
    assert!(!kick.engine.is_playing());
    for _ in 0..1_000 {
        assert_eq!(kick.engine.render_frame(), 0.0);
    }
    assert_eq!(kick.engine.elapsed_samples(), finished_at);
}

#[test]
fn engine_goes_idle_exactly_after_kick_length() {
    for &(sample_rate, length) in &[(48_000.0f32, 0.3f32), (44_100.0, 0.25), (96_000.0, 0.0125)] {
        let mut kick = instance(sample_rate);
        kick.controller.set_layer_length(LayerId::Layer1, length).unwrap();
        let n = (length as f64 * sample_rate as f64).round() as usize;

        kick.controller.note_on(1.0).unwrap();
        for call in 1..=n {
            kick.engine.render_frame();
            if call < n {
                assert!(kick.engine.is_playing(), "idle after {call} of {n} frames");
            }
        }
        assert!(!kick.engine.is_playing(), "still playing after {n} frames");
    }
}

#[test]
fn longest_enabled_layer_sets_kick_length() {
    let mut kick = instance(8_000.0);
    kick.controller.set_layer_enabled(LayerId::Layer3, true).unwrap();
    kick.controller.set_layer_length(LayerId::Layer3, 0.5).unwrap();

    let samples = render_kick(&mut kick, 4_000);
    assert!(!kick.engine.is_playing());
    assert_eq!(kick.engine.elapsed_samples(), 4_000);
    assert!(samples[2_400..].iter().any(|&s| s != 0.0));
}

#[test]
fn truncated_state_is_rejected_and_nothing_changes() {
    let mut kick = create_instance_with_patch(EngineConfig::default(), busy_patch()).unwrap();
    let blob = kick.controller.serialize_state(StateFormat::Binary).unwrap();

    kick.controller.set_master_gain(0.5).unwrap();
    let target = EnvelopeTarget::FilterCutoff { layer: LayerId::Layer1 };
    let points_before = kick.controller.points(target).unwrap().to_vec();
    let patch_before = kick.controller.patch().clone();
    while kick.events.pop().is_ok() {}

    // Cut the blob in the middle of the point lists
    let truncated = &blob[..blob.len() * 2 / 3];
    let result = kick.controller.restore_state(truncated, StateFormat::Binary);

    assert!(matches!(result, Err(KickError::MalformedState { .. })));
    assert_eq!(kick.controller.points(target).unwrap(), points_before.as_slice());
    assert_eq!(kick.controller.patch(), &patch_before);
    assert_eq!(kick.controller.patch().master_gain(), 0.5);
    assert!(kick.events.pop().is_err(), "failed restore must not notify");
}

#[test]
fn state_round_trips_through_both_formats() {
    let mut kick = create_instance_with_patch(EngineConfig::default(), busy_patch()).unwrap();
    kick.controller.select_layer(LayerId::Layer2).unwrap();
    let original = kick.controller.patch().clone();

    for format in [StateFormat::Binary, StateFormat::Json] {
        let blob = kick.controller.serialize_state(format).unwrap();
        let mut other = instance(48_000.0);
        other.controller.restore_state(&blob, format).unwrap();
        assert_eq!(other.controller.patch(), &original);
        assert_eq!(other.controller.patch().selected_layer(), LayerId::Layer2);
    }
}

#[test]
fn restored_state_sounds_identical() {
    let mut source = create_instance_with_patch(EngineConfig::default(), busy_patch()).unwrap();
    let blob = source.controller.serialize_state(StateFormat::Binary).unwrap();

    let mut target = instance(48_000.0);
    target.controller.restore_state(&blob, StateFormat::Binary).unwrap();

    assert_eq!(render_kick(&mut source, 8_192), render_kick(&mut target, 8_192));
}

#[test]
fn edits_emit_state_changed() {
    let mut kick = instance(48_000.0);
    assert!(kick.events.pop().is_err());

    let target = EnvelopeTarget::OscillatorAmplitude {
        layer: LayerId::Layer1,
        oscillator: OscillatorId::Tone1,
    };
    kick.controller.add_point(target, 0.5, 0.25).unwrap();
    assert_eq!(kick.events.pop(), Ok(KickEvent::StateChanged));

    assert!(kick.controller.add_point(target, 0.5, 0.9).is_err());
    assert!(kick.events.pop().is_err());
}

#[test]
fn edits_apply_on_the_next_frame() {
    let mut kick = instance(48_000.0);
    let before = render_kick(&mut kick, 16);
    assert!(before.iter().any(|&s| s != 0.0));

    kick.controller.set_layer_amplitude(LayerId::Layer1, 0.0).unwrap();
    for _ in 0..16 {
        assert_eq!(kick.engine.render_frame(), 0.0);
    }
}

#[test]
fn midi_note_on_triggers_the_kick() {
    let mut kick = instance(48_000.0);
    let event = MidiEvent::from_bytes(&[0x99, 36, 127]).unwrap();
    let msg = midi_to_message(event, None).unwrap();
    assert_eq!(msg, KickMessage::NoteOn { velocity: 1.0 });

    let KickMessage::NoteOn { velocity } = msg else {
        unreachable!()
    };
    kick.controller.note_on(velocity).unwrap();
    kick.engine.render_frame();
    assert!(kick.engine.is_playing());
    assert_eq!(kick.engine.velocity(), 1.0);
}

#[test]
fn concurrent_edits_never_disturb_rendering() {
    let KickInstance {
        mut engine,
        mut controller,
        ..
    } = create_instance_with_patch(EngineConfig::default(), busy_patch()).unwrap();

    let audio = thread::spawn(move || {
        let mut block = [0.0f32; 256];
        let mut max = 0.0f32;
        for i in 0..400 {
            if i % 40 == 0 {
                engine.note_on(1.0);
            }
            engine.render_block(&mut block);
            for &s in &block {
                assert!(s.is_finite() && s.abs() <= 1.0);
                max = max.max(s.abs());
            }
        }
        max
    });

    let target = EnvelopeTarget::FilterCutoff { layer: LayerId::Layer1 };
    for i in 0..500 {
        let y = (i % 100) as f32 / 100.0;
        controller.update_point(target, 1, 0.3, y).unwrap();
        controller.set_base_frequency(LayerId::Layer2, OscillatorId::Tone1, 40.0 + i as f32).unwrap();
        controller.collect_garbage();
    }

    let max = audio.join().unwrap();
    assert!(max > 0.0);

    // Once the audio thread is gone, every retired snapshot can be released
    controller.collect_garbage();
    assert_eq!(controller.retired_count(), 0);
}

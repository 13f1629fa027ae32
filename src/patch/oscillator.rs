use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        envelope::EnvelopeCurve,
        oscillator::{NoiseSource, NoiseType, PhaseAccumulator, Waveform},
    },
    error::{check_range, KickError, Result},
    patch::normalized_time,
};

/*
Kick Oscillators
================

Each layer carries three oscillators in fixed slots:

  Tone1, Tone2   Tonal. A waveform at `base_frequency`, with a frequency
                 envelope that scales the pitch over the kick. A falling
                 frequency envelope is what turns a sine into a kick.

  Noise          A seeded noise burst. No pitch, so no frequency envelope.

Both kinds have an amplitude envelope and an amplitude scalar:

  sample = amplitude * amp_env(tn) * wave

where tn is the normalized time (elapsed / kick length). For tonal slots the
instantaneous frequency is

  freq = base_frequency * freq_env(tn)

integrated into a running phase one sample at a time, so the output depends
only on how many samples have been rendered, never on wall-clock time.

The parameters here are read-only during rendering. Everything that changes
per sample (phase, noise generator) lives in `OscillatorState`, owned by the
engine.
*/

pub const MIN_FREQUENCY_HZ: f32 = 1.0;
pub const MAX_FREQUENCY_HZ: f32 = 20_000.0;
pub const DEFAULT_FREQUENCY_HZ: f32 = 150.0;
pub const DEFAULT_NOISE_SEED: u64 = 0x5EED_0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OscillatorId {
    Tone1,
    Tone2,
    Noise,
}

impl OscillatorId {
    pub const ALL: [OscillatorId; 3] = [OscillatorId::Tone1, OscillatorId::Tone2, OscillatorId::Noise];

    pub fn index(self) -> usize {
        match self {
            OscillatorId::Tone1 => 0,
            OscillatorId::Tone2 => 1,
            OscillatorId::Noise => 2,
        }
    }

    pub fn is_tonal(self) -> bool {
        !matches!(self, OscillatorId::Noise)
    }

    pub fn name(self) -> &'static str {
        match self {
            OscillatorId::Tone1 => "oscillator 1",
            OscillatorId::Tone2 => "oscillator 2",
            OscillatorId::Noise => "noise",
        }
    }
}

/// What the oscillator generates. The variant always matches the slot:
/// tonal slots hold `Tonal`, the noise slot holds `Noise`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OscillatorSource {
    Tonal {
        waveform: Waveform,
        base_frequency: f32,
        frequency_envelope: EnvelopeCurve,
    },
    Noise {
        noise_type: NoiseType,
        seed: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Oscillator {
    id: OscillatorId,
    enabled: bool,
    amplitude: f32,
    amplitude_envelope: EnvelopeCurve,
    source: OscillatorSource,
}

impl Oscillator {
    /// Default oscillator for a slot: 150 Hz sine for tonal slots, white
    /// noise for the noise slot. Only `Tone1` starts enabled.
    pub fn new(id: OscillatorId) -> Self {
        let source = if id.is_tonal() {
            OscillatorSource::Tonal {
                waveform: Waveform::Sine,
                base_frequency: DEFAULT_FREQUENCY_HZ,
                frequency_envelope: EnvelopeCurve::new(),
            }
        } else {
            OscillatorSource::Noise {
                noise_type: NoiseType::White,
                seed: DEFAULT_NOISE_SEED,
            }
        };

        Self {
            id,
            enabled: id == OscillatorId::Tone1,
            amplitude: 1.0,
            amplitude_envelope: EnvelopeCurve::new(),
            source,
        }
    }

    /// Noise slot oscillator seeded with `seed`.
    pub fn noise(seed: u64) -> Self {
        Self {
            source: OscillatorSource::Noise {
                noise_type: NoiseType::White,
                seed,
            },
            ..Self::new(OscillatorId::Noise)
        }
    }

    pub fn id(&self) -> OscillatorId {
        self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn set_amplitude(&mut self, amplitude: f32) -> Result<()> {
        self.amplitude = check_range("oscillator amplitude", amplitude, 0.0, 1.0)?;
        Ok(())
    }

    pub fn source(&self) -> &OscillatorSource {
        &self.source
    }

    pub fn amplitude_envelope(&self) -> &EnvelopeCurve {
        &self.amplitude_envelope
    }

    pub fn amplitude_envelope_mut(&mut self) -> &mut EnvelopeCurve {
        &mut self.amplitude_envelope
    }

    pub fn frequency_envelope(&self) -> Option<&EnvelopeCurve> {
        match &self.source {
            OscillatorSource::Tonal { frequency_envelope, .. } => Some(frequency_envelope),
            OscillatorSource::Noise { .. } => None,
        }
    }

    pub fn frequency_envelope_mut(&mut self) -> Result<&mut EnvelopeCurve> {
        match &mut self.source {
            OscillatorSource::Tonal { frequency_envelope, .. } => Ok(frequency_envelope),
            OscillatorSource::Noise { .. } => {
                Err(KickError::Unsupported("noise oscillator has no frequency envelope"))
            }
        }
    }

    pub fn waveform(&self) -> Option<Waveform> {
        match self.source {
            OscillatorSource::Tonal { waveform, .. } => Some(waveform),
            OscillatorSource::Noise { .. } => None,
        }
    }

    pub fn set_waveform(&mut self, shape: Waveform) -> Result<()> {
        match &mut self.source {
            OscillatorSource::Tonal { waveform, .. } => {
                *waveform = shape;
                Ok(())
            }
            OscillatorSource::Noise { .. } => {
                Err(KickError::Unsupported("noise oscillator has no waveform"))
            }
        }
    }

    pub fn base_frequency(&self) -> Option<f32> {
        match self.source {
            OscillatorSource::Tonal { base_frequency, .. } => Some(base_frequency),
            OscillatorSource::Noise { .. } => None,
        }
    }

    pub fn set_base_frequency(&mut self, frequency: f32) -> Result<()> {
        let frequency = check_range("base frequency", frequency, MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)?;
        match &mut self.source {
            OscillatorSource::Tonal { base_frequency, .. } => {
                *base_frequency = frequency;
                Ok(())
            }
            OscillatorSource::Noise { .. } => {
                Err(KickError::Unsupported("noise oscillator has no base frequency"))
            }
        }
    }

    pub fn set_noise_type(&mut self, kind: NoiseType) -> Result<()> {
        match &mut self.source {
            OscillatorSource::Noise { noise_type, .. } => {
                *noise_type = kind;
                Ok(())
            }
            OscillatorSource::Tonal { .. } => {
                Err(KickError::Unsupported("tonal oscillator has no noise type"))
            }
        }
    }

    pub fn set_noise_seed(&mut self, value: u64) -> Result<()> {
        match &mut self.source {
            OscillatorSource::Noise { seed, .. } => {
                *seed = value;
                Ok(())
            }
            OscillatorSource::Tonal { .. } => {
                Err(KickError::Unsupported("tonal oscillator has no noise seed"))
            }
        }
    }

    /// Compute one sample at `t` seconds into a layer lasting
    /// `layer_duration` seconds. Advances `state` by one sample.
    #[inline]
    pub fn sample(
        &self,
        state: &mut OscillatorState,
        t: f32,
        layer_duration: f32,
        sample_rate: f32,
    ) -> f32 {
        if !self.enabled {
            return 0.0;
        }

        let tn = normalized_time(t, layer_duration);
        let amplitude = self.amplitude * self.amplitude_envelope.value_at(tn);

        let wave = match &self.source {
            OscillatorSource::Tonal {
                waveform,
                base_frequency,
                frequency_envelope,
            } => {
                let frequency =
                    (base_frequency * frequency_envelope.value_at(tn)).clamp(0.0, sample_rate * 0.5);
                let phase = state.phase.next(frequency, sample_rate);
                waveform.evaluate(phase)
            }
            OscillatorSource::Noise { noise_type, .. } => state.noise.next(*noise_type),
        };

        amplitude * wave
    }

    /// Check a decoded oscillator before it is allowed into a patch.
    pub(crate) fn validate(&self, slot: OscillatorId) -> Result<()> {
        if self.id != slot {
            return Err(KickError::malformed(format!(
                "{} stored in the {} slot",
                self.id.name(),
                slot.name()
            )));
        }
        check_range("oscillator amplitude", self.amplitude, 0.0, 1.0)?;

        match (&self.source, slot.is_tonal()) {
            (OscillatorSource::Tonal { base_frequency, .. }, true) => {
                check_range("base frequency", *base_frequency, MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)?;
                Ok(())
            }
            (OscillatorSource::Noise { .. }, false) => Ok(()),
            _ => Err(KickError::malformed(format!(
                "{} has the wrong source kind",
                slot.name()
            ))),
        }
    }
}

/// Per-sample state for one oscillator.
#[derive(Debug, Clone)]
pub struct OscillatorState {
    phase: PhaseAccumulator,
    noise: NoiseSource,
}

impl OscillatorState {
    pub fn new() -> Self {
        Self {
            phase: PhaseAccumulator::new(),
            noise: NoiseSource::new(DEFAULT_NOISE_SEED),
        }
    }

    /// Rewind to the start of a kick for `oscillator`.
    pub fn reset(&mut self, oscillator: &Oscillator) {
        self.phase.reset();
        let seed = match oscillator.source {
            OscillatorSource::Noise { seed, .. } => seed,
            OscillatorSource::Tonal { .. } => self.noise.seed(),
        };
        self.noise.reseed(seed);
    }
}

impl Default for OscillatorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn render(osc: &Oscillator, samples: usize, duration: f32) -> Vec<f32> {
        let mut state = OscillatorState::new();
        state.reset(osc);
        (0..samples)
            .map(|n| osc.sample(&mut state, n as f32 / SAMPLE_RATE, duration, SAMPLE_RATE))
            .collect()
    }

    #[test]
    fn flat_sine_matches_closed_form() {
        let mut osc = Oscillator::new(OscillatorId::Tone1);
        osc.set_base_frequency(440.0).unwrap();

        let out = render(&osc, 128, 1.0);
        for (n, &actual) in out.iter().enumerate() {
            let expected = (TAU * 440.0 * n as f32 / SAMPLE_RATE).sin();
            assert_abs_diff_eq!(actual, expected, epsilon = 1e-4);
        }
    }

    #[test]
    fn disabled_oscillator_is_silent() {
        let osc = Oscillator::new(OscillatorId::Tone2);
        assert!(!osc.is_enabled());
        assert!(render(&osc, 64, 0.3).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn amplitude_envelope_shapes_output() {
        let mut osc = Oscillator::new(OscillatorId::Tone1);
        osc.set_waveform(Waveform::Square).unwrap();
        *osc.amplitude_envelope_mut() = EnvelopeCurve::from_points(&[(0.0, 1.0), (1.0, 0.0)]).unwrap();

        // Square wave magnitude is 1, so the output traces the envelope
        let duration = 0.01;
        let out = render(&osc, 480, duration);
        assert_abs_diff_eq!(out[0].abs(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[240].abs(), 0.5, epsilon = 1e-3);
        assert!(out[479].abs() < 0.01);
    }

    #[test]
    fn falling_frequency_envelope_slows_the_wave() {
        let mut osc = Oscillator::new(OscillatorId::Tone1);
        osc.set_base_frequency(1_000.0).unwrap();
        *osc.frequency_envelope_mut().unwrap() =
            EnvelopeCurve::from_points(&[(0.0, 1.0), (1.0, 0.1)]).unwrap();

        let out = render(&osc, 48_000, 1.0);
        let crossings = |slice: &[f32]| slice.windows(2).filter(|w| w[0] <= 0.0 && w[1] > 0.0).count();

        let early = crossings(&out[..4_800]);
        let late = crossings(&out[43_200..]);
        assert!(early > late * 3, "early={early}, late={late}");
    }

    #[test]
    fn noise_is_reproducible_after_reset() {
        let mut osc = Oscillator::new(OscillatorId::Noise);
        osc.set_enabled(true);
        osc.set_noise_seed(99).unwrap();

        let a = render(&osc, 256, 0.3);
        let b = render(&osc, 256, 0.3);
        assert_eq!(a, b);
        assert!(a.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn tonal_only_parameters_are_rejected_on_noise() {
        let mut noise = Oscillator::new(OscillatorId::Noise);
        assert!(noise.frequency_envelope().is_none());
        assert!(matches!(noise.frequency_envelope_mut(), Err(KickError::Unsupported(_))));
        assert!(matches!(noise.set_waveform(Waveform::Sawtooth), Err(KickError::Unsupported(_))));
        assert!(matches!(noise.set_base_frequency(100.0), Err(KickError::Unsupported(_))));

        let mut tone = Oscillator::new(OscillatorId::Tone1);
        assert!(matches!(tone.set_noise_type(NoiseType::Brownian), Err(KickError::Unsupported(_))));
    }

    #[test]
    fn setters_validate_ranges() {
        let mut osc = Oscillator::new(OscillatorId::Tone1);
        assert!(osc.set_base_frequency(0.0).is_err());
        assert!(osc.set_base_frequency(30_000.0).is_err());
        assert!(osc.set_amplitude(1.5).is_err());
        assert_eq!(osc.base_frequency(), Some(DEFAULT_FREQUENCY_HZ));
        assert_eq!(osc.amplitude(), 1.0);
    }

    #[test]
    fn validate_catches_slot_mismatch() {
        let noise = Oscillator::new(OscillatorId::Noise);
        assert!(noise.validate(OscillatorId::Noise).is_ok());
        assert!(matches!(
            noise.validate(OscillatorId::Tone1),
            Err(KickError::MalformedState { .. })
        ));
    }

    #[test]
    fn noise_constructor_sets_seed() {
        let osc = Oscillator::noise(42);
        assert_eq!(osc.id(), OscillatorId::Noise);
        assert!(!osc.is_enabled());
        assert!(matches!(
            osc.source(),
            OscillatorSource::Noise { noise_type: NoiseType::White, seed: 42 }
        ));
    }
}

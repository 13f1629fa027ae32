use serde::{Deserialize, Serialize};

use crate::{
    dsp::{distortion::soft_clip, envelope::EnvelopeCurve},
    error::{check_range, KickError, Result},
    patch::{
        filter::{FilterStage, FilterState},
        normalized_time,
        oscillator::{Oscillator, OscillatorId, OscillatorSource, OscillatorState, DEFAULT_NOISE_SEED},
    },
};

/*
Layer Signal Flow
=================

  Tone1 ─┐
  Tone2 ─┼─► sum ─► amplitude × amp_env(tn) ─► distortion ─► filter ─► out
  Noise ─┘

A layer lives for `length` seconds after note-on. Past that it contributes
silence. All envelopes are read at tn = t / length, so stretching a layer
stretches every curve on it.
*/

pub const MIN_LENGTH_SECS: f32 = 0.001;
pub const MAX_LENGTH_SECS: f32 = 4.0;
pub const DEFAULT_LENGTH_SECS: f32 = 0.3;
pub const MAX_DRIVE: f32 = 50.0;
pub const MAX_DISTORTION_VOLUME: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayerId {
    #[default]
    Layer1,
    Layer2,
    Layer3,
}

impl LayerId {
    pub const ALL: [LayerId; 3] = [LayerId::Layer1, LayerId::Layer2, LayerId::Layer3];

    pub fn index(self) -> usize {
        match self {
            LayerId::Layer1 => 0,
            LayerId::Layer2 => 1,
            LayerId::Layer3 => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Soft-clip stage with enveloped drive and output volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distortion {
    enabled: bool,
    drive: f32,
    drive_envelope: EnvelopeCurve,
    volume: f32,
    volume_envelope: EnvelopeCurve,
}

impl Distortion {
    pub fn new() -> Self {
        Self {
            enabled: false,
            drive: 0.0,
            drive_envelope: EnvelopeCurve::new(),
            volume: 1.0,
            volume_envelope: EnvelopeCurve::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }

    pub fn set_drive(&mut self, drive: f32) -> Result<()> {
        self.drive = check_range("distortion drive", drive, 0.0, MAX_DRIVE)?;
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.volume = check_range("distortion volume", volume, 0.0, MAX_DISTORTION_VOLUME)?;
        Ok(())
    }

    pub fn drive_envelope(&self) -> &EnvelopeCurve {
        &self.drive_envelope
    }

    pub fn drive_envelope_mut(&mut self) -> &mut EnvelopeCurve {
        &mut self.drive_envelope
    }

    pub fn volume_envelope(&self) -> &EnvelopeCurve {
        &self.volume_envelope
    }

    pub fn volume_envelope_mut(&mut self) -> &mut EnvelopeCurve {
        &mut self.volume_envelope
    }

    #[inline]
    pub fn apply(&self, sample: f32, tn: f32) -> f32 {
        if !self.enabled {
            return sample;
        }
        let drive = 1.0 + self.drive * self.drive_envelope.value_at(tn);
        let volume = self.volume * self.volume_envelope.value_at(tn);
        soft_clip(sample, drive) * volume
    }
}

impl Default for Distortion {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    id: LayerId,
    enabled: bool,
    length: f32,
    amplitude: f32,
    amplitude_envelope: EnvelopeCurve,
    oscillators: [Oscillator; 3],
    filter: FilterStage,
    distortion: Distortion,
}

impl Layer {
    /// Default layer. Only `Layer1` starts enabled; each layer's noise slot
    /// gets its own seed so stacked noise bursts are not identical.
    pub fn new(id: LayerId) -> Self {
        let seed = DEFAULT_NOISE_SEED + id.index() as u64;
        let oscillators = OscillatorId::ALL.map(|slot| match slot {
            OscillatorId::Noise => Oscillator::noise(seed),
            tonal => Oscillator::new(tonal),
        });

        Self {
            id,
            enabled: id == LayerId::Layer1,
            length: DEFAULT_LENGTH_SECS,
            amplitude: 1.0,
            amplitude_envelope: EnvelopeCurve::new(),
            oscillators,
            filter: FilterStage::new(),
            distortion: Distortion::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Layer duration in seconds.
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn set_length(&mut self, seconds: f32) -> Result<()> {
        self.length = check_range("layer length", seconds, MIN_LENGTH_SECS, MAX_LENGTH_SECS)?;
        Ok(())
    }

    /// Number of samples the layer sounds for at `sample_rate`.
    pub fn length_samples(&self, sample_rate: f32) -> u64 {
        (self.length as f64 * sample_rate as f64).round() as u64
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn set_amplitude(&mut self, amplitude: f32) -> Result<()> {
        self.amplitude = check_range("layer amplitude", amplitude, 0.0, 1.0)?;
        Ok(())
    }

    pub fn amplitude_envelope(&self) -> &EnvelopeCurve {
        &self.amplitude_envelope
    }

    pub fn amplitude_envelope_mut(&mut self) -> &mut EnvelopeCurve {
        &mut self.amplitude_envelope
    }

    pub fn oscillator(&self, id: OscillatorId) -> &Oscillator {
        &self.oscillators[id.index()]
    }

    pub fn oscillator_mut(&mut self, id: OscillatorId) -> &mut Oscillator {
        &mut self.oscillators[id.index()]
    }

    /// Seed of the noise slot.
    pub fn noise_seed(&self) -> u64 {
        match self.oscillator(OscillatorId::Noise).source() {
            OscillatorSource::Noise { seed, .. } => *seed,
            OscillatorSource::Tonal { .. } => DEFAULT_NOISE_SEED,
        }
    }

    pub fn oscillators(&self) -> &[Oscillator; 3] {
        &self.oscillators
    }

    pub fn filter(&self) -> &FilterStage {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterStage {
        &mut self.filter
    }

    pub fn distortion(&self) -> &Distortion {
        &self.distortion
    }

    pub fn distortion_mut(&mut self) -> &mut Distortion {
        &mut self.distortion
    }

    /// Render the sample at index `n` after note-on. Sample indices at or past
    /// the layer window return silence and leave `state` untouched.
    #[inline]
    pub fn render_sample(&self, state: &mut LayerState, n: u64, sample_rate: f32) -> f32 {
        if !self.enabled || n >= self.length_samples(sample_rate) {
            return 0.0;
        }

        let t = (n as f64 / sample_rate as f64) as f32;
        let mut sum = 0.0;
        for (osc, osc_state) in self.oscillators.iter().zip(state.oscillators.iter_mut()) {
            sum += osc.sample(osc_state, t, self.length, sample_rate);
        }

        let tn = normalized_time(t, self.length);
        let scaled = sum * self.amplitude * self.amplitude_envelope.value_at(tn);
        let shaped = self.distortion.apply(scaled, tn);
        self.filter.process(&mut state.filter, shaped, t, self.length)
    }

    pub(crate) fn validate(&self, slot: LayerId) -> Result<()> {
        if self.id != slot {
            return Err(KickError::malformed(format!(
                "layer {} stored in slot {}",
                self.id.index() + 1,
                slot.index() + 1
            )));
        }

        let ranges = [
            ("layer length", self.length, MIN_LENGTH_SECS, MAX_LENGTH_SECS),
            ("layer amplitude", self.amplitude, 0.0, 1.0),
            ("distortion drive", self.distortion.drive, 0.0, MAX_DRIVE),
            ("distortion volume", self.distortion.volume, 0.0, MAX_DISTORTION_VOLUME),
        ];
        for (what, value, min, max) in ranges {
            check_range(what, value, min, max).map_err(|err| KickError::malformed(err.to_string()))?;
        }

        for (osc, id) in self.oscillators.iter().zip(OscillatorId::ALL) {
            osc.validate(id).map_err(|err| match err {
                KickError::MalformedState { .. } => err,
                other => KickError::malformed(other.to_string()),
            })?;
        }
        self.filter.validate()
    }
}

/// Per-sample state for one layer: oscillator phases, noise generators,
/// filter memory.
#[derive(Debug, Clone)]
pub struct LayerState {
    oscillators: [OscillatorState; 3],
    filter: FilterState,
}

impl LayerState {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            oscillators: std::array::from_fn(|_| OscillatorState::new()),
            filter: FilterState::new(sample_rate),
        }
    }

    /// Rewind to the start of a kick for `layer`.
    pub fn reset(&mut self, layer: &Layer) {
        for (state, osc) in self.oscillators.iter_mut().zip(layer.oscillators.iter()) {
            state.reset(osc);
        }
        self.filter.reset();
    }
}

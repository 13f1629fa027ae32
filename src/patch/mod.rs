//! Kick parameter tree.
//!
//! A `KickPatch` is everything that describes a kick sound: three layers,
//! each with its oscillators, filter, distortion, and envelopes, plus the
//! master gain and the layer currently selected for editing. It carries no
//! playback state, so a patch can be cloned, edited, compared, and
//! serialized freely; the engine only ever reads it.

pub mod codec;
pub mod filter;
pub mod layer;
pub mod oscillator;

use serde::{Deserialize, Serialize};

use crate::{
    dsp::envelope::EnvelopeCurve,
    error::{check_range, KickError, Result},
};

pub use codec::{StateCodec, StateFormat};
pub use filter::FilterStage;
pub use layer::{Distortion, Layer, LayerId};
pub use oscillator::{Oscillator, OscillatorId, OscillatorSource};

pub const MAX_MASTER_GAIN: f32 = 4.0;

/// Normalized time `t / duration`, clamped to `[0, 1]`.
#[inline]
pub fn normalized_time(t: f32, duration: f32) -> f32 {
    if duration > 0.0 {
        (t / duration).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Addresses one editable curve in the patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeTarget {
    OscillatorAmplitude { layer: LayerId, oscillator: OscillatorId },
    /// Tonal oscillators only.
    OscillatorFrequency { layer: LayerId, oscillator: OscillatorId },
    /// The layer's general amplitude envelope.
    LayerAmplitude { layer: LayerId },
    FilterCutoff { layer: LayerId },
    DistortionDrive { layer: LayerId },
    DistortionVolume { layer: LayerId },
}

impl EnvelopeTarget {
    pub fn layer(self) -> LayerId {
        match self {
            EnvelopeTarget::OscillatorAmplitude { layer, .. }
            | EnvelopeTarget::OscillatorFrequency { layer, .. }
            | EnvelopeTarget::LayerAmplitude { layer }
            | EnvelopeTarget::FilterCutoff { layer }
            | EnvelopeTarget::DistortionDrive { layer }
            | EnvelopeTarget::DistortionVolume { layer } => layer,
        }
    }

    /// Every curve of one layer, in a stable order.
    pub fn for_layer(layer: LayerId) -> impl Iterator<Item = EnvelopeTarget> {
        let per_oscillator = OscillatorId::ALL.into_iter().flat_map(move |oscillator| {
            let amplitude = EnvelopeTarget::OscillatorAmplitude { layer, oscillator };
            let frequency = oscillator
                .is_tonal()
                .then_some(EnvelopeTarget::OscillatorFrequency { layer, oscillator });
            std::iter::once(amplitude).chain(frequency)
        });

        [
            EnvelopeTarget::LayerAmplitude { layer },
            EnvelopeTarget::FilterCutoff { layer },
            EnvelopeTarget::DistortionDrive { layer },
            EnvelopeTarget::DistortionVolume { layer },
        ]
        .into_iter()
        .chain(per_oscillator)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KickPatch {
    layers: [Layer; 3],
    master_gain: f32,
    selected_layer: LayerId,
}

impl KickPatch {
    /// Default kick: layer 1 enabled with a single 150 Hz sine, everything
    /// else present but disabled.
    pub fn new() -> Self {
        Self {
            layers: LayerId::ALL.map(Layer::new),
            master_gain: 1.0,
            selected_layer: LayerId::Layer1,
        }
    }

    pub fn layer(&self, id: LayerId) -> &Layer {
        &self.layers[id.index()]
    }

    pub fn layer_mut(&mut self, id: LayerId) -> &mut Layer {
        &mut self.layers[id.index()]
    }

    pub fn layers(&self) -> &[Layer; 3] {
        &self.layers
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    pub fn set_master_gain(&mut self, gain: f32) -> Result<()> {
        self.master_gain = check_range("master gain", gain, 0.0, MAX_MASTER_GAIN)?;
        Ok(())
    }

    /// Layer shown in the editor. Mixing ignores it.
    pub fn selected_layer(&self) -> LayerId {
        self.selected_layer
    }

    pub fn select_layer(&mut self, id: LayerId) {
        self.selected_layer = id;
    }

    /// Longest kick-length over enabled layers, in seconds. Zero when every
    /// layer is disabled.
    pub fn longest_length(&self) -> f32 {
        self.layers
            .iter()
            .filter(|layer| layer.is_enabled())
            .map(Layer::length)
            .fold(0.0, f32::max)
    }

    /// Sample count after which every enabled layer has gone silent.
    pub fn longest_length_samples(&self, sample_rate: f32) -> u64 {
        self.layers
            .iter()
            .filter(|layer| layer.is_enabled())
            .map(|layer| layer.length_samples(sample_rate))
            .max()
            .unwrap_or(0)
    }

    pub fn envelope(&self, target: EnvelopeTarget) -> Result<&EnvelopeCurve> {
        let layer = self.layer(target.layer());
        match target {
            EnvelopeTarget::OscillatorAmplitude { oscillator, .. } => {
                Ok(layer.oscillator(oscillator).amplitude_envelope())
            }
            EnvelopeTarget::OscillatorFrequency { oscillator, .. } => layer
                .oscillator(oscillator)
                .frequency_envelope()
                .ok_or(KickError::Unsupported("noise oscillator has no frequency envelope")),
            EnvelopeTarget::LayerAmplitude { .. } => Ok(layer.amplitude_envelope()),
            EnvelopeTarget::FilterCutoff { .. } => Ok(layer.filter().cutoff_envelope()),
            EnvelopeTarget::DistortionDrive { .. } => Ok(layer.distortion().drive_envelope()),
            EnvelopeTarget::DistortionVolume { .. } => Ok(layer.distortion().volume_envelope()),
        }
    }

    pub fn envelope_mut(&mut self, target: EnvelopeTarget) -> Result<&mut EnvelopeCurve> {
        let layer = self.layer_mut(target.layer());
        match target {
            EnvelopeTarget::OscillatorAmplitude { oscillator, .. } => {
                Ok(layer.oscillator_mut(oscillator).amplitude_envelope_mut())
            }
            EnvelopeTarget::OscillatorFrequency { oscillator, .. } => {
                layer.oscillator_mut(oscillator).frequency_envelope_mut()
            }
            EnvelopeTarget::LayerAmplitude { .. } => Ok(layer.amplitude_envelope_mut()),
            EnvelopeTarget::FilterCutoff { .. } => Ok(layer.filter_mut().cutoff_envelope_mut()),
            EnvelopeTarget::DistortionDrive { .. } => Ok(layer.distortion_mut().drive_envelope_mut()),
            EnvelopeTarget::DistortionVolume { .. } => {
                Ok(layer.distortion_mut().volume_envelope_mut())
            }
        }
    }

    /// Check a patch that did not come through the validated setters.
    /// Every failure is reported as `MalformedState`.
    pub fn validate(&self) -> Result<()> {
        check_range("master gain", self.master_gain, 0.0, MAX_MASTER_GAIN)
            .map_err(|err| KickError::malformed(err.to_string()))?;
        for (layer, id) in self.layers.iter().zip(LayerId::ALL) {
            layer.validate(id)?;
        }
        Ok(())
    }
}

impl Default for KickPatch {
    fn default() -> Self {
        Self::new()
    }
}

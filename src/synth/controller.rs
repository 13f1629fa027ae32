use std::sync::Arc;

use arc_swap::ArcSwap;
use rtrb::Producer;
use tracing::{debug, warn};

use crate::{
    dsp::{
        envelope::{EnvelopePoint, Interpolation},
        filter::FilterKind,
        oscillator::{NoiseType, Waveform},
    },
    error::{check_range, KickError, Result},
    patch::{
        codec::{StateCodec, StateFormat},
        EnvelopeTarget, KickPatch, LayerId, OscillatorId,
    },
    synth::{
        message::{KickEvent, KickMessage},
        preview::render_preview,
    },
};

/// Control-thread side of a kick instance.
///
/// Every edit clones the current patch, applies the change to the clone,
/// and publishes the clone as the new snapshot with a single atomic swap.
/// A failed edit publishes nothing, so the audio thread only ever sees whole
/// patches.
///
/// Replaced snapshots are parked here until the audio thread has let go of
/// them, so memory is only ever freed on this side.
pub struct KickController {
    shared: Arc<ArcSwap<KickPatch>>,
    current: Arc<KickPatch>,
    retired: Vec<Arc<KickPatch>>,
    tx: Producer<KickMessage>,
    events: Producer<KickEvent>,
    sample_rate: f32,
}

impl KickController {
    pub fn new(
        shared: Arc<ArcSwap<KickPatch>>,
        tx: Producer<KickMessage>,
        events: Producer<KickEvent>,
        sample_rate: f32,
    ) -> Self {
        let current = shared.load_full();
        Self {
            shared,
            current,
            retired: Vec::new(),
            tx,
            events,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The patch as last published.
    pub fn patch(&self) -> &KickPatch {
        &self.current
    }

    /// Snapshots waiting for the audio thread to release them.
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    // Transport

    pub fn note_on(&mut self, velocity: f32) -> Result<()> {
        let velocity = check_range("velocity", velocity, 0.0, 1.0)?;
        self.send(KickMessage::NoteOn { velocity });
        Ok(())
    }

    pub fn note_off(&mut self) {
        self.send(KickMessage::NoteOff);
    }

    fn send(&mut self, msg: KickMessage) {
        if self.tx.push(msg).is_err() {
            warn!(?msg, "message queue full, dropping");
        }
    }

    // Envelope editing

    pub fn points(&self, target: EnvelopeTarget) -> Result<&[EnvelopePoint]> {
        Ok(self.current.envelope(target)?.points())
    }

    pub fn add_point(&mut self, target: EnvelopeTarget, x: f32, y: f32) -> Result<usize> {
        self.edit("add point", |patch| patch.envelope_mut(target)?.add_point(x, y))
    }

    pub fn update_point(&mut self, target: EnvelopeTarget, index: usize, x: f32, y: f32) -> Result<usize> {
        self.edit("update point", |patch| {
            patch.envelope_mut(target)?.update_point(index, x, y)
        })
    }

    /// Remove a point and return the points that remain.
    pub fn remove_point(&mut self, target: EnvelopeTarget, index: usize) -> Result<Vec<EnvelopePoint>> {
        self.edit("remove point", |patch| {
            let remaining = patch.envelope_mut(target)?.remove_point(index)?;
            let mut out = Vec::new();
            out.try_reserve_exact(remaining.len())
                .map_err(|_| KickError::AllocationFailure { context: "copying envelope points" })?;
            out.extend_from_slice(remaining);
            Ok(out)
        })
    }

    pub fn set_interpolation(&mut self, target: EnvelopeTarget, interpolation: Interpolation) -> Result<()> {
        self.edit("set interpolation", |patch| {
            patch.envelope_mut(target)?.set_interpolation(interpolation);
            Ok(())
        })
    }

    // Layer

    pub fn select_layer(&mut self, layer: LayerId) -> Result<()> {
        self.edit("select layer", |patch| {
            patch.select_layer(layer);
            Ok(())
        })
    }

    pub fn set_layer_enabled(&mut self, layer: LayerId, enabled: bool) -> Result<()> {
        self.edit("layer enabled", |patch| {
            patch.layer_mut(layer).set_enabled(enabled);
            Ok(())
        })
    }

    pub fn set_layer_length(&mut self, layer: LayerId, seconds: f32) -> Result<()> {
        self.edit("layer length", |patch| patch.layer_mut(layer).set_length(seconds))
    }

    pub fn set_layer_amplitude(&mut self, layer: LayerId, amplitude: f32) -> Result<()> {
        self.edit("layer amplitude", |patch| patch.layer_mut(layer).set_amplitude(amplitude))
    }

    pub fn set_master_gain(&mut self, gain: f32) -> Result<()> {
        self.edit("master gain", |patch| patch.set_master_gain(gain))
    }

    // Oscillators

    pub fn set_oscillator_enabled(&mut self, layer: LayerId, osc: OscillatorId, enabled: bool) -> Result<()> {
        self.edit("oscillator enabled", |patch| {
            patch.layer_mut(layer).oscillator_mut(osc).set_enabled(enabled);
            Ok(())
        })
    }

    pub fn set_oscillator_amplitude(&mut self, layer: LayerId, osc: OscillatorId, amplitude: f32) -> Result<()> {
        self.edit("oscillator amplitude", |patch| {
            patch.layer_mut(layer).oscillator_mut(osc).set_amplitude(amplitude)
        })
    }

    pub fn set_waveform(&mut self, layer: LayerId, osc: OscillatorId, waveform: Waveform) -> Result<()> {
        self.edit("waveform", |patch| {
            patch.layer_mut(layer).oscillator_mut(osc).set_waveform(waveform)
        })
    }

    pub fn set_base_frequency(&mut self, layer: LayerId, osc: OscillatorId, frequency: f32) -> Result<()> {
        self.edit("base frequency", |patch| {
            patch.layer_mut(layer).oscillator_mut(osc).set_base_frequency(frequency)
        })
    }

    pub fn set_noise_type(&mut self, layer: LayerId, noise_type: NoiseType) -> Result<()> {
        self.edit("noise type", |patch| {
            patch
                .layer_mut(layer)
                .oscillator_mut(OscillatorId::Noise)
                .set_noise_type(noise_type)
        })
    }

    pub fn set_noise_seed(&mut self, layer: LayerId, seed: u64) -> Result<()> {
        self.edit("noise seed", |patch| {
            patch.layer_mut(layer).oscillator_mut(OscillatorId::Noise).set_noise_seed(seed)
        })
    }

    // Filter

    pub fn set_filter_enabled(&mut self, layer: LayerId, enabled: bool) -> Result<()> {
        self.edit("filter enabled", |patch| {
            patch.layer_mut(layer).filter_mut().set_enabled(enabled);
            Ok(())
        })
    }

    pub fn set_filter_kind(&mut self, layer: LayerId, kind: FilterKind) -> Result<()> {
        self.edit("filter kind", |patch| {
            patch.layer_mut(layer).filter_mut().set_kind(kind);
            Ok(())
        })
    }

    pub fn set_filter_cutoff(&mut self, layer: LayerId, cutoff_hz: f32) -> Result<()> {
        self.edit("filter cutoff", |patch| patch.layer_mut(layer).filter_mut().set_cutoff_hz(cutoff_hz))
    }

    pub fn set_filter_q(&mut self, layer: LayerId, q: f32) -> Result<()> {
        self.edit("filter Q", |patch| patch.layer_mut(layer).filter_mut().set_q(q))
    }

    // Distortion

    pub fn set_distortion_enabled(&mut self, layer: LayerId, enabled: bool) -> Result<()> {
        self.edit("distortion enabled", |patch| {
            patch.layer_mut(layer).distortion_mut().set_enabled(enabled);
            Ok(())
        })
    }

    pub fn set_distortion_drive(&mut self, layer: LayerId, drive: f32) -> Result<()> {
        self.edit("distortion drive", |patch| patch.layer_mut(layer).distortion_mut().set_drive(drive))
    }

    pub fn set_distortion_volume(&mut self, layer: LayerId, volume: f32) -> Result<()> {
        self.edit("distortion volume", |patch| {
            patch.layer_mut(layer).distortion_mut().set_volume(volume)
        })
    }

    // Whole-state operations

    pub fn serialize_state(&self, format: StateFormat) -> Result<Vec<u8>> {
        StateCodec::serialize(&self.current, format)
    }

    /// Decode `blob` and swap it in as the whole patch. On failure nothing
    /// changes.
    pub fn restore_state(&mut self, blob: &[u8], format: StateFormat) -> Result<()> {
        match StateCodec::deserialize(blob, format) {
            Ok(patch) => {
                debug!(bytes = blob.len(), ?format, "state restored");
                self.publish(patch);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "state restore rejected");
                Err(err)
            }
        }
    }

    /// Swap in a patch built elsewhere, such as a loaded preset.
    pub fn replace_patch(&mut self, patch: KickPatch) -> Result<()> {
        if let Err(err) = patch.validate() {
            warn!(%err, "patch replacement rejected");
            return Err(err);
        }
        self.publish(patch);
        Ok(())
    }

    /// Render the whole kick offline for display.
    pub fn preview(&self) -> Vec<f32> {
        render_preview(&self.current, self.sample_rate)
    }

    /// Drop retired snapshots the audio thread no longer holds.
    pub fn collect_garbage(&mut self) {
        self.retired.retain(|patch| Arc::strong_count(patch) > 1);
    }

    fn edit<T>(&mut self, what: &'static str, apply: impl FnOnce(&mut KickPatch) -> Result<T>) -> Result<T> {
        let mut next = KickPatch::clone(&self.current);
        match apply(&mut next) {
            Ok(value) => {
                debug!(edit = what, "patch updated");
                self.publish(next);
                Ok(value)
            }
            Err(err) => {
                warn!(edit = what, %err, "edit rejected");
                Err(err)
            }
        }
    }

    fn publish(&mut self, patch: KickPatch) {
        let next = Arc::new(patch);
        let previous = self.shared.swap(Arc::clone(&next));
        self.current = next;

        self.collect_garbage();
        if Arc::strong_count(&previous) > 1 {
            self.retired.push(previous);
        }

        // A full queue already holds an undelivered StateChanged
        let _ = self.events.push(KickEvent::StateChanged);
    }
}

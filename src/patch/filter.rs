use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        envelope::EnvelopeCurve,
        filter::{FilterKind, SVFilter, MAX_Q, MIN_CUTOFF_HZ, MIN_Q},
    },
    error::{check_range, KickError, Result},
    patch::normalized_time,
};

pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
pub const DEFAULT_CUTOFF_HZ: f32 = 1_000.0;
pub const DEFAULT_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Layer filter settings.
///
/// The effective cutoff at normalized time `tn` is
/// `cutoff_hz * cutoff_envelope(tn)`, clamped to what the sample rate allows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterStage {
    enabled: bool,
    kind: FilterKind,
    cutoff_hz: f32,
    q: f32,
    cutoff_envelope: EnvelopeCurve,
}

impl FilterStage {
    pub fn new() -> Self {
        Self {
            enabled: false,
            kind: FilterKind::LowPass,
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            q: DEFAULT_Q,
            cutoff_envelope: EnvelopeCurve::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: FilterKind) {
        self.kind = kind;
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn set_cutoff_hz(&mut self, cutoff_hz: f32) -> Result<()> {
        self.cutoff_hz = check_range("filter cutoff", cutoff_hz, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)?;
        Ok(())
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn set_q(&mut self, q: f32) -> Result<()> {
        self.q = check_range("filter Q", q, MIN_Q, MAX_Q)?;
        Ok(())
    }

    pub fn cutoff_envelope(&self) -> &EnvelopeCurve {
        &self.cutoff_envelope
    }

    pub fn cutoff_envelope_mut(&mut self) -> &mut EnvelopeCurve {
        &mut self.cutoff_envelope
    }

    /// Filter one sample at `t` seconds into a layer of `layer_duration`.
    #[inline]
    pub fn process(&self, state: &mut FilterState, sample: f32, t: f32, layer_duration: f32) -> f32 {
        if !self.enabled || self.kind == FilterKind::Off {
            return sample;
        }

        let tn = normalized_time(t, layer_duration);
        let cutoff = self.cutoff_hz * self.cutoff_envelope.value_at(tn);
        state.svf.set_params(cutoff, self.q);
        state.svf.process(sample, self.kind)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_range("filter cutoff", self.cutoff_hz, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
            .and_then(|_| check_range("filter Q", self.q, MIN_Q, MAX_Q))
            .map(|_| ())
            .map_err(|err| KickError::malformed(err.to_string()))
    }
}

impl Default for FilterStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Filter memory for one layer.
#[derive(Debug, Clone, Copy)]
pub struct FilterState {
    svf: SVFilter,
    sample_rate: f32,
}

impl FilterState {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            svf: SVFilter::new(sample_rate),
            sample_rate,
        }
    }

    /// Clear memory and cached coefficients.
    pub fn reset(&mut self) {
        self.svf = SVFilter::new(self.sample_rate);
    }

    /// Cutoff currently loaded into the filter coefficients.
    pub fn effective_cutoff(&self) -> f32 {
        self.svf.cutoff_hz()
    }
}

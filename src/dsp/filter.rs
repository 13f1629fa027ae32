use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/*
| type      | passes          | rejects         |
| --------- | --------------- | --------------- |
| low-pass  | below cutoff    | above cutoff    |
| high-pass | above cutoff    | below cutoff    |
| band-pass | around cutoff   | both sides      |

The filter is a topology-preserving (TPT) state-variable filter. One update
yields all three responses at once; `FilterKind` picks which one is heard.

  g = tan(π · cutoff / sample_rate)     integrator gain (prewarped)
  k = 1 / Q                             damping

A kick sweeps its cutoff every sample, but tan() is the expensive part of
the update. Coefficients are cached and only recomputed when the cutoff has
moved by more than `CUTOFF_TOLERANCE` (relative) or Q changed.
*/

/// Relative cutoff change that triggers a coefficient update.
pub const CUTOFF_TOLERANCE: f32 = 1e-4;

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MIN_Q: f32 = 0.1;
pub const MAX_Q: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterKind {
    /// No filtering; the signal passes through.
    Off,
    #[default]
    LowPass,
    HighPass,
    BandPass,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    /// Normalized to unity gain at the cutoff frequency.
    pub bandpass: f32,
    pub highpass: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    sample_rate: f32,
    cutoff_hz: f32,
    q: f32,

    g: f32,
    k: f32,
    h: f32,
}

impl SVFilter {
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            sample_rate,
            cutoff_hz: 1_000.0,
            q: std::f32::consts::FRAC_1_SQRT_2,
            g: 0.0,
            k: 0.0,
            h: 0.0,
        };
        filter.update_coefficients();
        filter
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    /// Highest usable cutoff for this sample rate.
    #[inline]
    pub fn max_cutoff(&self) -> f32 {
        self.sample_rate * 0.49
    }

    /// Set cutoff and Q. Coefficients are only recomputed when the change is
    /// large enough to matter. Returns true when they were.
    #[inline]
    pub fn set_params(&mut self, cutoff_hz: f32, q: f32) -> bool {
        let cutoff_hz = cutoff_hz.clamp(MIN_CUTOFF_HZ, self.max_cutoff());
        let q = q.clamp(MIN_Q, MAX_Q);

        let cutoff_moved = (cutoff_hz - self.cutoff_hz).abs() > CUTOFF_TOLERANCE * self.cutoff_hz;
        if !cutoff_moved && q == self.q {
            return false;
        }

        self.cutoff_hz = cutoff_hz;
        self.q = q;
        self.update_coefficients();
        true
    }

    fn update_coefficients(&mut self) {
        self.g = (PI * self.cutoff_hz / self.sample_rate).tan();
        self.k = 1.0 / self.q;
        self.h = 1.0 / (1.0 + self.g * (self.g + self.k));
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> FilterOutputs {
        let v3 = sample - self.ic2eq;
        let v1 = self.h * (self.ic1eq + self.g * v3);
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: self.k * v1,
            highpass: sample - self.k * v1 - v2,
        }
    }

    /// Run one sample through the filter and pick the `kind` response.
    #[inline]
    pub fn process(&mut self, sample: f32, kind: FilterKind) -> f32 {
        if kind == FilterKind::Off {
            return sample;
        }

        let outputs = self.next_sample(sample);
        match kind {
            FilterKind::Off => sample,
            FilterKind::LowPass => outputs.lowpass,
            FilterKind::HighPass => outputs.highpass,
            FilterKind::BandPass => outputs.bandpass,
        }
    }

    /// Clear integrator memory. Coefficients are kept.
    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

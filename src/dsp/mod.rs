//! Low-level DSP primitives used by the kick patch.
//!
//! These components are allocation-free and realtime-safe once constructed.
//! They stay focused on the signal-processing math; the `patch` module layers
//! envelopes, layers, and mixing on top.

/// Waveshaping transfer functions.
pub mod distortion;
/// Editable breakpoint envelopes.
pub mod envelope;
/// State-variable filter with cached coefficients.
pub mod filter;
/// Waveforms, phase accumulation, and seeded noise.
pub mod oscillator;

pub use envelope::{EnvelopeCurve, EnvelopePoint, Interpolation};
pub use filter::FilterKind;
pub use oscillator::{NoiseType, Waveform};

//! Distortion / Waveshaping
//!
//! Distortion adds harmonics by reshaping the waveform. A kick uses it to
//! fatten the body and to make the click cut through a mix; because the drive
//! is itself enveloped, a layer can hit hard at the attack and clean up as
//! the tail decays.
//!
//! # Transfer Functions
//!
//! Soft Clip:
//!   f(x) = x / (1 + |x|)
//!   - Smooth, warm saturation
//!   - Approaches ±1 asymptotically, never reaches it
//!
//! Hard Clip:
//!   f(x) = clamp(x, -threshold, threshold)
//!   - Harsh, buzzy distortion
//!   - Used on the master output as the final range guard
//!
//! # Drive Values
//!
//!   1.0  = Gentle (peaks at 0.5)
//!   2-4  = Warm saturation
//!   5-10 = Obvious distortion
//!   10+  = Heavy, close to a square wave

/// Soft clipping using x / (1 + |x|) transfer function.
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

/// Hard clipping - simply clamps the signal at a threshold.
///
/// Non-finite input collapses to silence rather than propagating.
#[inline]
pub fn hard_clip(sample: f32, drive: f32, threshold: f32) -> f32 {
    let x = sample * drive;
    if x.is_finite() {
        x.clamp(-threshold, threshold)
    } else {
        0.0
    }
}

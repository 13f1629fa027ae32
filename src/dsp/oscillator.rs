use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/*
Waveforms and Phase
===================

A tonal oscillator is two pieces: a phase accumulator that turns frequency
into position-within-a-cycle, and a waveform function that turns that
position into a sample.

  phase       Position inside one cycle, in radians, always in [0, 2π).
              Each sample: phase += 2π * freq / sample_rate, then wrap.

Because a kick's pitch sweeps (a 200 Hz click falling to a 50 Hz body), the
frequency changes every sample. Integrating it into a running phase keeps
the waveform continuous while the pitch moves; computing sin(2π f t) with
the *current* f instead would make the wave jump every time f changed.

Wrapping keeps the phase small. An unwrapped phase grows without bound and
an f32/f64 loses the fractional precision that the waveform depends on.

Shapes (one cycle, phase 0 → 2π):

  Sine      ╭─╮        Pure fundamental. The classic kick body.
               ╰─╯
  Square    ┌──┐       Odd harmonics, hollow and loud.
               └──┘
  Triangle   ╱╲        Soft odd harmonics, between sine and square.
               ╲╱
  Sawtooth   ╱│ ╱      Every harmonic, buzzy.
               │╱

Apart from the square, every shape starts at 0 (rising), so a kick begins
without a click.

Noise has no phase. It is drawn from a seeded generator so that the same
seed produces the same hit every time.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl Waveform {
    /// Evaluate the waveform at `phase` radians, expected in `[0, 2π)`.
    #[inline]
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Square => {
                if phase < PI {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                let x = phase / TAU;
                if x < 0.25 {
                    4.0 * x
                } else if x < 0.75 {
                    2.0 - 4.0 * x
                } else {
                    4.0 * x - 4.0
                }
            }
            Waveform::Sawtooth => {
                // Shift half a cycle so the ramp crosses zero at phase 0
                let x = phase / TAU + 0.5;
                2.0 * (x - x.floor()) - 1.0
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoiseType {
    /// Flat spectrum.
    #[default]
    White,
    /// Integrated white noise, most energy in the lows.
    Brownian,
}

/// Running phase for one tonal oscillator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseAccumulator {
    phase: f64,
}

impl PhaseAccumulator {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn phase(&self) -> f32 {
        self.phase as f32
    }

    /// Return the current phase and advance by one sample at `frequency`.
    #[inline]
    pub fn next(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let current = self.phase;

        let tau = std::f64::consts::TAU;
        self.phase += tau * frequency as f64 / sample_rate as f64;
        if self.phase >= tau || self.phase < 0.0 {
            self.phase = self.phase.rem_euclid(tau);
        }

        current as f32
    }
}

/// Seeded noise generator.
///
/// `reseed` rewinds the sequence, so every kick triggered with the same seed
/// gets the same noise burst.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    seed: u64,
    rng: fastrand::Rng,
    brown: f32,
}

impl NoiseSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: fastrand::Rng::with_seed(seed),
            brown: 0.0,
        }
    }

    /// Restart the sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng.seed(seed);
        self.brown = 0.0;
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn next(&mut self, noise_type: NoiseType) -> f32 {
        let white = self.rng.f32() * 2.0 - 1.0;
        match noise_type {
            NoiseType::White => white,
            NoiseType::Brownian => {
                // Leaky integrator keeps the walk from drifting off
                self.brown = (self.brown + 0.02 * white) / 1.02;
                (self.brown * 3.5).clamp(-1.0, 1.0)
            }
        }
    }
}

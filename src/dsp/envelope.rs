use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{check_range, KickError, Result};

/*
Breakpoint Envelopes
====================

Every moving part of a kick is driven by a breakpoint envelope: a handful of
(x, y) control points joined by straight lines (or a smoothed curve). The
same shape is used for amplitude, pitch, filter cutoff, and distortion drive;
only the scaling applied by the consumer differs.

Vocabulary
----------

  x           Normalized time. 0.0 is the moment the kick is triggered,
              1.0 is the end of the layer's kick length. A 300ms layer
              evaluated 150ms in reads the curve at x = 0.5.

  y           Normalized value in 0.0..=1.0. The consumer scales it: the
              amplitude envelope multiplies the oscillator gain, the
              frequency envelope multiplies the base frequency, and so on.

  endpoint    The first and last points. They are pinned to x = 0 and
              x = 1 so the curve always covers the whole kick. Their y can
              be edited, their x cannot, and they can never be removed.


The Shape
---------

  y
  1.0 ●╮
      │ ╲
      │  ╲
      │   ●──╮
      │       ╲___
      │           ╲______
  0.0 └───────────────────●──→ x
      0                   1

Points are stored sorted by x with no two points sharing an x (within
`X_EPSILON`). Editing never reorders points: a point can slide between its
two neighbours but can not reach or pass them.


Evaluation
----------

value_at(t) finds the segment [a, b] with a.x <= t < b.x by binary search
(`partition_point`), then interpolates:

    frac  = (t - a.x) / (b.x - a.x)
    value = a.y + (b.y - a.y) * shape(frac)

where shape is the identity for Linear and (1 - cos(pi * frac)) / 2 for
Cosine. Both shapes hit 0 and 1 at the segment ends, so the curve is
continuous across every breakpoint. Times before the first point read the
first y, times after the last point read the last y.

Evaluation only reads the point slice. It never allocates, which is what
makes it safe to call from the audio thread.
*/

/// Points closer than this along x are considered to be at the same position.
pub const X_EPSILON: f32 = 1e-6;

/// Most points a single curve may hold, endpoints included. A patch with
/// every curve at this size still encodes far below the state blob limit.
pub const MAX_POINTS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    pub x: f32,
    pub y: f32,
}

impl EnvelopePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// How the curve travels between two breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interpolation {
    /// Straight line segments.
    #[default]
    Linear,
    /// Half-cosine ease between points. Flat at every breakpoint.
    Cosine,
}

/// Ordered, editable breakpoint curve.
///
/// Invariant: at least two points, the first at x = 0, the last at x = 1,
/// x strictly increasing, every coordinate inside 0.0..=1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveRepr", into = "CurveRepr")]
pub struct EnvelopeCurve {
    points: Vec<EnvelopePoint>,
    interpolation: Interpolation,
}

impl EnvelopeCurve {
    /// Two-point curve at 1.0 for the whole kick.
    pub fn new() -> Self {
        Self::flat(1.0)
    }

    /// Two-point curve holding `level` (clamped to 0..=1) for the whole kick.
    pub fn flat(level: f32) -> Self {
        let level = if level.is_finite() { level.clamp(0.0, 1.0) } else { 1.0 };
        Self {
            points: vec![EnvelopePoint::new(0.0, level), EnvelopePoint::new(1.0, level)],
            interpolation: Interpolation::Linear,
        }
    }

    /// Build a curve from `(x, y)` pairs. The pairs must already satisfy the
    /// curve invariant.
    pub fn from_points(points: &[(f32, f32)]) -> Result<Self> {
        check_point_count(points.len())?;
        let mut stored = Vec::new();
        stored
            .try_reserve_exact(points.len())
            .map_err(|_| KickError::AllocationFailure {
                context: "building an envelope curve",
            })?;
        stored.extend(points.iter().map(|&(x, y)| EnvelopePoint::new(x, y)));
        validate_points(&stored)?;

        Ok(Self {
            points: stored,
            interpolation: Interpolation::Linear,
        })
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn points(&self) -> &[EnvelopePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a curve keeps its two endpoints.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Insert a point, keeping x order. Returns the index it landed at.
    pub fn add_point(&mut self, x: f32, y: f32) -> Result<usize> {
        check_range("envelope x", x, 0.0, 1.0)?;
        check_range("envelope y", y, 0.0, 1.0)?;
        check_point_count(self.points.len() + 1)?;

        let index = self.points.partition_point(|p| p.x < x);
        let collides_next = self
            .points
            .get(index)
            .is_some_and(|p| (p.x - x).abs() <= X_EPSILON);
        let collides_prev = index
            .checked_sub(1)
            .and_then(|i| self.points.get(i))
            .is_some_and(|p| (x - p.x).abs() <= X_EPSILON);
        if collides_next || collides_prev {
            return Err(KickError::DuplicateX { x });
        }

        self.points
            .try_reserve(1)
            .map_err(|_| KickError::AllocationFailure {
                context: "adding an envelope point",
            })?;
        self.points.insert(index, EnvelopePoint::new(x, y));
        Ok(index)
    }

    /// Move point `index` to `(x, y)`. Endpoints may only change their y.
    pub fn update_point(&mut self, index: usize, x: f32, y: f32) -> Result<usize> {
        let len = self.points.len();
        if index >= len {
            return Err(KickError::OutOfRange { index, len });
        }
        check_range("envelope x", x, 0.0, 1.0)?;
        check_range("envelope y", y, 0.0, 1.0)?;

        if index == 0 || index == len - 1 {
            let pinned = if index == 0 { 0.0 } else { 1.0 };
            if (x - pinned).abs() > X_EPSILON {
                return Err(KickError::BoundaryViolation { index, pinned });
            }
            self.points[index] = EnvelopePoint::new(pinned, y);
            return Ok(index);
        }

        let prev = self.points[index - 1].x;
        let next = self.points[index + 1].x;
        if x <= prev + X_EPSILON || x >= next - X_EPSILON {
            return Err(KickError::OrderingConflict { index, x });
        }

        self.points[index] = EnvelopePoint::new(x, y);
        Ok(index)
    }

    /// Remove an interior point and return what is left.
    pub fn remove_point(&mut self, index: usize) -> Result<&[EnvelopePoint]> {
        let len = self.points.len();
        if index >= len {
            return Err(KickError::OutOfRange { index, len });
        }
        if index == 0 || index == len - 1 {
            return Err(KickError::ProtectedEndpoint { index });
        }

        self.points.remove(index);
        Ok(&self.points)
    }

    /// Evaluate the curve at normalized time `t`.
    #[inline]
    pub fn value_at(&self, t: f32) -> f32 {
        let points = self.points.as_slice();
        let first = points[0];
        let last = points[points.len() - 1];

        // `!(t > x)` also routes NaN to the first point
        if !(t > first.x) {
            return first.y;
        }
        if t >= last.x {
            return last.y;
        }

        let upper = points.partition_point(|p| p.x <= t);
        let a = points[upper - 1];
        let b = points[upper];

        let frac = (t - a.x) / (b.x - a.x);
        let shaped = match self.interpolation {
            Interpolation::Linear => frac,
            Interpolation::Cosine => (1.0 - (frac * PI).cos()) * 0.5,
        };

        a.y + (b.y - a.y) * shaped
    }
}

impl Default for EnvelopeCurve {
    fn default() -> Self {
        Self::new()
    }
}

fn check_point_count(len: usize) -> Result<()> {
    if (2..=MAX_POINTS).contains(&len) {
        Ok(())
    } else {
        Err(KickError::range("envelope points", len as f32, 2.0, MAX_POINTS as f32))
    }
}

fn validate_points(points: &[EnvelopePoint]) -> Result<()> {
    check_point_count(points.len())?;

    for point in points {
        check_range("envelope x", point.x, 0.0, 1.0)?;
        check_range("envelope y", point.y, 0.0, 1.0)?;
    }

    let first = points[0];
    let last = points[points.len() - 1];
    if first.x != 0.0 {
        return Err(KickError::BoundaryViolation { index: 0, pinned: 0.0 });
    }
    if last.x != 1.0 {
        return Err(KickError::BoundaryViolation {
            index: points.len() - 1,
            pinned: 1.0,
        });
    }

    for (index, pair) in points.windows(2).enumerate() {
        if pair[1].x - pair[0].x <= X_EPSILON {
            return Err(KickError::OrderingConflict {
                index: index + 1,
                x: pair[1].x,
            });
        }
    }

    Ok(())
}

/// Wire shape of a curve. Decoding goes through `TryFrom` so a stored curve
/// is checked against the invariant before it can exist.
#[derive(Serialize, Deserialize)]
struct CurveRepr {
    points: Vec<EnvelopePoint>,
    interpolation: Interpolation,
}

impl TryFrom<CurveRepr> for EnvelopeCurve {
    type Error = KickError;

    fn try_from(repr: CurveRepr) -> Result<Self> {
        validate_points(&repr.points).map_err(|err| KickError::malformed(err.to_string()))?;
        Ok(Self {
            points: repr.points,
            interpolation: repr.interpolation,
        })
    }
}

impl From<EnvelopeCurve> for CurveRepr {
    fn from(curve: EnvelopeCurve) -> Self {
        Self {
            points: curve.points,
            interpolation: curve.interpolation,
        }
    }
}

//! Error type shared by every editing-path operation.
//!
//! The audio path (`KickEngine::render_frame`) has no error path at all; these
//! errors only ever surface on the control side, synchronously, so a
//! presentation layer can reject an edit (snap a dragged point back, keep the
//! previous preset loaded, ...).

use thiserror::Error;

/// Result type alias for kick engine operations
pub type Result<T> = std::result::Result<T, KickError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KickError {
    /// A value fell outside the domain of the parameter it was meant for.
    #[error("{what} out of range: {value} (expected {min}..={max})")]
    InvalidRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// An envelope point already sits at this x position.
    #[error("envelope already has a point at x = {x}")]
    DuplicateX { x: f32 },

    /// Moving a point would collide with or pass an immediate neighbour.
    #[error("moving point {index} to x = {x} conflicts with its neighbour")]
    OrderingConflict { index: usize, x: f32 },

    /// The first and last points are pinned to x = 0 and x = 1.
    #[error("endpoint {index} must stay at x = {pinned}")]
    BoundaryViolation { index: usize, pinned: f32 },

    /// The first and last points can never be removed.
    #[error("point {index} is an endpoint and cannot be removed")]
    ProtectedEndpoint { index: usize },

    /// Point index does not exist.
    #[error("point index {index} out of range (curve has {len} points)")]
    OutOfRange { index: usize, len: usize },

    /// The parameter does not exist on this kind of oscillator.
    #[error("{0}")]
    Unsupported(&'static str),

    /// Serialized state was truncated, corrupt, or held invalid values.
    #[error("malformed state: {reason}")]
    MalformedState { reason: String },

    /// A patch could not be written out.
    #[error("failed to encode state: {reason}")]
    EncodeFailure { reason: String },

    /// Memory could not be reserved for a new curve or point.
    #[error("allocation failed while {context}")]
    AllocationFailure { context: &'static str },
}

impl KickError {
    pub(crate) fn range(what: &'static str, value: f32, min: f32, max: f32) -> Self {
        Self::InvalidRange {
            what,
            value: value as f64,
            min: min as f64,
            max: max as f64,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedState {
            reason: reason.into(),
        }
    }
}

/// Check that `value` is finite and inside `min..=max`.
pub(crate) fn check_range(what: &'static str, value: f32, min: f32, max: f32) -> Result<f32> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(KickError::range(what, value, min, max))
    }
}

use crate::error::{check_range, KickError, Result};

pub const MIN_SAMPLE_RATE: f32 = 8_000.0;
pub const MAX_SAMPLE_RATE: f32 = 384_000.0;

/// Construction-time settings for a kick instance.
///
/// Everything here is fixed for the lifetime of an instance; the sound itself
/// is edited through [`crate::synth::KickController`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f32,
    /// Slots in the control → audio note queue.
    pub message_capacity: usize,
    /// Slots in the outbound "state changed" queue.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            message_capacity: 64,
            event_capacity: 16,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_message_capacity(mut self, capacity: usize) -> Self {
        self.message_capacity = capacity;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_range("sample rate", self.sample_rate, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE)?;
        if self.message_capacity == 0 {
            return Err(KickError::InvalidRange {
                what: "message capacity",
                value: 0.0,
                min: 1.0,
                max: usize::MAX as f64,
            });
        }
        if self.event_capacity == 0 {
            return Err(KickError::InvalidRange {
                what: "event capacity",
                value: 0.0,
                min: 1.0,
                max: usize::MAX as f64,
            });
        }
        Ok(())
    }
}

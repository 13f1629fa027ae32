//! State shared between the audio callback and the UI

/// Engine snapshot pushed once per audio callback (Copy, allocation-free)
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineStatus {
    pub playing: bool,
    pub elapsed_samples: u64,
}

/// Peak and RMS of a buffer
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

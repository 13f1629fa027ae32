pub mod config;
pub mod dsp; // Signal-processing primitives
pub mod error;
pub mod io; // Host event formats
pub mod patch; // Kick parameter tree and state codec
pub mod synth; // Live instance: engine, controller, preview

pub use config::EngineConfig;
pub use error::{KickError, Result};
pub use patch::{EnvelopeTarget, KickPatch, LayerId, OscillatorId, StateCodec, StateFormat};
pub use synth::{create_instance, create_instance_with_patch, KickController, KickEngine, KickInstance};

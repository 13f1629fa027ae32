// Purpose: the live kick instance
// The engine renders on the audio thread; the controller edits on the control
// thread. They share one patch snapshot and two ring buffers.

pub mod controller;
pub mod engine;
pub mod message;
pub mod preview;

use std::sync::Arc;

use arc_swap::ArcSwap;
use rtrb::{Consumer, RingBuffer};
use tracing::info;

use crate::{config::EngineConfig, error::Result, patch::KickPatch};

pub use controller::KickController;
pub use engine::{KickEngine, Transport};
pub use message::{KickEvent, KickMessage, MessageReceiver};
pub use preview::render_preview;

/// Everything a host needs to run one kick. Move `engine` to the audio
/// thread; keep `controller` and `events` on the control side. Dropping the
/// parts destroys the instance.
pub struct KickInstance {
    pub engine: KickEngine,
    pub controller: KickController,
    pub events: Consumer<KickEvent>,
}

pub fn create_instance(config: EngineConfig) -> Result<KickInstance> {
    create_instance_with_patch(config, KickPatch::new())
}

/// Create an instance starting from `patch` instead of the default kick.
pub fn create_instance_with_patch(config: EngineConfig, patch: KickPatch) -> Result<KickInstance> {
    config.validate()?;
    patch.validate()?;

    let shared = Arc::new(ArcSwap::from_pointee(patch));
    let (tx, rx) = RingBuffer::new(config.message_capacity);
    let (event_tx, event_rx) = RingBuffer::new(config.event_capacity);

    info!(
        sample_rate = config.sample_rate,
        message_capacity = config.message_capacity,
        "kick instance created"
    );

    Ok(KickInstance {
        engine: KickEngine::new(shared.clone(), rx, config.sample_rate),
        controller: KickController::new(shared, tx, event_tx, config.sample_rate),
        events: event_rx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KickError;

    #[test]
    fn rejects_bad_sample_rate() {
        let config = EngineConfig::default().with_sample_rate(100.0);
        assert!(matches!(create_instance(config), Err(KickError::InvalidRange { .. })));
    }

    #[test]
    fn note_on_reaches_the_engine() {
        let KickInstance {
            mut engine,
            mut controller,
            ..
        } = create_instance(EngineConfig::default()).unwrap();

        assert_eq!(engine.render_frame(), 0.0);
        controller.note_on(1.0).unwrap();
        engine.render_frame();
        assert!(engine.is_playing());
        assert_eq!(engine.elapsed_samples(), 1);
    }
}

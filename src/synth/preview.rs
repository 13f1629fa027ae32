//! Offline rendering of a whole kick, for the kick graph in an editor.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::{
    patch::KickPatch,
    synth::{
        engine::KickEngine,
        message::{KickMessage, MessageReceiver},
    },
};

struct NoMessages;

impl MessageReceiver for NoMessages {
    fn pop(&mut self) -> Option<KickMessage> {
        None
    }
}

/// Render `patch` at full velocity from note-on until every enabled layer has
/// finished. Uses a private engine, so it never disturbs live playback.
pub fn render_preview(patch: &KickPatch, sample_rate: f32) -> Vec<f32> {
    let len = patch.longest_length_samples(sample_rate) as usize;
    let shared = Arc::new(ArcSwap::from_pointee(patch.clone()));
    let mut engine = KickEngine::new(shared, NoMessages, sample_rate);

    engine.note_on(1.0);
    let mut out = vec![0.0; len];
    engine.render_block(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::LayerId;

    #[test]
    fn preview_covers_the_longest_layer() {
        let mut patch = KickPatch::new();
        patch.layer_mut(LayerId::Layer3).set_enabled(true);
        patch.layer_mut(LayerId::Layer3).set_length(0.5).unwrap();

        let preview = render_preview(&patch, 8_000.0);
        assert_eq!(preview.len(), 4_000);

        // Layer 1 stops at 0.3 s; layer 3 keeps sounding
        assert!(preview[3_000..].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn preview_is_repeatable() {
        let patch = KickPatch::new();
        assert_eq!(render_preview(&patch, 48_000.0), render_preview(&patch, 48_000.0));
    }

    #[test]
    fn silent_patch_has_empty_preview() {
        let mut patch = KickPatch::new();
        patch.layer_mut(LayerId::Layer1).set_enabled(false);
        assert!(render_preview(&patch, 48_000.0).is_empty());
    }
}

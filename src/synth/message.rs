use rtrb::Consumer;

/// Control path → audio path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum KickMessage {
    /// Start (or restart) the kick. Velocity is already normalized to [0, 1].
    NoteOn { velocity: f32 },
    /// Accepted for host compatibility; a kick always plays out its length.
    NoteOff,
}

/// Core → presentation layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KickEvent {
    /// Something in the patch changed; re-read through the getters.
    StateChanged,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<KickMessage>;
}

impl MessageReceiver for Consumer<KickMessage> {
    fn pop(&mut self) -> Option<KickMessage> {
        Consumer::pop(self).ok()
    }
}

use crate::{io::midi::MidiEvent, synth::message::KickMessage};

/// Map a MIDI event to a kick message. Any key triggers the kick.
/// `channel_filter` of `None` listens on every channel.
/// A note-on with velocity 0 counts as a note-off.
pub fn midi_to_message(midi: MidiEvent, channel_filter: Option<u8>) -> Option<KickMessage> {
    let listening = |channel: u8| channel_filter.map_or(true, |c| c == channel);

    match midi {
        MidiEvent::NoteOn {
            channel, velocity, ..
        } if listening(channel) => Some(if velocity == 0 {
            KickMessage::NoteOff
        } else {
            KickMessage::NoteOn {
                velocity: velocity_to_gain(velocity),
            }
        }),
        MidiEvent::NoteOff { channel, .. } if listening(channel) => Some(KickMessage::NoteOff),
        _ => None,
    }
}

/// MIDI velocity 0..=127 to [0, 1].
pub fn velocity_to_gain(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0
}

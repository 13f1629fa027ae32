#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Parse one raw channel message as delivered by a plugin host.
    /// System and malformed messages yield `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;
        let data1 = || data.first().copied().filter(|b| b & 0x80 == 0);
        let data2 = || data.get(1).copied().filter(|b| b & 0x80 == 0);

        match status & 0xF0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: data1()?,
                velocity: data2()?,
            }),
            0x90 => Some(MidiEvent::NoteOn {
                channel,
                key: data1()?,
                velocity: data2()?,
            }),
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: data1()?,
                value: data2()?,
            }),
            0xC0 => Some(MidiEvent::ProgramChange {
                channel,
                program: data1()?,
            }),
            0xE0 => {
                let raw = (data2()? as i16) << 7 | data1()? as i16;
                Some(MidiEvent::PitchBend {
                    channel,
                    value: raw - 8192,
                })
            }
            _ => None,
        }
    }
}

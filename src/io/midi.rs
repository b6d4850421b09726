/// Channel every sequence is written to and played on (channel 1 in user terms)
pub const DEFAULT_CHANNEL: u8 = 0;

/// Controller number of the "all notes off" channel mode message
const ALL_NOTES_OFF: u8 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl MidiEvent {
    pub fn all_notes_off(channel: u8) -> Self {
        MidiEvent::ControlChange {
            channel,
            controller: ALL_NOTES_OFF,
            value: 0,
        }
    }

    /// Raw three-byte channel message (status, data1, data2)
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            } => [0x90 | (channel & 0x0F), key & 0x7F, velocity & 0x7F],
            MidiEvent::NoteOff {
                channel,
                key,
                velocity,
            } => [0x80 | (channel & 0x0F), key & 0x7F, velocity & 0x7F],
            MidiEvent::ControlChange {
                channel,
                controller,
                value,
            } => [0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_messages_use_standard_status_bytes() {
        let on = MidiEvent::NoteOn {
            channel: 0,
            key: 60,
            velocity: 64,
        };
        let off = MidiEvent::NoteOff {
            channel: 2,
            key: 72,
            velocity: 64,
        };
        assert_eq!(on.to_bytes(), [0x90, 60, 64]);
        assert_eq!(off.to_bytes(), [0x82, 72, 64]);
        assert_eq!(MidiEvent::all_notes_off(0).to_bytes(), [0xB0, 123, 0]);
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::notes::Pitch;
use crate::io::midi::MidiEvent;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NoteOn,
    NoteOff,
}

/// A single timed event in a sequence
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteEvent {
    pub kind: EventKind,
    pub pitch: Pitch,
    /// MIDI velocity (0-127)
    pub velocity: u8,
    /// Ticks elapsed since the previous event
    pub delta_ticks: u32,
}

impl NoteEvent {
    pub fn note_on(pitch: Pitch, velocity: u8, delta_ticks: u32) -> Self {
        Self {
            kind: EventKind::NoteOn,
            pitch,
            velocity,
            delta_ticks,
        }
    }

    pub fn note_off(pitch: Pitch, velocity: u8, delta_ticks: u32) -> Self {
        Self {
            kind: EventKind::NoteOff,
            pitch,
            velocity,
            delta_ticks,
        }
    }

    /// The channel message this event becomes on the wire
    pub fn to_midi(&self, channel: u8) -> MidiEvent {
        let key = self.pitch.get();
        match self.kind {
            EventKind::NoteOn => MidiEvent::NoteOn {
                channel,
                key,
                velocity: self.velocity,
            },
            EventKind::NoteOff => MidiEvent::NoteOff {
                channel,
                key,
                velocity: self.velocity,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_channel_message() {
        let pitch = Pitch::new(60).unwrap();
        let on = NoteEvent::note_on(pitch, 64, 0).to_midi(0);
        let off = NoteEvent::note_off(pitch, 64, 480).to_midi(3);

        assert!(matches!(on, MidiEvent::NoteOn { channel: 0, key: 60, velocity: 64 }));
        assert!(matches!(off, MidiEvent::NoteOff { channel: 3, key: 60, velocity: 64 }));
    }
}

use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// Translate a channel message into a synth command, dropping other channels
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff {
            channel,
            key,
            velocity,
        } if channel == channel_filter => Some(SynthMessage::NoteOff {
            note: key,
            velocity,
        }),
        MidiEvent::ControlChange {
            channel,
            controller: 123,
            ..
        } if channel == channel_filter => Some(SynthMessage::AllNotesOff),
        _ => None,
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_channel() {
        let on = MidiEvent::NoteOn {
            channel: 1,
            key: 60,
            velocity: 64,
        };
        assert!(midi_to_synth(on, 0).is_none());
        assert!(matches!(
            midi_to_synth(on, 1),
            Some(SynthMessage::NoteOn {
                note: 60,
                velocity: 64
            })
        ));
    }

    #[test]
    fn all_notes_off_controller() {
        assert!(matches!(
            midi_to_synth(MidiEvent::all_notes_off(0), 0),
            Some(SynthMessage::AllNotesOff)
        ));
        let sustain = MidiEvent::ControlChange {
            channel: 0,
            controller: 64,
            value: 127,
        };
        assert!(midi_to_synth(sustain, 0).is_none());
    }

    #[test]
    fn octave_doubles_frequency() {
        assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_note_to_freq(81) - 880.0).abs() < 1e-2);
    }
}

use crate::synth::{
    message::{MessageReceiver, SynthMessage},
    voice::{Voice, VoiceState},
};

/// Small polyphonic sine synth fed by a message queue
pub struct PolySynth<R: MessageReceiver> {
    voices: Vec<Voice>,
    rx: R,
    frame_counter: u64,
}

impl<R: MessageReceiver> PolySynth<R> {
    pub fn new(sample_rate: f32, max_voices: usize, rx: R, attack: f32, release: f32) -> Self {
        let voices = (0..max_voices)
            .map(|_| Voice::new(sample_rate, attack, release))
            .collect();

        Self {
            voices,
            rx,
            frame_counter: 0,
        }
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        // Process control messages
        while let Some(msg) = self.rx.pop() {
            match msg {
                SynthMessage::NoteOn { note, velocity } => {
                    let age = self.frame_counter;
                    if let Some(voice) = self.allocate_voice() {
                        voice.start(note, velocity, age);
                    }
                }
                SynthMessage::NoteOff { note, .. } => {
                    if let Some(voice) = self.find_voice(note) {
                        voice.release();
                    }
                }
                SynthMessage::AllNotesOff => {
                    for voice in &mut self.voices {
                        voice.release();
                    }
                }
            }
        }

        out.fill(0.0);
        for voice in &mut self.voices {
            voice.render(out);
        }

        self.frame_counter += out.len() as u64;
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    fn allocate_voice(&mut self) -> Option<&mut Voice> {
        // First pass: find free voice index
        let free_idx = self.voices.iter().position(|v| v.is_free());
        if let Some(idx) = free_idx {
            return Some(&mut self.voices[idx]);
        }

        // Second pass: steal oldest releasing voice
        let steal_idx = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state() == VoiceState::Releasing)
            .min_by_key(|(_, v)| v.age())
            .map(|(idx, _)| idx);

        steal_idx.map(|idx| &mut self.voices[idx])
    }

    fn find_voice(&mut self, note: u8) -> Option<&mut Voice> {
        self.voices
            .iter_mut()
            .find(|v| v.note() == note && v.state() == VoiceState::Active)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn synth() -> PolySynth<VecDeque<SynthMessage>> {
        PolySynth::new(48_000.0, 2, VecDeque::new(), 0.001, 0.005)
    }

    fn peak(buf: &[f32]) -> f32 {
        buf.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn note_on_sounds_and_note_off_fades_out() {
        let mut poly = synth();
        let mut buf = vec![0.0; 512];

        poly.rx.push_back(SynthMessage::NoteOn {
            note: 60,
            velocity: 64,
        });
        poly.render_block(&mut buf);
        assert!(peak(&buf) > 0.0);
        assert_eq!(poly.active_voices(), 1);

        poly.rx.push_back(SynthMessage::NoteOff {
            note: 60,
            velocity: 64,
        });
        poly.render_block(&mut buf);
        poly.render_block(&mut buf);
        assert_eq!(poly.active_voices(), 0);
        assert_eq!(peak(&buf), 0.0);
    }

    #[test]
    fn extra_notes_steal_releasing_voices_only() {
        let mut poly = synth();
        let mut buf = vec![0.0; 64];

        for note in [60, 62, 64] {
            poly.rx.push_back(SynthMessage::NoteOn { note, velocity: 64 });
        }
        poly.render_block(&mut buf);
        // Two voices, both held: the third note is dropped
        assert_eq!(poly.active_voices(), 2);

        poly.rx.push_back(SynthMessage::NoteOff {
            note: 60,
            velocity: 0,
        });
        poly.rx.push_back(SynthMessage::NoteOn {
            note: 67,
            velocity: 64,
        });
        poly.render_block(&mut buf);
        assert_eq!(poly.active_voices(), 2);
    }

    #[test]
    fn all_notes_off_releases_everything() {
        let mut poly = synth();
        let mut buf = vec![0.0; 1024];

        poly.rx.push_back(SynthMessage::NoteOn {
            note: 60,
            velocity: 64,
        });
        poly.rx.push_back(SynthMessage::NoteOn {
            note: 64,
            velocity: 64,
        });
        poly.render_block(&mut buf);
        poly.rx.push_back(SynthMessage::AllNotesOff);
        poly.render_block(&mut buf);
        assert_eq!(poly.active_voices(), 0);
    }
}

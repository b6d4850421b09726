use thiserror::Error;

use super::duration::Duration;
use super::event::{EventKind, NoteEvent};
use super::notes::Pitch;
use super::tempo::Tempo;

/// Default timing resolution, matching common sequencer output
pub const DEFAULT_PPQ: u16 = 480;
/// Medium loudness
pub const DEFAULT_VELOCITY: u8 = 64;
/// Largest division a metrical SMF header can carry (15 bits)
pub const MAX_PPQ: u16 = 0x7FFF;
/// Largest delta-time a variable-length quantity can carry (28 bits)
pub const MAX_DELTA_TICKS: u32 = 0x0FFF_FFFF;

/// An immutable, monophonic run of note-on/note-off pairs.
///
/// Every NoteOn is immediately followed by the NoteOff for the same pitch,
/// so no two notes ever overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    /// Pulses per quarter note (timing resolution)
    ppq: u16,
    tempo: Tempo,
    events: Vec<NoteEvent>,
}

impl Sequence {
    /// Start a builder with 480 PPQ, 120 BPM, velocity 64 and quarter notes
    pub fn builder() -> SequenceBuilder {
        SequenceBuilder::new()
    }

    /// Shortcut for a builder with default settings
    pub fn from_pitches(pitches: &[u8]) -> Result<Sequence, SequenceError> {
        Self::builder().pitches(pitches.iter().copied()).build()
    }

    /// Wrap events produced elsewhere (e.g. a parsed file), checking the pairing invariant
    pub fn from_events(
        events: Vec<NoteEvent>,
        ppq: u16,
        tempo: Tempo,
    ) -> Result<Sequence, SequenceError> {
        if ppq == 0 || ppq > MAX_PPQ {
            return Err(SequenceError::InvalidResolution(ppq));
        }
        if events.is_empty() {
            return Err(SequenceError::Empty);
        }
        if events.len() % 2 != 0 {
            return Err(SequenceError::Unpaired {
                index: events.len() - 1,
            });
        }

        if let Some(event) = events.iter().find(|e| e.delta_ticks > MAX_DELTA_TICKS) {
            return Err(SequenceError::NoteTooLong(event.delta_ticks));
        }

        // A note-on needs 1-127 (0 means note-off on the wire); a note-off may be silent
        for (index, event) in events.iter().enumerate() {
            let lowest = match event.kind {
                EventKind::NoteOn => 1,
                EventKind::NoteOff => 0,
            };
            if !(lowest..=127).contains(&event.velocity) {
                return Err(SequenceError::EventVelocityOutOfRange {
                    index,
                    velocity: event.velocity,
                });
            }
        }

        for (pair_index, pair) in events.chunks_exact(2).enumerate() {
            let (on, off) = (&pair[0], &pair[1]);
            let paired = on.kind == EventKind::NoteOn
                && off.kind == EventKind::NoteOff
                && on.pitch == off.pitch;
            if !paired {
                return Err(SequenceError::Unpaired {
                    index: pair_index * 2,
                });
            }
        }

        Ok(Sequence { ppq, tempo, events })
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn ppq(&self) -> u16 {
        self.ppq
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    /// Sum of all delta-times
    pub fn total_ticks(&self) -> u64 {
        self.events.iter().map(|e| e.delta_ticks as u64).sum()
    }

    /// Wall-clock length at the sequence tempo
    pub fn duration(&self) -> std::time::Duration {
        self.tempo.ticks_to_duration(self.total_ticks(), self.ppq)
    }

    /// The pitch of each note, in playing order
    pub fn pitches(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.events
            .iter()
            .filter(|e| e.kind == EventKind::NoteOn)
            .map(|e| e.pitch)
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a NoteEvent;
    type IntoIter = std::slice::Iter<'a, NoteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Builder for turning a list of pitches into a sequence
#[derive(Debug, Clone)]
pub struct SequenceBuilder {
    ppq: u16,
    bpm: f64,
    velocity: u8,
    note_length: Duration,
    pitches: Vec<u8>,
}

impl SequenceBuilder {
    fn new() -> Self {
        Self {
            ppq: DEFAULT_PPQ,
            bpm: Tempo::DEFAULT.bpm(),
            velocity: DEFAULT_VELOCITY,
            note_length: Duration::QUARTER,
            pitches: Vec::new(),
        }
    }

    /// Set the timing resolution in pulses per quarter note
    pub fn ppq(mut self, ppq: u16) -> Self {
        self.ppq = ppq;
        self
    }

    /// Set the tempo in beats per minute
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    /// Set the velocity used for every note-on and note-off
    pub fn velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set how long each note sounds before its note-off
    pub fn note_length(mut self, note_length: Duration) -> Self {
        self.note_length = note_length;
        self
    }

    /// Append one pitch
    pub fn pitch(mut self, pitch: u8) -> Self {
        self.pitches.push(pitch);
        self
    }

    /// Append pitches in playing order
    pub fn pitches(mut self, pitches: impl IntoIterator<Item = u8>) -> Self {
        self.pitches.extend(pitches);
        self
    }

    /// Build the final sequence
    pub fn build(self) -> Result<Sequence, SequenceError> {
        if self.ppq == 0 || self.ppq > MAX_PPQ {
            return Err(SequenceError::InvalidResolution(self.ppq));
        }
        let tempo = Tempo::from_bpm(self.bpm).ok_or(SequenceError::InvalidTempo(self.bpm))?;
        if !(1..=127).contains(&self.velocity) {
            return Err(SequenceError::VelocityOutOfRange(self.velocity));
        }
        let note_ticks = self.note_length.to_ticks(self.ppq);
        if note_ticks == 0 {
            return Err(SequenceError::ZeroLength);
        }
        if note_ticks > MAX_DELTA_TICKS {
            return Err(SequenceError::NoteTooLong(note_ticks));
        }
        if self.pitches.is_empty() {
            return Err(SequenceError::Empty);
        }

        let mut events = Vec::with_capacity(self.pitches.len() * 2);
        for (index, &note) in self.pitches.iter().enumerate() {
            let pitch =
                Pitch::new(note).ok_or(SequenceError::PitchOutOfRange { index, pitch: note })?;
            events.push(NoteEvent::note_on(pitch, self.velocity, 0));
            events.push(NoteEvent::note_off(pitch, self.velocity, note_ticks));
        }

        Ok(Sequence {
            ppq: self.ppq,
            tempo,
            events,
        })
    }
}

/// Errors that can occur when building a sequence
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SequenceError {
    #[error("sequence has no notes")]
    Empty,
    #[error("pitch {pitch} at position {index} is outside the MIDI range 0-127")]
    PitchOutOfRange { index: usize, pitch: u8 },
    #[error("velocity {0} is outside 1-127")]
    VelocityOutOfRange(u8),
    #[error("note length rounds to zero ticks")]
    ZeroLength,
    #[error("timing resolution {0} is outside 1-32767 ticks per quarter note")]
    InvalidResolution(u16),
    #[error("note length of {0} ticks does not fit in a MIDI delta-time")]
    NoteTooLong(u32),
    #[error("tempo {0} BPM cannot be stored in a MIDI file (about 3.58 to 60000000 BPM)")]
    InvalidTempo(f64),
    #[error("event {index} has velocity {velocity}, outside what a MIDI note message carries")]
    EventVelocityOutOfRange { index: usize, velocity: u8 },
    #[error("event {index} does not start a note-on/note-off pair for a single pitch")]
    Unpaired { index: usize },
}

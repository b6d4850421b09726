#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Pitches
=======

A pitch is a MIDI note number: an integer semitone index where middle C (C4)
is 60 and A4 (the 440 Hz tuning reference) is 69. The MIDI wire format uses
7 bits for the key, so the valid range is 0..=127.

The MIDI formula: note_number = 12 * (octave + 1) + semitone
Where semitone: C=0, C#=1, D=2, D#=3, E=4, F=5, F#=6, G=7, G#=8, A=9, A#=10, B=11

Scales are described as semitone steps from the tonic. A major scale walks
whole, whole, half, whole, whole, whole, half:

    C4  D4  E4  F4  G4  A4  B4  C5
    60  62  64  65  67  69  71  72
      +2  +2  +1  +2  +2  +2  +1
*/

/// Highest key a MIDI message can carry
pub const MAX_PITCH: u8 = 127;

/// A validated MIDI note number (0..=127)
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(u8);

impl Pitch {
    /// Returns `None` when `note` does not fit in 7 bits
    pub const fn new(note: u8) -> Option<Self> {
        if note <= MAX_PITCH {
            Some(Self(note))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Pitch {
    type Error = u8;

    fn try_from(note: u8) -> Result<Self, Self::Error> {
        Pitch::new(note).ok_or(note)
    }
}

impl From<Pitch> for u8 {
    fn from(pitch: Pitch) -> Self {
        pitch.0
    }
}

impl std::fmt::Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        let octave = (self.0 / 12) as i8 - 1;
        write!(f, "{}{}", NAMES[(self.0 % 12) as usize], octave)
    }
}

// Octave 4 (Middle C octave) and the top of the default scale
pub const C4: u8 = 60;
pub const D4: u8 = 62;
pub const E4: u8 = 64;
pub const F4: u8 = 65;
pub const G4: u8 = 67;
pub const A4: u8 = 69; // A440 tuning reference
pub const B4: u8 = 71;
pub const C5: u8 = 72;

/// The C major scale from middle C up one octave
pub const C_MAJOR_C4: [u8; 8] = [C4, D4, E4, F4, G4, A4, B4, C5];

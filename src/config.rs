use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::playback::SinkKind;
use crate::sequencing::{
    sequence::{DEFAULT_PPQ, DEFAULT_VELOCITY},
    Duration, Sequence, SequenceError, Tempo, C_MAJOR_C4,
};

/// File the scale is written to, relative to the working directory
pub const DEFAULT_OUTPUT_PATH: &str = "c_major_scale.mid";

/// Everything that shapes one build → write → play run.
///
/// `Default` is the one-octave C major scale in quarter notes at 120 BPM,
/// velocity 64, 480 PPQ, written to `c_major_scale.mid` and played on the
/// default MIDI output.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleConfig {
    pub pitches: Vec<u8>,
    pub bpm: f64,
    pub ppq: u16,
    pub velocity: u8,
    pub note_length: Duration,
    pub output_path: PathBuf,
    pub sink: SinkKind,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            pitches: C_MAJOR_C4.to_vec(),
            bpm: Tempo::DEFAULT.bpm(),
            ppq: DEFAULT_PPQ,
            velocity: DEFAULT_VELOCITY,
            note_length: Duration::QUARTER,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            sink: SinkKind::default(),
        }
    }
}

impl ScaleConfig {
    /// Check every field without producing anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyOutputPath);
        }
        self.build_sequence()?;
        Ok(())
    }

    pub fn build_sequence(&self) -> Result<Sequence, SequenceError> {
        Sequence::builder()
            .ppq(self.ppq)
            .bpm(self.bpm)
            .velocity(self.velocity)
            .note_length(self.note_length)
            .pitches(self.pitches.iter().copied())
            .build()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("output path is empty")]
    EmptyOutputPath,
    #[error("invalid note settings")]
    Sequence(#[from] SequenceError),
}

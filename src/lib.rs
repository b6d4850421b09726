pub mod config;
pub mod io; // SMF files and wire messages
pub mod playback; // Real-time delivery to live outputs
pub mod sequencing; // Pitches, timing and the event stream
pub mod synth; // Software synth behind the audio sink

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

pub use config::ScaleConfig;
pub use io::{read_smf, write_smf};
pub use playback::{NoteSink, Player};
pub use sequencing::{Sequence, SequenceError};

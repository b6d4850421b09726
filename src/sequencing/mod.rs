// Purpose: musical timing and the note-event stream model

pub mod duration;
pub mod event;
pub mod notes;
pub mod sequence;
pub mod tempo;

pub use duration::Duration;
pub use event::{EventKind, NoteEvent};
pub use notes::{Pitch, C_MAJOR_C4};
pub use sequence::{Sequence, SequenceBuilder, SequenceError};
pub use tempo::Tempo;

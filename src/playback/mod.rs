// Purpose: real-time delivery of note events to live outputs

#[cfg(feature = "rtrb")]
pub mod audio_out;
pub mod clock;
pub mod midi_out;
pub mod player;
pub mod sink;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use clock::{Clock, ManualClock, SystemClock};
pub use player::{PlaybackReport, Player};
pub use sink::{NoteSink, PlaybackError, RecordedEvent, RecordingSink};

use crate::sequencing::Sequence;

/// Which live output to acquire
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SinkKind {
    /// First MIDI output port the host reports
    #[default]
    Midi,
    /// Built-in sine synth on the default audio device
    Synth,
}

/// Acquire the default output of the given kind
pub fn open_sink(kind: SinkKind) -> Result<Box<dyn NoteSink>, PlaybackError> {
    match kind {
        SinkKind::Midi => Ok(Box::new(midi_out::MidiOutputSink::open_default()?)),
        #[cfg(feature = "rtrb")]
        SinkKind::Synth => Ok(Box::new(audio_out::SynthSink::open_default()?)),
        #[cfg(not(feature = "rtrb"))]
        SinkKind::Synth => Err(PlaybackError::DeviceUnavailable(
            "built without the software synth (enable the `rtrb` feature)".to_string(),
        )),
    }
}

/// Open a sink, play the sequence on it, and drop the sink afterwards.
///
/// The sink is released on every path: after the last event, after a
/// failed send, and (trivially) when opening fails.
pub fn play_with<C, S, F>(
    player: &mut Player<C>,
    open: F,
    sequence: &Sequence,
) -> Result<PlaybackReport, PlaybackError>
where
    C: Clock,
    S: NoteSink,
    F: FnOnce() -> Result<S, PlaybackError>,
{
    let mut sink = open()?;
    player.play(sequence, &mut sink)
}

/// Open the default sink of `kind` and play the sequence in real time
pub fn play_on(kind: SinkKind, sequence: &Sequence) -> Result<PlaybackReport, PlaybackError> {
    play_with(&mut Player::new(), || open_sink(kind), sequence)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::io::midi::MidiEvent;
    use crate::sequencing::C_MAJOR_C4;

    /// Accepts `limit` sends, then fails; flags `released` when dropped
    struct ScopedSink {
        limit: usize,
        sent: usize,
        released: Rc<Cell<bool>>,
    }

    impl ScopedSink {
        fn opener(
            limit: usize,
            released: &Rc<Cell<bool>>,
        ) -> impl FnOnce() -> Result<ScopedSink, PlaybackError> {
            let released = Rc::clone(released);
            move || {
                Ok(ScopedSink {
                    limit,
                    sent: 0,
                    released,
                })
            }
        }
    }

    impl NoteSink for ScopedSink {
        fn send(&mut self, _event: MidiEvent) -> Result<(), PlaybackError> {
            if self.sent == self.limit {
                return Err(PlaybackError::Send("port went away".into()));
            }
            self.sent += 1;
            Ok(())
        }
    }

    impl Drop for ScopedSink {
        fn drop(&mut self) {
            self.released.set(true);
        }
    }

    #[test]
    fn sink_is_released_after_playback() {
        let released = Rc::new(Cell::new(false));
        let mut player = Player::with_clock(ManualClock::new());
        let seq = Sequence::from_pitches(&C_MAJOR_C4).unwrap();

        let open = ScopedSink::opener(usize::MAX, &released);
        let report = play_with(&mut player, open, &seq).unwrap();

        assert_eq!(report.events_sent, 16);
        assert!(released.get());
    }

    #[test]
    fn sink_is_released_when_a_send_fails() {
        let released = Rc::new(Cell::new(false));
        let mut player = Player::with_clock(ManualClock::new());
        let seq = Sequence::from_pitches(&C_MAJOR_C4).unwrap();

        let result = play_with(&mut player, ScopedSink::opener(3, &released), &seq);

        assert!(matches!(result, Err(PlaybackError::Send(_))));
        assert!(released.get());
    }

    #[test]
    fn open_failure_is_returned_before_playing() {
        let clock = ManualClock::new();
        let mut player = Player::with_clock(clock.clone());
        let seq = Sequence::from_pitches(&C_MAJOR_C4).unwrap();

        let result = play_with(
            &mut player,
            || -> Result<ScopedSink, PlaybackError> {
                Err(PlaybackError::DeviceUnavailable("no MIDI output ports found".into()))
            },
            &seq,
        );

        assert!(matches!(result, Err(PlaybackError::DeviceUnavailable(_))));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[cfg(not(feature = "rtrb"))]
    #[test]
    fn synth_sink_needs_the_rtrb_feature() {
        assert!(matches!(
            open_sink(SinkKind::Synth),
            Err(PlaybackError::DeviceUnavailable(_))
        ));
    }
}

use std::time::Duration;

use thiserror::Error;

use super::clock::Clock;
use crate::io::midi::MidiEvent;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no output device available: {0}")]
    DeviceUnavailable(String),
    #[error("failed to connect to output: {0}")]
    Connect(String),
    #[error("failed to send event to output: {0}")]
    Send(String),
    #[error("audio stream error: {0}")]
    Stream(String),
}

/// A live destination for note events
pub trait NoteSink {
    fn send(&mut self, event: MidiEvent) -> Result<(), PlaybackError>;
}

impl<S: NoteSink + ?Sized> NoteSink for Box<S> {
    fn send(&mut self, event: MidiEvent) -> Result<(), PlaybackError> {
        (**self).send(event)
    }
}

/// Keys currently held down on an output, so they can be released on close
#[derive(Debug, Default)]
pub struct SoundingNotes {
    held: Vec<(u8, u8)>,
}

impl SoundingNotes {
    pub fn track(&mut self, event: &MidiEvent) {
        match *event {
            MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            } if velocity > 0 => {
                if !self.held.contains(&(channel, key)) {
                    self.held.push((channel, key));
                }
            }
            MidiEvent::NoteOn { channel, key, .. } | MidiEvent::NoteOff { channel, key, .. } => {
                self.held.retain(|&held| held != (channel, key));
            }
            MidiEvent::ControlChange { .. } => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Note-offs for everything still held, forgetting them
    pub fn drain_note_offs(&mut self) -> Vec<MidiEvent> {
        self.held
            .drain(..)
            .map(|(channel, key)| MidiEvent::NoteOff {
                channel,
                key,
                velocity: 0,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedEvent {
    /// Clock reading when the event arrived
    pub at: Duration,
    pub event: MidiEvent,
}

/// Sink that keeps every event it receives, stamped with `clock`
#[derive(Debug)]
pub struct RecordingSink<C: Clock> {
    clock: C,
    events: Vec<RecordedEvent>,
}

impl<C: Clock> RecordingSink<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn messages(&self) -> impl Iterator<Item = MidiEvent> + '_ {
        self.events.iter().map(|r| r.event)
    }
}

impl<C: Clock> NoteSink for RecordingSink<C> {
    fn send(&mut self, event: MidiEvent) -> Result<(), PlaybackError> {
        self.events.push(RecordedEvent {
            at: self.clock.elapsed(),
            event,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::clock::ManualClock;

    fn on(key: u8) -> MidiEvent {
        MidiEvent::NoteOn {
            channel: 0,
            key,
            velocity: 64,
        }
    }

    fn off(key: u8) -> MidiEvent {
        MidiEvent::NoteOff {
            channel: 0,
            key,
            velocity: 64,
        }
    }

    #[test]
    fn sounding_notes_follow_on_and_off() {
        let mut notes = SoundingNotes::default();
        notes.track(&on(60));
        notes.track(&on(64));
        notes.track(&on(60));
        notes.track(&off(64));

        assert_eq!(
            notes.drain_note_offs(),
            vec![MidiEvent::NoteOff {
                channel: 0,
                key: 60,
                velocity: 0
            }]
        );
        assert!(notes.is_empty());
    }

    #[test]
    fn zero_velocity_note_on_releases() {
        let mut notes = SoundingNotes::default();
        notes.track(&on(60));
        notes.track(&MidiEvent::NoteOn {
            channel: 0,
            key: 60,
            velocity: 0,
        });
        assert!(notes.is_empty());
    }

    #[test]
    fn recording_sink_stamps_with_clock() {
        let mut clock = ManualClock::default();
        let mut sink = RecordingSink::new(clock.clone());

        sink.send(on(60)).unwrap();
        clock.sleep(Duration::from_millis(250));
        sink.send(off(60)).unwrap();

        let at: Vec<_> = sink.events().iter().map(|r| r.at).collect();
        assert_eq!(at, vec![Duration::ZERO, Duration::from_millis(250)]);
        assert_eq!(sink.messages().collect::<Vec<_>>(), vec![on(60), off(60)]);
    }
}

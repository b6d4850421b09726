//! Standard MIDI File encoding and decoding for note sequences.
//!
//! Files are written as format 1 with a single track on channel 1, metrical
//! timing at the sequence resolution, and an End-of-Track meta event. A tempo
//! meta event is only emitted when the tempo differs from the implicit 120 BPM.

use std::path::Path;

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::io::midi::DEFAULT_CHANNEL;
use crate::sequencing::{EventKind, NoteEvent, Pitch, Sequence, SequenceError, Tempo};

#[derive(Debug, Error)]
pub enum SmfError {
    #[error("failed to access MIDI file")]
    Io(#[from] std::io::Error),
    #[error("malformed MIDI file")]
    Parse(#[from] midly::Error),
    #[error("timecode-based MIDI files are not supported")]
    UnsupportedTiming,
    #[error("MIDI file contains no note events")]
    NoNotes,
    #[error("MIDI file notes do not form a valid sequence")]
    Sequence(#[from] SequenceError),
}

/// Encode a sequence as SMF bytes. Same input always yields the same bytes.
pub fn to_bytes(sequence: &Sequence) -> Result<Vec<u8>, SmfError> {
    let header = Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(sequence.ppq())),
    );
    let mut smf = Smf::new(header);
    smf.tracks.push(encode_track(sequence));

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes)?;
    Ok(bytes)
}

fn encode_track(sequence: &Sequence) -> Vec<TrackEvent<'static>> {
    let channel = u4::new(DEFAULT_CHANNEL);
    let mut track = Vec::with_capacity(sequence.len() + 2);

    if !sequence.tempo().is_default() {
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(
                sequence.tempo().micros_per_quarter(),
            ))),
        });
    }

    // Pitch and velocity ranges are checked when the sequence is built
    for event in sequence {
        let key = u7::new(event.pitch.get());
        let vel = u7::new(event.velocity);
        let message = match event.kind {
            EventKind::NoteOn => MidiMessage::NoteOn { key, vel },
            EventKind::NoteOff => MidiMessage::NoteOff { key, vel },
        };
        track.push(TrackEvent {
            delta: u28::new(event.delta_ticks),
            kind: TrackEventKind::Midi { channel, message },
        });
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}

/// Write a sequence to `path`, replacing any existing file
pub fn write_smf(sequence: &Sequence, path: impl AsRef<Path>) -> Result<(), SmfError> {
    let path = path.as_ref();
    let bytes = to_bytes(sequence)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), events = sequence.len(), "wrote MIDI file");
    Ok(())
}

/// Decode SMF bytes into a sequence.
///
/// Notes are taken from the first track that has any; tempo from the first
/// tempo meta event in any track. Delta-times of skipped events carry over to
/// the next note event.
pub fn from_bytes(bytes: &[u8]) -> Result<Sequence, SmfError> {
    let smf = Smf::parse(bytes)?;
    let ppq = match smf.header.timing {
        Timing::Metrical(ticks_per_beat) => ticks_per_beat.as_int(),
        Timing::Timecode(..) => return Err(SmfError::UnsupportedTiming),
    };

    let mut tempo: Option<Tempo> = None;
    let mut notes: Option<Vec<NoteEvent>> = None;

    for (index, track) in smf.tracks.iter().enumerate() {
        let mut events = Vec::new();
        let mut pending_ticks: u64 = 0;

        for event in track {
            pending_ticks += event.delta.as_int() as u64;
            let (key, vel, is_on) = match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(micros)) => {
                    if tempo.is_none() {
                        tempo = Tempo::from_micros_per_quarter(micros.as_int());
                    }
                    continue;
                }
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, vel },
                    ..
                } => (key, vel, vel.as_int() > 0),
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOff { key, vel },
                    ..
                } => (key, vel, false),
                _ => continue,
            };

            let Some(pitch) = Pitch::new(key.as_int()) else {
                continue;
            };
            let delta = u32::try_from(pending_ticks).unwrap_or(u32::MAX);
            pending_ticks = 0;
            events.push(if is_on {
                NoteEvent::note_on(pitch, vel.as_int(), delta)
            } else {
                NoteEvent::note_off(pitch, vel.as_int(), delta)
            });
        }

        if notes.is_none() && !events.is_empty() {
            debug!(track = index, events = events.len(), "found note track");
            notes = Some(events);
        }
    }

    let events = notes.ok_or(SmfError::NoNotes)?;
    Ok(Sequence::from_events(
        events,
        ppq,
        tempo.unwrap_or(Tempo::DEFAULT),
    )?)
}

/// Read and decode the file at `path`
pub fn read_smf(path: impl AsRef<Path>) -> Result<Sequence, SmfError> {
    let bytes = std::fs::read(path)?;
    from_bytes(&bytes)
}

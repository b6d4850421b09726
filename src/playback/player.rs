//! Real-time playback of a sequence into a sink.
//!
//! Each event is due at the playback start plus the tempo-converted sum of all
//! delta-times up to and including it. Waiting for absolute deadlines keeps
//! slow sends from pushing later notes back.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::sink::{NoteSink, PlaybackError, SoundingNotes};
use crate::io::midi::DEFAULT_CHANNEL;
use crate::sequencing::Sequence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackReport {
    pub events_sent: usize,
    /// Length of the sequence at its tempo
    pub scheduled: Duration,
    /// Clock time actually spent playing
    pub elapsed: Duration,
}

pub struct Player<C: Clock = SystemClock> {
    clock: C,
    channel: u8,
}

impl Player<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for Player<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Player<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            channel: DEFAULT_CHANNEL,
        }
    }

    /// Set the MIDI channel (0-15) events are sent on
    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = channel & 0x0F;
        self
    }

    /// Play every event in order, blocking until the last one is sent.
    ///
    /// If the sink fails, notes left sounding are released (best effort)
    /// before the error is returned.
    pub fn play<S: NoteSink + ?Sized>(
        &mut self,
        sequence: &Sequence,
        sink: &mut S,
    ) -> Result<PlaybackReport, PlaybackError> {
        let tempo = sequence.tempo();
        let ppq = sequence.ppq();
        let start = self.clock.elapsed();
        let mut sounding = SoundingNotes::default();
        let mut ticks: u64 = 0;

        info!(
            events = sequence.len(),
            bpm = tempo.bpm(),
            ppq,
            "starting playback"
        );

        for (index, event) in sequence.iter().enumerate() {
            ticks += event.delta_ticks as u64;
            let due = start + tempo.ticks_to_duration(ticks, ppq);
            let now = self.clock.elapsed();
            if due > now {
                self.clock.sleep(due - now);
            }

            let message = event.to_midi(self.channel);
            if let Err(err) = sink.send(message) {
                warn!(index, %err, "send failed, releasing held notes");
                release_all(sink, &mut sounding);
                return Err(err);
            }
            sounding.track(&message);
            debug!(index, pitch = %event.pitch, kind = ?event.kind, tick = ticks, "sent event");
        }

        let report = PlaybackReport {
            events_sent: sequence.len(),
            scheduled: tempo.ticks_to_duration(ticks, ppq),
            elapsed: self.clock.elapsed().saturating_sub(start),
        };
        info!(elapsed = ?report.elapsed, "playback finished");
        Ok(report)
    }
}

fn release_all<S: NoteSink + ?Sized>(sink: &mut S, sounding: &mut SoundingNotes) {
    for note_off in sounding.drain_note_offs() {
        if let Err(err) = sink.send(note_off) {
            warn!(%err, ?note_off, "could not release note");
        }
    }
}

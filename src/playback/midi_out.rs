use midir::{MidiOutput, MidiOutputConnection};
use tracing::{info, warn};

use super::sink::{NoteSink, PlaybackError, SoundingNotes};
use crate::io::midi::MidiEvent;

/// Name this process registers with the host MIDI system
pub const CLIENT_NAME: &str = "scale-player";

/// Connection to the host's default (first) MIDI output port.
///
/// Dropping the sink releases any note still held and closes the port.
pub struct MidiOutputSink {
    conn: Option<MidiOutputConnection>,
    port_name: String,
    sounding: SoundingNotes,
}

impl MidiOutputSink {
    pub fn open_default() -> Result<Self, PlaybackError> {
        let output = MidiOutput::new(CLIENT_NAME)
            .map_err(|e| PlaybackError::DeviceUnavailable(e.to_string()))?;

        let ports = output.ports();
        let port = ports.first().ok_or_else(|| {
            PlaybackError::DeviceUnavailable("no MIDI output ports found".to_string())
        })?;
        let port_name = output
            .port_name(port)
            .unwrap_or_else(|_| "unnamed port".to_string());

        let conn = output
            .connect(port, "scale-out")
            .map_err(|e| PlaybackError::Connect(e.to_string()))?;

        info!(port = %port_name, available = ports.len(), "opened MIDI output");
        Ok(Self {
            conn: Some(conn),
            port_name,
            sounding: SoundingNotes::default(),
        })
    }
}

impl NoteSink for MidiOutputSink {
    fn send(&mut self, event: MidiEvent) -> Result<(), PlaybackError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| PlaybackError::Send("connection closed".to_string()))?;
        conn.send(&event.to_bytes())
            .map_err(|e| PlaybackError::Send(e.to_string()))?;
        self.sounding.track(&event);
        Ok(())
    }
}

impl Drop for MidiOutputSink {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        for note_off in self.sounding.drain_note_offs() {
            if let Err(err) = conn.send(&note_off.to_bytes()) {
                warn!(%err, ?note_off, "could not release note on close");
            }
        }
        conn.close();
        info!(port = %self.port_name, "closed MIDI output");
    }
}

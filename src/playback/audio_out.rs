//! Built-in software synth as a note sink.
//!
//! Note events are translated to `SynthMessage`s and pushed through a
//! lock-free ring buffer to the cpal audio callback, which renders them with a
//! `PolySynth` and copies the mono signal to every output channel.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};
use tracing::{error, info, warn};

use super::sink::{NoteSink, PlaybackError};
use crate::io::converter::midi_to_synth;
use crate::io::midi::{MidiEvent, DEFAULT_CHANNEL};
use crate::synth::{message::SynthMessage, poly::PolySynth};
use crate::MAX_BLOCK_SIZE;

const QUEUE_SIZE: usize = 256;
const MAX_VOICES: usize = 8;
const ATTACK_SECONDS: f32 = 0.01;
const RELEASE_SECONDS: f32 = 0.15;

pub struct SynthSink {
    tx: Producer<SynthMessage>,
    stream: cpal::Stream,
    channel: u8,
}

impl SynthSink {
    /// Open the host's default audio output
    pub fn open_default() -> Result<Self, PlaybackError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            PlaybackError::DeviceUnavailable("no default audio output device".to_string())
        })?;
        let config = device
            .default_output_config()
            .map_err(|e| PlaybackError::DeviceUnavailable(e.to_string()))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let (tx, rx) = RingBuffer::<SynthMessage>::new(QUEUE_SIZE);
        let mut synth = PolySynth::new(sample_rate, MAX_VOICES, rx, ATTACK_SECONDS, RELEASE_SECONDS);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;

                    while frames_written < total_frames {
                        let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut render_buf[..frames_to_render];
                        synth.render_block(block);

                        // Copy to output (mono to all channels)
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = s;
                            }
                        }

                        frames_written += frames_to_render;
                    }
                },
                |err| error!(%err, "audio stream error"),
                None,
            )
            .map_err(|e| PlaybackError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| PlaybackError::Stream(e.to_string()))?;

        info!(sample_rate, channels, "opened audio output");
        Ok(Self {
            tx,
            stream,
            channel: DEFAULT_CHANNEL,
        })
    }
}

impl NoteSink for SynthSink {
    fn send(&mut self, event: MidiEvent) -> Result<(), PlaybackError> {
        let Some(message) = midi_to_synth(event, self.channel) else {
            return Ok(());
        };
        self.tx
            .push(message)
            .map_err(|_| PlaybackError::Send("synth message queue is full".to_string()))
    }
}

impl Drop for SynthSink {
    fn drop(&mut self) {
        if queue_all_notes_off(&mut self.tx) {
            std::thread::sleep(std::time::Duration::from_secs_f32(RELEASE_SECONDS));
        }
        if let Err(err) = self.stream.pause() {
            error!(%err, "could not stop audio stream");
        }
        info!("closed audio output");
    }
}

/// Ask the synth to release every voice; false if the queue had no room
fn queue_all_notes_off(tx: &mut Producer<SynthMessage>) -> bool {
    match tx.push(SynthMessage::AllNotesOff) {
        Ok(()) => true,
        Err(err) => {
            warn!(?err, "could not queue all-notes-off");
            false
        }
    }
}

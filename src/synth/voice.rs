use std::f32::consts::TAU;

use crate::io::converter::midi_note_to_freq;
use crate::MIN_TIME;

/// Keeps a full chord below clipping
const VOICE_GAIN: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Playing, envelope rising or holding
    Releasing, // Key released, envelope falling
}

/// A sine voice with a linear attack/release envelope.
///
/// The envelope ramps 0 → 1 over `attack` seconds on note-on and from the
/// current level → 0 over `release` seconds on note-off. A voice frees itself
/// once the release reaches silence.
#[derive(Debug)]
pub struct Voice {
    note: u8,
    velocity: u8,
    state: VoiceState,
    age: u64,
    sample_rate: f32,
    attack: f32,
    release: f32,
    phase: f32,
    level: f32,
    release_step: f32,
}

impl Voice {
    pub fn new(sample_rate: f32, attack: f32, release: f32) -> Self {
        Self {
            note: 0,
            velocity: 0,
            state: VoiceState::Free,
            age: 0,
            sample_rate,
            attack: attack.max(MIN_TIME),
            release: release.max(MIN_TIME),
            phase: 0.0,
            level: 0.0,
            release_step: 0.0,
        }
    }

    pub fn start(&mut self, note: u8, velocity: u8, age: u64) {
        self.note = note;
        self.velocity = velocity;
        self.state = VoiceState::Active;
        self.age = age;
        // Reset for a clean retrigger
        self.phase = 0.0;
        self.level = 0.0;
    }

    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            let samples = (self.release * self.sample_rate).max(1.0);
            self.release_step = self.level / samples;
        }
    }

    /// Add this voice's output into `out`
    pub fn render(&mut self, out: &mut [f32]) {
        if self.state == VoiceState::Free {
            return;
        }

        let phase_step = midi_note_to_freq(self.note) / self.sample_rate;
        let attack_step = 1.0 / (self.attack * self.sample_rate);
        let amplitude = VOICE_GAIN * self.velocity as f32 / 127.0;

        for sample in out.iter_mut() {
            match self.state {
                VoiceState::Active => self.level = (self.level + attack_step).min(1.0),
                VoiceState::Releasing => {
                    self.level -= self.release_step;
                    if self.level <= 0.0 {
                        self.free();
                        return;
                    }
                }
                VoiceState::Free => return,
            }

            *sample += (self.phase * TAU).sin() * self.level * amplitude;
            self.phase = (self.phase + phase_step).fract();
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.note = 0;
        self.velocity = 0;
        self.level = 0.0;
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }
}

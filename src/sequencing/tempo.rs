#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Microseconds per quarter note a Standard MIDI File assumes without a tempo event
pub const DEFAULT_MICROS_PER_QUARTER: u32 = 500_000;

/// Largest value the 24-bit SMF tempo meta event can carry
pub const MAX_MICROS_PER_QUARTER: u32 = 0x00FF_FFFF;

const MICROS_PER_MINUTE: f64 = 60_000_000.0;

/// Tempo as microseconds per quarter note, the unit a MIDI file stores.
///
/// Only tempos that survive a write/read cycle can be constructed, roughly
/// 3.58 to 60 000 000 BPM.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tempo {
    micros_per_quarter: u32,
}

impl Tempo {
    /// 120 BPM, the implicit tempo of a MIDI file
    pub const DEFAULT: Tempo = Tempo {
        micros_per_quarter: DEFAULT_MICROS_PER_QUARTER,
    };

    /// Returns `None` unless `bpm` rounds to a storable tempo
    pub fn from_bpm(bpm: f64) -> Option<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return None;
        }
        // Range check on the float before narrowing
        let micros = (MICROS_PER_MINUTE / bpm).round();
        if !(1.0..=MAX_MICROS_PER_QUARTER as f64).contains(&micros) {
            return None;
        }
        Self::from_micros_per_quarter(micros as u32)
    }

    /// Tempo from an SMF tempo meta value
    pub fn from_micros_per_quarter(micros: u32) -> Option<Self> {
        (1..=MAX_MICROS_PER_QUARTER)
            .contains(&micros)
            .then_some(Self {
                micros_per_quarter: micros,
            })
    }

    pub fn bpm(&self) -> f64 {
        MICROS_PER_MINUTE / self.micros_per_quarter as f64
    }

    /// Value of the SMF tempo meta event
    pub fn micros_per_quarter(&self) -> u32 {
        self.micros_per_quarter
    }

    pub fn is_default(&self) -> bool {
        self.micros_per_quarter == DEFAULT_MICROS_PER_QUARTER
    }

    /// Wall-clock length of `ticks` at `ppq` pulses per quarter note
    pub fn ticks_to_duration(&self, ticks: u64, ppq: u16) -> std::time::Duration {
        // nanos = ticks * micros_per_quarter * 1000 / ppq, exact in u128
        let nanos = ticks as u128 * self.micros_per_quarter as u128 * 1_000 / ppq.max(1) as u128;
        std::time::Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

impl TryFrom<u32> for Tempo {
    type Error = u32;

    fn try_from(micros: u32) -> Result<Self, Self::Error> {
        Tempo::from_micros_per_quarter(micros).ok_or(micros)
    }
}

impl From<Tempo> for u32 {
    fn from(tempo: Tempo) -> Self {
        tempo.micros_per_quarter
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_tempo_is_half_a_second_per_quarter() {
        let tempo = Tempo::default();
        assert_eq!(tempo.micros_per_quarter(), 500_000);
        assert!(tempo.is_default());
        assert_eq!(tempo.ticks_to_duration(480, 480), Duration::from_millis(500));
    }

    #[test]
    fn eight_quarters_at_120_take_four_seconds() {
        let tempo = Tempo::DEFAULT;
        assert_eq!(tempo.ticks_to_duration(8 * 480, 480), Duration::from_secs(4));
    }

    #[test]
    fn meta_value_round_trips() {
        let tempo = Tempo::from_bpm(90.0).unwrap();
        assert_eq!(tempo.micros_per_quarter(), 666_667);
        let back = Tempo::from_micros_per_quarter(tempo.micros_per_quarter()).unwrap();
        assert_eq!(back, tempo);
        assert!((back.bpm() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn tempos_outside_24_bits_are_rejected() {
        // Slower than 60e6 / 0xFFFFFF BPM does not fit the meta event
        assert!(Tempo::from_bpm(1.0).is_none());
        assert!(Tempo::from_bpm(3.5).is_none());
        assert!(Tempo::from_bpm(3.58).is_some());
        assert!(Tempo::from_bpm(1e-300).is_none());
        // Faster than one microsecond per quarter rounds to zero
        assert!(Tempo::from_bpm(60_000_000.0).is_some());
        assert!(Tempo::from_bpm(1.0e9).is_none());

        assert!(Tempo::from_micros_per_quarter(MAX_MICROS_PER_QUARTER).is_some());
        assert!(Tempo::from_micros_per_quarter(MAX_MICROS_PER_QUARTER + 1).is_none());
    }

    #[test]
    fn long_spans_do_not_overflow() {
        let slowest = Tempo::from_micros_per_quarter(MAX_MICROS_PER_QUARTER).unwrap();
        let d = slowest.ticks_to_duration(u64::MAX, 1);
        assert_eq!(d, Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn rejects_nonsense_tempos() {
        assert!(Tempo::from_bpm(0.0).is_none());
        assert!(Tempo::from_bpm(-10.0).is_none());
        assert!(Tempo::from_bpm(f64::NAN).is_none());
        assert!(Tempo::from_bpm(f64::INFINITY).is_none());
        assert!(Tempo::from_micros_per_quarter(0).is_none());
    }
}

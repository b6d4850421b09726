#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Musical note length as a fraction of a whole note.
/// Converted to ticks only once the file resolution is known.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub numerator: u32,
    /// 4 = quarter, 8 = eighth, etc.
    pub denominator: u32,
}

impl Duration {
    pub const WHOLE: Duration = Duration::new(1, 1);
    pub const HALF: Duration = Duration::new(1, 2);
    pub const QUARTER: Duration = Duration::new(1, 4);
    pub const EIGHTH: Duration = Duration::new(1, 8);
    pub const SIXTEENTH: Duration = Duration::new(1, 16);

    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Integer ticks at `ppq` pulses per quarter note.
    /// Formula: ticks = (numerator * 4 * ppq) / denominator
    pub fn to_ticks(&self, ppq: u16) -> u32 {
        if self.denominator == 0 {
            return 0;
        }
        let ticks = (self.numerator as u64 * 4 * ppq as u64) / self.denominator as u64;
        ticks.min(u32::MAX as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PPQ: u16 = 480;

    #[test]
    fn quarter_is_one_beat() {
        assert_eq!(Duration::QUARTER.to_ticks(PPQ), 480);
        assert_eq!(Duration::WHOLE.to_ticks(PPQ), 1920);
        assert_eq!(Duration::SIXTEENTH.to_ticks(PPQ), 120);
    }

    #[test]
    fn odd_fractions_round_down() {
        // dotted quarter, then a quarter-note triplet
        assert_eq!(Duration::new(3, 8).to_ticks(PPQ), 720);
        assert_eq!(Duration::new(1, 6).to_ticks(PPQ), 320);
        assert_eq!(Duration::new(1, 7).to_ticks(PPQ), 274);
    }

    #[test]
    fn zero_denominator_is_zero_ticks() {
        assert_eq!(Duration::new(1, 0).to_ticks(PPQ), 0);
    }
}

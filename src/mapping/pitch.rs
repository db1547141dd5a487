//! Pentatonic note table and axis-to-note selection

use serde::{Deserialize, Serialize};
use std::fmt;

use super::rescale::{clamp, linear_rescale};

/// One of the six pitches a tilt can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pitch {
    C4,
    D4,
    E4,
    G4,
    A4,
    C5,
}

/// The major pentatonic table, lowest first
pub const PENTATONIC: [Pitch; 6] = [Pitch::C4, Pitch::D4, Pitch::E4, Pitch::G4, Pitch::A4, Pitch::C5];

impl Pitch {
    /// Scientific pitch name, e.g. "C4"
    pub fn name(&self) -> &'static str {
        match self {
            Pitch::C4 => "C4",
            Pitch::D4 => "D4",
            Pitch::E4 => "E4",
            Pitch::G4 => "G4",
            Pitch::A4 => "A4",
            Pitch::C5 => "C5",
        }
    }

    /// MIDI note number (middle C = 60)
    pub fn midi_note(&self) -> u8 {
        match self {
            Pitch::C4 => 60,
            Pitch::D4 => 62,
            Pitch::E4 => 64,
            Pitch::G4 => 67,
            Pitch::A4 => 69,
            Pitch::C5 => 72,
        }
    }

    /// Equal-tempered frequency with A4 = 440 Hz
    pub fn frequency_hz(&self) -> f64 {
        440.0 * 2.0_f64.powf((self.midi_note() as f64 - 69.0) / 12.0)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Selects a table entry from an axis reading in `[-range, range]`
///
/// The axis is spread evenly over the table; readings at or beyond either
/// end of the range saturate to the first or last pitch.
pub struct NoteMapper {
    range: f64,
}

impl NoteMapper {
    pub fn new(range: f64) -> Self {
        Self { range }
    }

    /// Table index for an axis reading
    pub fn index(&self, axis: f64) -> usize {
        let last = (PENTATONIC.len() - 1) as f64;
        let scaled = linear_rescale(axis, -self.range, self.range, 0.0, PENTATONIC.len() as f64);
        // Clamp before the cast so huge readings cannot overflow
        clamp(scaled.floor(), 0.0, last) as usize
    }

    /// Pitch for an axis reading
    pub fn pitch(&self, axis: f64) -> Pitch {
        PENTATONIC[self.index(axis)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes_saturate() {
        let mapper = NoteMapper::new(10.0);
        assert_eq!(mapper.pitch(-10.0), Pitch::C4);
        // Index would be 6, clamped to 5
        assert_eq!(mapper.pitch(10.0), Pitch::C5);
        assert_eq!(mapper.pitch(-250.0), Pitch::C4);
        assert_eq!(mapper.pitch(1e300), Pitch::C5);
    }

    #[test]
    fn test_bucket_boundaries() {
        let mapper = NoteMapper::new(10.0);
        // Each bucket is 20/6 wide
        assert_eq!(mapper.pitch(-6.7), Pitch::C4);
        assert_eq!(mapper.pitch(-6.6), Pitch::D4);
        assert_eq!(mapper.pitch(0.0), Pitch::G4);
        assert_eq!(mapper.pitch(-0.1), Pitch::E4);
        assert_eq!(mapper.pitch(9.99), Pitch::C5);
    }

    #[test]
    fn test_monotonic_over_range() {
        let mapper = NoteMapper::new(10.0);
        let mut previous = mapper.pitch(-10.0);
        let mut axis = -10.0;
        while axis <= 10.0 {
            let pitch = mapper.pitch(axis);
            assert!(pitch >= previous, "{} dropped below {} at {}", pitch, previous, axis);
            assert!(PENTATONIC.contains(&pitch));
            previous = pitch;
            axis += 0.05;
        }
    }

    #[test]
    fn test_nan_selects_first_note() {
        let mapper = NoteMapper::new(10.0);
        assert_eq!(mapper.index(f64::NAN), 0);
    }

    #[test]
    fn test_pitch_frequencies() {
        assert_eq!(Pitch::A4.frequency_hz(), 440.0);
        assert!((Pitch::C4.frequency_hz() - 261.626).abs() < 0.01);
        assert!((Pitch::C5.frequency_hz() - 523.251).abs() < 0.01);
    }

    #[test]
    fn test_pitch_display() {
        assert_eq!(Pitch::G4.to_string(), "G4");
        assert_eq!(Pitch::C5.to_string(), "C5");
    }
}

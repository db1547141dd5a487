//! Basic oscillator implementation

use std::f64::consts::TAU;

/// Waveform types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Triangle,
    Saw,
    Square,
}

/// A phase-accumulating oscillator
pub struct Oscillator {
    waveform: Waveform,
    phase: f64,
    frequency: f64,
    sample_rate: f64,
}

impl Oscillator {
    /// Create a new oscillator
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Self {
            waveform,
            phase: 0.0,
            frequency,
            sample_rate,
        }
    }

    /// Set the frequency
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    /// Get the current frequency
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Generate the next sample
    pub fn generate(&mut self) -> f64 {
        self.generate_pm(0.0)
    }

    /// Generate the next sample with the phase pushed forward by `offset`
    /// radians. This is the carrier side of FM (phase modulation).
    pub fn generate_pm(&mut self, offset: f64) -> f64 {
        let p = (self.phase + offset / TAU).rem_euclid(1.0);
        let sample = match self.waveform {
            Waveform::Sine => (p * TAU).sin(),
            Waveform::Triangle => triangle(p),
            Waveform::Saw => 2.0 * p - 1.0,
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };

        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }
}

fn triangle(p: f64) -> f64 {
    if p < 0.25 {
        4.0 * p
    } else if p < 0.75 {
        2.0 - 4.0 * p
    } else {
        4.0 * p - 4.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_oscillator() {
        let mut osc = Oscillator::new(Waveform::Sine, 440.0, 44100.0);

        // First sample should be 0 (sin(0))
        let sample = osc.generate();
        assert!(sample.abs() < 0.001);
    }

    #[test]
    fn test_triangle_oscillator() {
        let mut osc = Oscillator::new(Waveform::Triangle, 1.0, 4.0);

        assert_eq!(osc.generate(), 0.0); // phase 0.0
        assert_eq!(osc.generate(), 1.0); // phase 0.25
        assert_eq!(osc.generate(), 0.0); // phase 0.5
        assert_eq!(osc.generate(), -1.0); // phase 0.75
    }

    #[test]
    fn test_square_oscillator() {
        let mut osc = Oscillator::new(Waveform::Square, 1.0, 4.0);

        assert_eq!(osc.generate(), 1.0);
        assert_eq!(osc.generate(), 1.0);
        assert_eq!(osc.generate(), -1.0);
        assert_eq!(osc.generate(), -1.0);
    }

    #[test]
    fn test_phase_offset_quarter_turn() {
        let mut osc = Oscillator::new(Waveform::Sine, 1.0, 4.0);

        // sin(0 + π/2) = 1
        let sample = osc.generate_pm(std::f64::consts::FRAC_PI_2);
        assert!((sample - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_phase_offset_wraps() {
        let mut osc = Oscillator::new(Waveform::Sine, 1.0, 4.0);

        // sin(-π/2) = -1
        let sample = osc.generate_pm(-std::f64::consts::FRAC_PI_2);
        assert!((sample + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_frequency_change() {
        let mut osc = Oscillator::new(Waveform::Sine, 440.0, 44100.0);
        assert_eq!(osc.frequency(), 440.0);

        osc.set_frequency(880.0);
        assert_eq!(osc.frequency(), 880.0);
    }
}

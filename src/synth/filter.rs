//! Low-pass biquad filter
//!
//! RBJ cookbook low-pass in Direct Form II transposed. Coefficients are
//! recomputed whenever the cutoff changes.

use std::f64::consts::PI;

/// Normalized biquad coefficients
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Butterworth Q
const Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Second-order low-pass filter
pub struct LowPassFilter {
    sample_rate: f64,
    cutoff: f64,
    coeffs: Coefficients,
    z1: f64,
    z2: f64,
}

impl LowPassFilter {
    /// Create a Butterworth low-pass at `cutoff` Hz
    pub fn new(sample_rate: f64, cutoff: f64) -> Self {
        let mut filter = Self {
            sample_rate,
            cutoff: 0.0,
            coeffs: Coefficients { b0: 1.0, b1: 0.0, b2: 0.0, a1: 0.0, a2: 0.0 },
            z1: 0.0,
            z2: 0.0,
        };
        filter.set_cutoff(cutoff);
        filter
    }

    /// Set cutoff frequency in Hz, clamped to 20 Hz..0.45 × sample rate
    pub fn set_cutoff(&mut self, hz: f64) {
        let hz = hz.clamp(20.0, self.sample_rate * 0.45);
        if hz != self.cutoff {
            self.cutoff = hz;
            self.calculate_coefficients();
        }
    }

    /// Get cutoff frequency
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    fn calculate_coefficients(&mut self) {
        let omega = 2.0 * PI * self.cutoff / self.sample_rate;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * Q);

        let a0 = 1.0 + alpha;
        self.coeffs = Coefficients {
            b0: (1.0 - cos_omega) / 2.0 / a0,
            b1: (1.0 - cos_omega) / a0,
            b2: (1.0 - cos_omega) / 2.0 / a0,
            a1: -2.0 * cos_omega / a0,
            a2: (1.0 - alpha) / a0,
        };
    }

    /// Process a single sample
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;
        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak_after_settling(filter: &mut LowPassFilter, freq: f64) -> f64 {
        let mut peak = 0.0f64;
        for i in 0..4410 {
            let t = i as f64 / 44100.0;
            let output = filter.process((2.0 * PI * freq * t).sin());
            if i > 1000 {
                peak = peak.max(output.abs());
            }
        }
        peak
    }

    #[test]
    fn test_cutoff_clamping() {
        let mut filter = LowPassFilter::new(44100.0, 1000.0);

        filter.set_cutoff(5.0);
        assert_eq!(filter.cutoff(), 20.0);

        filter.set_cutoff(25000.0);
        assert!(filter.cutoff() < 44100.0 * 0.5);
    }

    #[test]
    fn test_closed_filter_darkens_high_notes() {
        // Level device: 200 Hz cutoff against a 2 kHz partial
        let mut filter = LowPassFilter::new(44100.0, 200.0);
        assert!(peak_after_settling(&mut filter, 2000.0) < 0.05);
    }

    #[test]
    fn test_open_filter_passes_melody_range() {
        // Fully tilted: 2 kHz cutoff, C5 fundamental passes
        let mut filter = LowPassFilter::new(44100.0, 2000.0);
        assert!(peak_after_settling(&mut filter, 523.25) > 0.9);
    }

    #[test]
    fn test_cutoff_change_keeps_state() {
        let mut filter = LowPassFilter::new(44100.0, 1000.0);
        for _ in 0..100 {
            filter.process(1.0);
        }

        // Moving the cutoff mid-note must not click to zero
        filter.set_cutoff(1500.0);
        assert!(filter.process(1.0) > 0.5);
    }
}

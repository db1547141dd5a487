//! FM voice
//!
//! A sine carrier phase-modulated by a sine modulator at `harmonicity` times
//! the carrier frequency. The modulation depth follows its own slow envelope,
//! so notes start pure and grow brighter while held.

use super::{Adsr, Envelope, Oscillator, Voice, Waveform};

pub struct FmVoice {
    carrier: Oscillator,
    modulator: Oscillator,
    amplitude: Envelope,
    modulation: Envelope,
    harmonicity: f64,
    modulation_index: f64,
    velocity: f64,
}

impl FmVoice {
    pub fn new(sample_rate: f64, harmonicity: f64, modulation_index: f64) -> Self {
        Self {
            carrier: Oscillator::new(Waveform::Sine, 440.0, sample_rate),
            modulator: Oscillator::new(Waveform::Sine, 440.0 * harmonicity, sample_rate),
            amplitude: Envelope::new(sample_rate, Adsr::ORGAN),
            modulation: Envelope::new(sample_rate, Adsr::SWELL),
            harmonicity,
            modulation_index,
            velocity: 1.0,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.carrier.frequency()
    }

    pub fn modulator_frequency(&self) -> f64 {
        self.modulator.frequency()
    }
}

impl Voice for FmVoice {
    fn note_on(&mut self, frequency: f64, velocity: f64) {
        self.carrier.set_frequency(frequency);
        self.modulator.set_frequency(frequency * self.harmonicity);
        self.velocity = velocity.clamp(0.0, 1.0);
        self.amplitude.trigger();
        self.modulation.trigger();
    }

    fn note_off(&mut self) {
        self.amplitude.release();
        self.modulation.release();
    }

    fn is_active(&self) -> bool {
        self.amplitude.is_active()
    }

    fn process(&mut self) -> f64 {
        if !self.amplitude.is_active() {
            return 0.0;
        }
        let depth = self.modulation_index * self.modulation.process();
        let offset = depth * self.modulator.generate();
        self.carrier.generate_pm(offset) * self.amplitude.process() * self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modulator_tracks_carrier() {
        let mut voice = FmVoice::new(44100.0, 3.0, 10.0);
        voice.note_on(261.63, 1.0);
        assert_eq!(voice.frequency(), 261.63);
        assert!((voice.modulator_frequency() - 784.89).abs() < 1e-9);
    }

    #[test]
    fn test_output_bounded_by_velocity() {
        let mut voice = FmVoice::new(44100.0, 3.0, 10.0);
        voice.note_on(440.0, 0.5);

        for _ in 0..44100 {
            assert!(voice.process().abs() <= 0.5 + 1e-12);
        }
    }

    #[test]
    fn test_zero_index_is_pure_sine() {
        let mut fm = FmVoice::new(44100.0, 3.0, 0.0);
        let mut reference = Oscillator::new(Waveform::Sine, 440.0, 44100.0);
        let mut envelope = Envelope::new(44100.0, Adsr::ORGAN);
        fm.note_on(440.0, 1.0);
        envelope.trigger();

        for _ in 0..1000 {
            let expected = reference.generate() * envelope.process();
            assert!((fm.process() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_release_ends_note() {
        let mut voice = FmVoice::new(44100.0, 3.0, 10.0);
        voice.note_on(440.0, 1.0);
        for _ in 0..100 {
            voice.process();
        }
        voice.note_off();

        // Half-second release
        for _ in 0..30000 {
            voice.process();
        }
        assert!(!voice.is_active());
        assert_eq!(voice.process(), 0.0);
    }
}

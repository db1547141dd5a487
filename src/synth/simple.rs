//! Simple voice: triangle oscillator through a pluck envelope

use super::{Adsr, Envelope, Oscillator, Voice, Waveform};

pub struct SimpleVoice {
    oscillator: Oscillator,
    envelope: Envelope,
    velocity: f64,
}

impl SimpleVoice {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            oscillator: Oscillator::new(Waveform::Triangle, 440.0, sample_rate),
            envelope: Envelope::new(sample_rate, Adsr::PLUCK),
            velocity: 1.0,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.oscillator.frequency()
    }
}

impl Voice for SimpleVoice {
    fn note_on(&mut self, frequency: f64, velocity: f64) {
        self.oscillator.set_frequency(frequency);
        self.velocity = velocity.clamp(0.0, 1.0);
        self.envelope.trigger();
    }

    fn note_off(&mut self) {
        self.envelope.release();
    }

    fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    fn process(&mut self) -> f64 {
        if !self.envelope.is_active() {
            return 0.0;
        }
        self.oscillator.generate() * self.envelope.process() * self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_until_note_on() {
        let mut voice = SimpleVoice::new(44100.0);
        assert!(!voice.is_active());
        assert_eq!(voice.process(), 0.0);
    }

    #[test]
    fn test_note_on_sounds() {
        let mut voice = SimpleVoice::new(44100.0);
        voice.note_on(261.63, 1.0);
        assert!(voice.is_active());
        assert_eq!(voice.frequency(), 261.63);

        let peak = (0..2000).map(|_| voice.process().abs()).fold(0.0, f64::max);
        assert!(peak > 0.3);
    }

    #[test]
    fn test_velocity_scales_output() {
        let mut loud = SimpleVoice::new(44100.0);
        let mut soft = SimpleVoice::new(44100.0);
        loud.note_on(440.0, 1.0);
        soft.note_on(440.0, 0.25);

        for _ in 0..500 {
            let l = loud.process();
            let s = soft.process();
            assert!((s - l * 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_note_off_rings_out() {
        let mut voice = SimpleVoice::new(44100.0);
        voice.note_on(440.0, 1.0);
        for _ in 0..1000 {
            voice.process();
        }

        voice.note_off();
        assert!(voice.is_active());

        // One-second release
        for _ in 0..50000 {
            voice.process();
        }
        assert!(!voice.is_active());
    }
}

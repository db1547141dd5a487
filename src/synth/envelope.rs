//! ADSR envelope generator
//!
//! Attack-Decay-Sustain-Release envelope for amplitude shaping. Stages are
//! linear; retriggering ramps up from the current level instead of jumping
//! to zero, which keeps rapid re-triggers click-free.

/// Envelope stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Envelope shape: times in seconds, sustain as a level in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Adsr {
    pub const fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Short pluck that settles low and rings out for a second
    pub const PLUCK: Adsr = Adsr::new(0.005, 0.1, 0.3, 1.0);

    /// Near-instant on, full sustain, half-second tail
    pub const ORGAN: Adsr = Adsr::new(0.01, 0.01, 1.0, 0.5);

    /// Slow swell used for FM modulation depth
    pub const SWELL: Adsr = Adsr::new(0.5, 0.0, 1.0, 0.5);

    fn sanitized(self) -> Self {
        // 1ms floor keeps every stage at least one sample long
        Self {
            attack: self.attack.max(0.001),
            decay: self.decay.max(0.001),
            sustain: self.sustain.clamp(0.0, 1.0),
            release: self.release.max(0.001),
        }
    }
}

/// ADSR envelope generator
pub struct Envelope {
    sample_rate: f64,
    shape: Adsr,
    stage: EnvelopeStage,
    level: f64,
    release_start_level: f64,
}

impl Envelope {
    pub fn new(sample_rate: f64, shape: Adsr) -> Self {
        Self {
            sample_rate,
            shape: shape.sanitized(),
            stage: EnvelopeStage::Idle,
            level: 0.0,
            release_start_level: 0.0,
        }
    }

    pub fn shape(&self) -> Adsr {
        self.shape
    }

    /// Start the attack phase from the current level
    pub fn trigger(&mut self) {
        self.stage = EnvelopeStage::Attack;
    }

    /// Start the release phase
    pub fn release(&mut self) {
        if self.stage != EnvelopeStage::Idle && self.stage != EnvelopeStage::Release {
            self.release_start_level = self.level;
            self.stage = EnvelopeStage::Release;
        }
    }

    /// Get current stage
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Check if envelope is active (not idle)
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    /// Get current level without advancing
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Generate the next envelope sample
    pub fn process(&mut self) -> f64 {
        let dt = 1.0 / self.sample_rate;
        let shape = self.shape;

        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }
            EnvelopeStage::Attack => {
                self.level += dt / shape.attack;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                self.level -= (1.0 - shape.sustain) / shape.decay * dt;
                if self.level <= shape.sustain {
                    self.level = shape.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Sustain => {
                self.level = shape.sustain;
            }
            EnvelopeStage::Release => {
                self.level -= self.release_start_level / shape.release * dt;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_creation() {
        let env = Envelope::new(44100.0, Adsr::PLUCK);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert_eq!(env.level(), 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn test_shape_is_sanitized() {
        let env = Envelope::new(44100.0, Adsr::new(0.0, -1.0, 1.5, 0.0));
        assert_eq!(env.shape(), Adsr::new(0.001, 0.001, 1.0, 0.001));
    }

    #[test]
    fn test_pluck_settles_at_sustain() {
        let mut env = Envelope::new(44100.0, Adsr::PLUCK);
        env.trigger();

        // 5ms attack + 100ms decay ≈ 4630 samples
        for _ in 0..6000 {
            env.process();
        }

        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert!((env.level() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_release_returns_to_idle() {
        let mut env = Envelope::new(44100.0, Adsr::new(0.001, 0.001, 0.5, 0.01));
        env.trigger();
        for _ in 0..200 {
            env.process();
        }

        env.release();
        assert_eq!(env.stage(), EnvelopeStage::Release);

        // 10ms release = 441 samples
        for _ in 0..1000 {
            env.process();
        }
        assert_eq!(env.level(), 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn test_release_from_attack() {
        let mut env = Envelope::new(44100.0, Adsr::SWELL);
        env.trigger();
        for _ in 0..100 {
            env.process();
        }
        let level = env.level();
        assert!(level > 0.0 && level < 1.0);

        env.release();
        let next = env.process();
        assert!(next < level);
    }

    #[test]
    fn test_retrigger_keeps_level() {
        let mut env = Envelope::new(44100.0, Adsr::PLUCK);
        env.trigger();
        for _ in 0..6000 {
            env.process();
        }

        env.trigger();
        assert_eq!(env.stage(), EnvelopeStage::Attack);
        assert!(env.process() > 0.3);
    }
}

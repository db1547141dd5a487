//! Brickwall output limiter

pub struct Limiter {
    ceiling: f64,
    gain: f64,
    release_coeff: f64,
}

impl Limiter {
    /// `ceiling_db` in dBFS; gain recovers over roughly 50ms
    pub fn new(sample_rate: f64, ceiling_db: f64) -> Self {
        Self {
            ceiling: db_to_gain(ceiling_db),
            gain: 1.0,
            release_coeff: (-1.0 / (0.05 * sample_rate)).exp(),
        }
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    /// Current gain reduction factor (1.0 = untouched)
    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn process(&mut self, input: f64) -> f64 {
        let level = input.abs();
        if level * self.gain > self.ceiling {
            // Instant attack
            self.gain = self.ceiling / level;
        } else {
            self.gain = 1.0 - (1.0 - self.gain) * self.release_coeff;
            if level * self.gain > self.ceiling {
                self.gain = self.ceiling / level;
            }
        }
        input * self.gain
    }
}

/// Convert decibels to a linear amplitude factor
pub fn db_to_gain(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

//! Feedback delay line

/// Longest delay the line can hold
pub const MAX_DELAY_SECS: f64 = 2.0;

pub struct FeedbackDelay {
    buffer: Vec<f64>,
    write: usize,
    delay_samples: usize,
    sample_rate: f64,
    feedback: f64,
    wet: f64,
}

impl FeedbackDelay {
    pub fn new(sample_rate: f64, time_secs: f64, feedback: f64, wet: f64) -> Self {
        let capacity = (MAX_DELAY_SECS * sample_rate).ceil() as usize + 1;
        let mut delay = Self {
            buffer: vec![0.0; capacity],
            write: 0,
            delay_samples: 1,
            sample_rate,
            feedback: feedback.clamp(0.0, 0.99),
            wet: wet.clamp(0.0, 1.0),
        };
        delay.set_time(time_secs);
        delay
    }

    /// Delay time, clamped to one sample..[`MAX_DELAY_SECS`]
    pub fn set_time(&mut self, time_secs: f64) {
        let samples = (time_secs * self.sample_rate).round() as usize;
        self.delay_samples = samples.clamp(1, self.buffer.len() - 1);
    }

    pub fn time_secs(&self) -> f64 {
        self.delay_samples as f64 / self.sample_rate
    }

    pub fn process(&mut self, input: f64) -> f64 {
        let len = self.buffer.len();
        let read = (self.write + len - self.delay_samples) % len;
        let delayed = self.buffer[read];
        self.buffer[self.write] = input + delayed * self.feedback;
        self.write = (self.write + 1) % len;
        input * (1.0 - self.wet) + delayed * self.wet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_arrives_after_delay() {
        // 1 kHz sample rate, 100ms = 100 samples
        let mut delay = FeedbackDelay::new(1000.0, 0.1, 0.0, 1.0);
        assert_eq!(delay.process(1.0), 0.0);
        for _ in 1..100 {
            assert_eq!(delay.process(0.0), 0.0);
        }
        assert_eq!(delay.process(0.0), 1.0);
    }

    #[test]
    fn test_feedback_repeats_quieter() {
        let mut delay = FeedbackDelay::new(1000.0, 0.01, 0.5, 1.0);
        let output: Vec<f64> = (0..31).map(|i| delay.process(if i == 0 { 1.0 } else { 0.0 })).collect();
        assert_eq!(output[10], 1.0);
        assert_eq!(output[20], 0.5);
        assert_eq!(output[30], 0.25);
    }

    #[test]
    fn test_time_is_clamped() {
        let mut delay = FeedbackDelay::new(1000.0, 0.1, 0.3, 0.5);
        delay.set_time(10.0);
        assert!((delay.time_secs() - MAX_DELAY_SECS).abs() < 0.002);
        delay.set_time(0.0);
        assert_eq!(delay.time_secs(), 0.001);
    }

    #[test]
    fn test_dry_mix() {
        let mut delay = FeedbackDelay::new(1000.0, 0.1, 0.3, 0.0);
        assert_eq!(delay.process(0.7), 0.7);
    }
}

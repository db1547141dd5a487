//! Activity gate
//!
//! Decides whether a sample carries enough motion to trigger a note. The gate
//! is level-based: it looks only at the current sample, with no hysteresis
//! and no memory of earlier decisions.

use crate::motion::MotionSample;

/// Default total-motion threshold, in sensor units
pub const DEFAULT_THRESHOLD: f64 = 2.0;

/// Threshold on the summed absolute axis values of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityGate {
    threshold: f64,
}

impl ActivityGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// True when `|x| + |y| + |z|` strictly exceeds the threshold
    pub fn is_open(&self, sample: &MotionSample) -> bool {
        sample.total_motion() > self.threshold
    }
}

impl Default for ActivityGate {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_device_is_closed() {
        let gate = ActivityGate::default();
        assert!(!gate.is_open(&MotionSample::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_small_motion_opens() {
        let gate = ActivityGate::default();
        // sum = 3 > 2
        assert!(gate.is_open(&MotionSample::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_threshold_is_strict() {
        let gate = ActivityGate::default();
        assert!(!gate.is_open(&MotionSample::new(1.0, 0.5, 0.5)));
        assert!(gate.is_open(&MotionSample::new(1.0, 0.5, 0.51)));
    }

    #[test]
    fn test_negative_axes_count() {
        let gate = ActivityGate::default();
        assert!(gate.is_open(&MotionSample::new(-1.0, -1.0, -1.0)));
    }

    #[test]
    fn test_no_hysteresis() {
        let gate = ActivityGate::default();
        let loud = MotionSample::new(5.0, 5.0, 5.0);
        let quiet = MotionSample::new(0.5, 0.5, 0.5);

        assert!(gate.is_open(&loud));
        assert!(!gate.is_open(&quiet));
        assert!(gate.is_open(&loud));
        assert!(!gate.is_open(&quiet));
    }
}

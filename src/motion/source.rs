//! MotionSource trait and the events it emits

use std::time::Instant;
use tokio::sync::broadcast;

use super::MotionSample;

/// Something a motion source reports to its subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum MotionEvent {
    /// A fresh reading
    Sample {
        sample: MotionSample,
        received: Instant,
    },
    /// The source has nothing more to deliver (end of a recording)
    Ended,
}

impl MotionEvent {
    pub fn sample(sample: MotionSample) -> Self {
        MotionEvent::Sample {
            sample,
            received: Instant::now(),
        }
    }
}

/// Trait for motion sources
pub trait MotionSource: Send + Sync {
    /// Get the name of this source
    fn name(&self) -> &str;

    /// Start delivering samples. Fails when the sensor cannot be opened.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Stop delivering samples
    fn stop(&mut self);

    /// Check if the source is running
    fn is_running(&self) -> bool;

    /// Subscribe to events from this source
    fn subscribe(&self) -> broadcast::Receiver<MotionEvent>;
}

/// Interval between samples for a delivery rate
pub(crate) fn sample_interval(rate_hz: f64) -> std::time::Duration {
    std::time::Duration::from_secs_f64(1.0 / rate_hz.max(f64::MIN_POSITIVE))
}

//! Simulated motion source
//!
//! Produces a slow, deterministic tilt path so the whole pipeline can run
//! without a sensor. Every eight seconds the device rests for two seconds
//! (all axes near zero) so the activity gate closes.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::source::sample_interval;
use super::{MotionEvent, MotionSample, MotionSource};

const CYCLE_SECS: f64 = 8.0;
const REST_SECS: f64 = 2.0;

/// Reading of the simulated device `t` seconds after start
pub fn simulated_sample(t: f64) -> MotionSample {
    if t.rem_euclid(CYCLE_SECS) >= CYCLE_SECS - REST_SECS {
        // Resting: a faint tremor well under the gate
        let tremor = 0.2 * (TAU * 3.0 * t).sin();
        return MotionSample::new(tremor, tremor * 0.5, tremor * 0.5);
    }

    MotionSample::new(
        9.0 * (TAU * 0.11 * t).sin(),
        10.5 * (TAU * 0.05 * t).sin(),
        9.81 * (TAU * 0.08 * t).cos(),
    )
}

/// Source that plays back [`simulated_sample`] in real time
pub struct SimulatedSource {
    name: String,
    rate_hz: f64,
    running: Arc<AtomicBool>,
    sender: broadcast::Sender<MotionEvent>,
    task: Option<JoinHandle<()>>,
}

impl SimulatedSource {
    pub fn new(name: impl Into<String>, rate_hz: f64) -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            name: name.into(),
            rate_hz,
            running: Arc::new(AtomicBool::new(false)),
            sender,
            task: None,
        }
    }
}

impl MotionSource for SimulatedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> anyhow::Result<()> {
        if self.is_running() {
            return Ok(());
        }

        info!(source = %self.name, rate_hz = self.rate_hz, "starting simulated motion");
        self.running.store(true, Ordering::SeqCst);

        let rate_hz = self.rate_hz;
        let running = Arc::clone(&self.running);
        let sender = self.sender.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sample_interval(rate_hz));
            let mut tick: u64 = 0;

            while running.load(Ordering::SeqCst) {
                ticker.tick().await;
                let sample = simulated_sample(tick as f64 / rate_hz);
                // No receivers is fine
                let _ = sender.send(MotionEvent::sample(sample));
                tick += 1;
            }
            debug!("simulated motion loop finished");
        });

        self.task = Some(task);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<MotionEvent> {
        self.sender.subscribe()
    }
}

impl Drop for SimulatedSource {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_path_is_deterministic() {
        assert_eq!(simulated_sample(1.25), simulated_sample(1.25));
    }

    #[test]
    fn test_path_moves_then_rests() {
        let moving = simulated_sample(1.0);
        assert!(moving.total_motion() > 2.0);

        let resting = simulated_sample(7.0);
        assert!(resting.total_motion() < 2.0);

        // Next cycle moves again
        assert!(simulated_sample(9.0).total_motion() > 2.0);
    }

    #[test]
    fn test_path_reaches_both_ends_of_y() {
        // y = 10.5 sin(2π·0.05·t): peaks at t = 5, troughs at t = 35
        assert!(simulated_sample(5.0).y > 10.0);
        assert!(simulated_sample(35.0).y < -10.0);
    }

    #[tokio::test]
    async fn test_simulated_source_start_stop() {
        let mut source = SimulatedSource::new("sim", 100.0);
        assert!(!source.is_running());

        source.start().unwrap();
        assert!(source.is_running());

        source.stop();
        assert!(!source.is_running());
    }

    #[tokio::test]
    async fn test_simulated_source_delivers_samples() {
        let mut source = SimulatedSource::new("sim", 200.0);
        let mut receiver = source.subscribe();
        source.start().unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), receiver.recv())
            .await
            .expect("timeout")
            .expect("receive error");
        source.stop();

        match event {
            MotionEvent::Sample { sample, .. } => assert_eq!(sample, simulated_sample(0.0)),
            MotionEvent::Ended => panic!("simulated source never ends"),
        }
    }
}

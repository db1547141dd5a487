//! Pipeline from motion events to a sound renderer
//!
//! Each sample goes through the session, which decides whether it becomes a
//! note. Notes go to the renderer; display updates go to the visualization
//! state when one is attached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use super::SoundRenderer;
use crate::mapping::Frame;
use crate::motion::{MotionEvent, MotionSample};
use crate::session::Session;
use crate::viz::VizState;

/// How often the run loop checks the shutdown flag while no samples arrive
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub samples: u64,
    pub notes: u64,
    pub dropped: u64,
}

pub struct Pipeline {
    session: Arc<Mutex<Session>>,
    renderer: Box<dyn SoundRenderer>,
    viz: Option<Arc<Mutex<VizState>>>,
    was_playing: bool,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new(session: Arc<Mutex<Session>>, renderer: Box<dyn SoundRenderer>) -> Self {
        Self {
            session,
            renderer,
            viz: None,
            was_playing: false,
            stats: PipelineStats::default(),
        }
    }

    /// Mirror display updates into a visualization state
    pub fn with_viz(mut self, viz: Arc<Mutex<VizState>>) -> Self {
        self.viz = Some(viz);
        self
    }

    pub fn session(&self) -> &Arc<Mutex<Session>> {
        &self.session
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Handle one sample
    pub fn step(&mut self, sample: MotionSample) -> Result<Frame> {
        let (frame, playing) = {
            let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            let frame = session.on_motion_sample(sample);
            (frame, session.is_playing())
        };
        self.stats.samples += 1;

        if self.was_playing && !playing {
            self.renderer.silence()?;
        }
        self.was_playing = playing;

        if let Frame::Render(command) = &frame {
            self.renderer.render(&command.params)?;
            self.stats.notes += 1;
        }

        if let Some(viz) = &self.viz {
            viz.lock().unwrap_or_else(PoisonError::into_inner).record(&frame);
        }

        Ok(frame)
    }

    /// Consume events until the source ends, the channel closes or `running`
    /// is cleared
    pub async fn run(
        &mut self,
        mut rx: broadcast::Receiver<MotionEvent>,
        running: Arc<AtomicBool>,
    ) -> Result<PipelineStats> {
        info!(renderer = self.renderer.name(), "pipeline started");

        while running.load(Ordering::SeqCst) {
            tokio::select! {
                event = rx.recv() => match event {
                    Ok(MotionEvent::Sample { sample, received }) => {
                        let frame = self.step(sample)?;
                        debug!(
                            render = frame.is_render(),
                            latency_us = received.elapsed().as_micros() as u64,
                            "frame"
                        );
                    }
                    Ok(MotionEvent::Ended) => {
                        info!("motion source ended");
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "pipeline fell behind, dropping samples");
                        self.stats.dropped += skipped;
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = tokio::time::sleep(SHUTDOWN_POLL) => {}
            }
        }

        self.renderer.silence()?;
        info!(
            samples = self.stats.samples,
            notes = self.stats.notes,
            dropped = self.stats.dropped,
            "pipeline stopped"
        );
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Pitch, SynthParams};

    #[derive(Default)]
    struct Log {
        notes: Vec<SynthParams>,
        silences: usize,
    }

    struct Capture(Arc<Mutex<Log>>);

    impl SoundRenderer for Capture {
        fn name(&self) -> &str {
            "capture"
        }

        fn render(&mut self, params: &SynthParams) -> Result<()> {
            self.0.lock().unwrap().notes.push(*params);
            Ok(())
        }

        fn silence(&mut self) -> Result<()> {
            self.0.lock().unwrap().silences += 1;
            Ok(())
        }
    }

    fn pipeline() -> (Pipeline, Arc<Mutex<Log>>) {
        let log = Arc::new(Mutex::new(Log::default()));
        let session = Arc::new(Mutex::new(Session::default()));
        (Pipeline::new(session, Box::new(Capture(log.clone()))), log)
    }

    #[test]
    fn test_nothing_plays_before_start() {
        let (mut pipeline, log) = pipeline();
        let frame = pipeline.step(MotionSample::new(5.0, 5.0, 5.0)).unwrap();

        assert_eq!(frame, Frame::Idle { display: None });
        assert!(log.lock().unwrap().notes.is_empty());
    }

    #[test]
    fn test_active_sample_renders_note() {
        let (mut pipeline, log) = pipeline();
        pipeline.session().lock().unwrap().press();

        let frame = pipeline.step(MotionSample::new(0.0, 0.0, 9.8)).unwrap();
        assert!(frame.is_render());

        let log = log.lock().unwrap();
        assert_eq!(log.notes.len(), 1);
        assert_eq!(log.notes[0].note, Pitch::G4);
        assert_eq!(pipeline.stats().notes, 1);
    }

    #[test]
    fn test_resting_sample_is_idle() {
        let (mut pipeline, log) = pipeline();
        pipeline.session().lock().unwrap().press();

        let frame = pipeline.step(MotionSample::new(0.5, 0.5, 0.5)).unwrap();
        assert!(!frame.is_render());
        assert!(frame.display().is_some());
        assert!(log.lock().unwrap().notes.is_empty());
    }

    #[test]
    fn test_pause_silences_renderer() {
        let (mut pipeline, log) = pipeline();
        pipeline.session().lock().unwrap().press();
        pipeline.step(MotionSample::new(3.0, 3.0, 3.0)).unwrap();

        pipeline.session().lock().unwrap().press();
        pipeline.step(MotionSample::new(3.0, 3.0, 3.0)).unwrap();
        pipeline.step(MotionSample::new(3.0, 3.0, 3.0)).unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.notes.len(), 1);
        assert_eq!(log.silences, 1);
    }

    #[test]
    fn test_viz_receives_display() {
        let (pipeline, _log) = pipeline();
        let viz = Arc::new(Mutex::new(VizState::new(64)));
        let mut pipeline = pipeline.with_viz(viz.clone());
        pipeline.session().lock().unwrap().press();

        pipeline.step(MotionSample::new(-10.0, 10.0, 0.0)).unwrap();

        let viz = viz.lock().unwrap();
        let display = viz.display.unwrap();
        assert_eq!(display.offset.dx, 0.0);
        assert_eq!(display.offset.dy, 100.0);
        assert_eq!(viz.last_note, Some(Pitch::C5));
    }

    #[tokio::test]
    async fn test_run_until_source_ends() {
        let (mut pipeline, log) = pipeline();
        pipeline.session().lock().unwrap().press();

        let (tx, rx) = broadcast::channel(16);
        tx.send(MotionEvent::sample(MotionSample::new(0.0, -10.0, 9.8))).unwrap();
        tx.send(MotionEvent::sample(MotionSample::new(0.1, 0.1, 0.1))).unwrap();
        tx.send(MotionEvent::sample(MotionSample::new(0.0, 9.9, 9.8))).unwrap();
        tx.send(MotionEvent::Ended).unwrap();

        let stats = pipeline.run(rx, Arc::new(AtomicBool::new(true))).await.unwrap();
        assert_eq!(stats.samples, 3);
        assert_eq!(stats.notes, 2);

        let log = log.lock().unwrap();
        assert_eq!(log.notes[0].note, Pitch::C4);
        assert_eq!(log.notes[1].note, Pitch::C5);
        assert_eq!(log.silences, 1);
    }

    #[tokio::test]
    async fn test_run_stops_when_flag_cleared() {
        let (mut pipeline, _log) = pipeline();
        let (_tx, rx) = broadcast::channel::<MotionEvent>(16);

        let stats = pipeline.run(rx, Arc::new(AtomicBool::new(false))).await.unwrap();
        assert_eq!(stats, PipelineStats::default());
    }
}

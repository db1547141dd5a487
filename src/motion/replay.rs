//! Replay source
//!
//! Streams a recording, one sample per line, from a file or standard input
//! at a fixed rate. Malformed lines are logged and skipped; the source sends
//! [`MotionEvent::Ended`] when the input runs out.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::sample::parse_line;
use super::source::sample_interval;
use super::{MotionEvent, MotionSource};

/// Where a replay reads from
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayInput {
    Stdin,
    File(PathBuf),
}

/// Source that replays recorded samples
pub struct ReplaySource {
    name: String,
    input: ReplayInput,
    rate_hz: f64,
    running: Arc<AtomicBool>,
    sender: broadcast::Sender<MotionEvent>,
    task: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(name: impl Into<String>, input: ReplayInput, rate_hz: f64) -> Self {
        let (sender, _) = broadcast::channel(256);
        Self {
            name: name.into(),
            input,
            rate_hz,
            running: Arc::new(AtomicBool::new(false)),
            sender,
            task: None,
        }
    }

    pub fn input(&self) -> &ReplayInput {
        &self.input
    }
}

impl MotionSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> anyhow::Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let reader: Box<dyn AsyncRead + Unpin + Send> = match &self.input {
            ReplayInput::Stdin => Box::new(tokio::io::stdin()),
            ReplayInput::File(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("failed to open recording {:?}", path))?;
                Box::new(tokio::fs::File::from_std(file))
            }
        };

        info!(source = %self.name, input = ?self.input, rate_hz = self.rate_hz, "starting replay");
        self.running.store(true, Ordering::SeqCst);

        let interval = sample_interval(self.rate_hz);
        let running = Arc::clone(&self.running);
        let sender = self.sender.clone();

        let task = tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            let mut ticker = tokio::time::interval(interval);
            let mut line_number = 0;

            while running.load(Ordering::SeqCst) {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "replay read failed");
                        break;
                    }
                };
                line_number += 1;

                match parse_line(&line, line_number) {
                    Ok(Some(sample)) => {
                        ticker.tick().await;
                        let _ = sender.send(MotionEvent::sample(sample));
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "skipping sample"),
                }
            }

            debug!(lines = line_number, "replay finished");
            running.store(false, Ordering::SeqCst);
            let _ = sender.send(MotionEvent::Ended);
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

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MotionSample;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_file_fails_to_start() {
        let mut source = ReplaySource::new(
            "replay",
            ReplayInput::File(PathBuf::from("/definitely/not/here.jsonl")),
            100.0,
        );
        assert!(source.start().is_err());
        assert!(!source.is_running());
    }

    #[tokio::test]
    async fn test_replay_skips_bad_lines_and_ends() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0,0,0").unwrap();
        writeln!(file, "not a sample").unwrap();
        writeln!(file, "{{\"x\": 1, \"y\": -10}}").unwrap();

        let mut source = ReplaySource::new(
            "replay",
            ReplayInput::File(file.path().to_path_buf()),
            1000.0,
        );
        let mut receiver = source.subscribe();
        source.start().unwrap();

        let mut samples = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(2), receiver.recv())
                .await
                .expect("timeout")
                .expect("receive error");
            match event {
                MotionEvent::Sample { sample, .. } => samples.push(sample),
                MotionEvent::Ended => break,
            }
        }

        assert_eq!(
            samples,
            vec![MotionSample::new(0.0, 0.0, 0.0), MotionSample::new(1.0, -10.0, 0.0)]
        );
        assert!(!source.is_running());
    }
}

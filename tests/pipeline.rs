//! End-to-end: replayed motion through the session into the audio engine

use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;

use sway::config::{SoundVariant, SwayConfig};
use sway::engine::{Engine, Pipeline, Recorder};
use sway::mapping::{Frame, MotionMapper, Pitch};
use sway::motion::{read_samples, MotionSource, ReplayInput, ReplaySource};
use sway::session::Session;

const RECORDING: &str = "\
# tilt sweep, then rest
{\"x\": 0.0, \"y\": -10.0, \"z\": 9.8}
0.0,0.0,9.8
{\"x\": 5.0, \"y\": 9.9, \"z\": 2.0}
not a sample
0.2,0.1,0.3
";

fn recording_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(RECORDING.as_bytes()).unwrap();
    file
}

fn session_for(config: &SwayConfig) -> Arc<Mutex<Session>> {
    let mapper = MotionMapper::new(&config.mapping, config.sound.variant, config.display_scale());
    let mut session = Session::new(mapper);
    session.press();
    Arc::new(Mutex::new(session))
}

#[tokio::test]
async fn replay_drives_engine() {
    let file = recording_file();
    let config = SwayConfig::default();

    let engine = Arc::new(Mutex::new(Engine::new(&config)));
    let mut pipeline = Pipeline::new(session_for(&config), Box::new(engine.clone()));

    let mut source = ReplaySource::new("file", ReplayInput::File(file.path().to_path_buf()), 500.0);
    let rx = source.subscribe();
    source.start().unwrap();

    let stats = pipeline
        .run(rx, Arc::new(AtomicBool::new(true)))
        .await
        .unwrap();

    // The malformed line is skipped, the resting sample gates
    assert_eq!(stats.samples, 4);
    assert_eq!(stats.notes, 3);
    assert_eq!(engine.lock().unwrap().notes_played(), 3);
    assert!(!source.is_running());
}

#[test]
fn mapped_frames_follow_the_recording() {
    let samples: Vec<_> = RECORDING
        .lines()
        .filter(|l| !l.starts_with("not"))
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes();
    let samples = read_samples(samples.as_slice()).unwrap();
    assert_eq!(samples.len(), 4);

    let config = SwayConfig::default();
    let session = session_for(&config);
    let mut session = session.lock().unwrap();

    let notes: Vec<Option<Pitch>> = samples
        .into_iter()
        .map(|s| match session.on_motion_sample(s) {
            Frame::Render(command) => Some(command.params.note),
            Frame::Idle { .. } => None,
        })
        .collect();

    assert_eq!(
        notes,
        vec![Some(Pitch::C4), Some(Pitch::G4), Some(Pitch::C5), None]
    );
    assert_eq!(session.status(), "Move device to create sound");
}

#[test]
fn offline_render_writes_audio() {
    let mut config = SwayConfig::default();
    config.sound.variant = SoundVariant::Fm;

    let engine = Arc::new(Mutex::new(Engine::new(&config)));
    let mut pipeline = Pipeline::new(session_for(&config), Box::new(engine.clone()));

    let out = NamedTempFile::new().unwrap();
    let mut recorder = Recorder::new(out.path(), config.audio.sample_rate).unwrap();
    let frames_per_sample = (config.audio.sample_rate as f64 / config.source.rate_hz) as usize;

    let samples = read_samples("3.0,-6.0,9.8\n3.0,2.0,9.8\n".as_bytes()).unwrap();
    for sample in samples {
        pipeline.step(sample).unwrap();
        recorder
            .capture(&mut engine.lock().unwrap(), frames_per_sample)
            .unwrap();
    }
    recorder.capture(&mut engine.lock().unwrap(), 22050).unwrap();
    recorder.finalize().unwrap();

    let reader = hound::WavReader::open(out.path()).unwrap();
    let samples: Vec<f32> = reader.into_samples().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 2 * frames_per_sample + 22050);
    assert!(samples.iter().any(|s| s.abs() > 0.001));
    assert!(samples.iter().all(|s| s.abs() <= 1.0));
}

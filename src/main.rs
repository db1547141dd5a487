//! Sway - Motion-driven synthesis from accelerometer streams

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sway::config::{self, SourceKind, SwayConfig};
use sway::engine::{
    default_device_name, list_midi_ports, list_output_devices, Engine, MidiRenderer, MidiScaling,
    Pipeline, Player, Recorder, SoundRenderer,
};
use sway::mapping::{Frame, MotionMapper};
use sway::motion::{build_source, read_samples, MotionSample};
use sway::session::{Session, StartFailure};
use sway::viz::{self, VizState};

mod cli;

use cli::{Cli, Commands};

/// Samples of output history kept for the scope
const VIZ_BUFFER: usize = 1 << 16;

/// How long live playback keeps running after a recording ends, so the last
/// notes can ring out
const RING_OUT: Duration = Duration::from_millis(1500);

fn main() -> Result<()> {
    let cli = Cli::parse();

    let tui = matches!(cli.command, Commands::Play { viz: true, .. });
    init_tracing(cli.verbose, tui);

    match cli.command {
        Commands::Play {
            config: config_path,
            source,
            input,
            variant,
            midi,
            port,
            viz,
        } => {
            let mut cfg = config::load_or_default(&config_path)?;
            if let Some(source) = source {
                cfg.source.kind = source.into();
            }
            if let Some(input) = input {
                cfg.source.kind = SourceKind::File;
                cfg.source.path = Some(input);
            }
            if let Some(variant) = variant {
                cfg.sound.variant = variant.into();
            }
            if port.is_some() {
                cfg.midi.port = port;
            }
            cfg.validate()?;

            play(cfg, midi, viz)?;
        }

        Commands::Record {
            config: config_path,
            input,
            output,
            tail,
        } => {
            let cfg = config::load_or_default(&config_path)?;
            record(&cfg, &input, &output, tail)?;
        }

        Commands::Map {
            config: config_path,
            input,
        } => {
            let cfg = config::load_or_default(&config_path)?;
            let samples = load_recording(&input)?;

            let mut session = new_session(&cfg);
            session.start();

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for sample in samples {
                let frame = session.on_motion_sample(sample);
                writeln!(out, "{}", serde_json::to_string(&frame)?)?;
            }
        }

        Commands::Devices => {
            println!("Available audio devices:\n");

            if let Some(name) = default_device_name() {
                println!("Default output: {}\n", name);
            }

            println!("Output devices:");
            let devices = list_output_devices();
            if devices.is_empty() {
                println!("  (none)");
            }
            for (name, config) in devices {
                println!(
                    "  - {} ({} Hz, {} ch)",
                    name, config.sample_rate.0, config.channels
                );
            }

            println!("\nMIDI output ports:");
            match list_midi_ports() {
                Ok(ports) if ports.is_empty() => println!("  (none)"),
                Ok(ports) => {
                    for port in ports {
                        println!("  - {}", port);
                    }
                }
                Err(e) => println!("  Error listing ports: {}", e),
            }
        }

        Commands::Check {
            config: config_path,
        } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Buffer size: {}", cfg.audio.buffer_size);
                    println!("  Master volume: {:.0}%", cfg.master.volume * 100.0);
                    println!("  Note length: {}s", cfg.master.note_length_secs);
                    println!("  Variant: {:?}", cfg.sound.variant);
                    println!("  Max voices: {}", cfg.sound.max_voices);
                    println!("  Activity threshold: {}", cfg.mapping.threshold);
                    println!(
                        "  Filter: {}-{} Hz{}",
                        cfg.mapping.filter_min_hz,
                        cfg.mapping.filter_max_hz,
                        if cfg.mapping.clamp { "" } else { " (unclamped)" }
                    );
                    println!("  Display scale: {}", cfg.display_scale());
                    match &cfg.source.path {
                        Some(path) => println!("  Source: {:?} {:?}", cfg.source.kind, path),
                        None => println!("  Source: {:?}", cfg.source.kind),
                    }
                    println!("  Source rate: {} Hz", cfg.source.rate_hz);
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../sway.example.yaml");

            let path = "sway.yaml";
            if Path::new(path).exists() {
                println!("sway.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created sway.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, tui: bool) {
    let default = if verbose {
        "sway=debug"
    } else if tui {
        "sway=warn"
    } else {
        "sway=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn new_session(cfg: &SwayConfig) -> Session {
    Session::new(MotionMapper::new(
        &cfg.mapping,
        cfg.sound.variant,
        cfg.display_scale(),
    ))
}

fn load_recording(path: &Path) -> Result<Vec<MotionSample>> {
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    read_samples(BufReader::new(file)).with_context(|| format!("failed to read {:?}", path))
}

fn play(cfg: SwayConfig, midi: bool, show_viz: bool) -> Result<()> {
    let session = Arc::new(Mutex::new(new_session(&cfg)));
    let viz_state = Arc::new(Mutex::new(VizState::new(VIZ_BUFFER)));
    let (running, tap) = {
        let state = viz_state.lock().unwrap_or_else(PoisonError::into_inner);
        (state.running.clone(), state.sample_buffer.clone())
    };

    let running_for_ctrlc = running.clone();
    ctrlc::set_handler(move || {
        running_for_ctrlc.store(false, Ordering::SeqCst);
    })
    .context("failed to set Ctrl-C handler")?;

    let mut player = Player::new();
    let renderer: Box<dyn SoundRenderer> = if midi {
        let scaling = MidiScaling::from_config(&cfg);
        match MidiRenderer::new(cfg.midi.port.as_deref(), scaling, cfg.master.note_length_secs) {
            Ok(renderer) => Box::new(renderer),
            Err(e) => return Err(start_failed(&session, e)),
        }
    } else {
        let engine = Arc::new(Mutex::new(Engine::new(&cfg)));
        let tap = show_viz.then_some(tap);
        if let Err(e) = player.start(engine.clone(), cfg.audio.device.as_deref(), tap) {
            return Err(start_failed(&session, e));
        }
        Box::new(engine)
    };

    let mut pipeline = Pipeline::new(session.clone(), renderer);
    if show_viz {
        pipeline = pipeline.with_viz(viz_state.clone());
    }

    let rt = tokio::runtime::Runtime::new()?;
    let mut source = build_source(&cfg.source);
    let rx = source.subscribe();

    let started = rt.block_on(async { source.start() });
    if let Err(e) = started {
        player.stop();
        return Err(start_failed(&session, e));
    }

    println!(
        "Sway: {:?} sound from {} source{}",
        cfg.sound.variant,
        source.name(),
        if show_viz { "" } else { " (Ctrl-C to stop)" }
    );

    let ui = if show_viz {
        let session = session.clone();
        let state = viz_state.clone();
        Some(std::thread::spawn(move || viz::run_viz(session, state)))
    } else {
        session.lock().unwrap_or_else(PoisonError::into_inner).start();
        None
    };

    let stats = rt.block_on(pipeline.run(rx, running.clone()));
    source.stop();

    if running.load(Ordering::SeqCst) && !midi {
        // The recording ended rather than the user quitting
        std::thread::sleep(RING_OUT);
    }
    running.store(false, Ordering::SeqCst);

    if let Some(ui) = ui {
        match ui.join() {
            Ok(result) => result?,
            Err(_) => warn!("display thread panicked"),
        }
    }
    player.stop();

    let stats = stats?;
    println!("Played {} notes from {} samples", stats.notes, stats.samples);
    Ok(())
}

fn start_failed(session: &Mutex<Session>, err: anyhow::Error) -> anyhow::Error {
    let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
    session.fail_initialization(StartFailure::from_error(&err));
    eprintln!("{}", session.status());
    err
}

fn record(cfg: &SwayConfig, input: &Path, output: &Path, tail_secs: f64) -> Result<()> {
    let samples = load_recording(input)?;
    let sample_rate = cfg.audio.sample_rate;
    let frames_per_sample = (sample_rate as f64 / cfg.source.rate_hz).round().max(1.0) as usize;
    let tail_frames = (tail_secs.max(0.0) * sample_rate as f64) as usize;

    println!(
        "Rendering {} samples ({:.1}s) to {:?}...",
        samples.len(),
        samples.len() as f64 / cfg.source.rate_hz,
        output
    );

    let engine = Arc::new(Mutex::new(Engine::new(cfg)));
    let session = Arc::new(Mutex::new(new_session(cfg)));
    session.lock().unwrap_or_else(PoisonError::into_inner).start();
    let mut pipeline = Pipeline::new(session, Box::new(engine.clone()));

    let mut recorder = Recorder::new(output, sample_rate)?;
    let report_every = (cfg.source.rate_hz.round() as usize).max(1);

    for (i, sample) in samples.into_iter().enumerate() {
        let frame = pipeline.step(sample)?;
        if let Frame::Render(command) = &frame {
            tracing::debug!(index = i, note = %command.params.note, "note");
        }

        let mut eng = engine.lock().unwrap_or_else(PoisonError::into_inner);
        recorder.capture(&mut eng, frames_per_sample)?;

        if i % report_every == 0 {
            print!("\r  Progress: {:.0}s", recorder.duration_secs());
            std::io::stdout().flush()?;
        }
    }

    {
        let mut eng = engine.lock().unwrap_or_else(PoisonError::into_inner);
        eng.silence();
        recorder.capture(&mut eng, tail_frames)?;
    }

    let duration = recorder.duration_secs();
    let notes = pipeline.stats().notes;
    recorder.finalize()?;
    println!("\nRecorded {:.1}s with {} notes to {:?}", duration, notes, output);
    info!(notes, duration, "recording finished");
    Ok(())
}

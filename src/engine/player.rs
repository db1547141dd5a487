//! Real-time audio playback using cpal

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use super::Engine;
use crate::viz::SampleBuffer;

/// Real-time audio player
pub struct Player {
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start pulling samples from the engine
    ///
    /// `device` selects an output by (partial) name; the host default is used
    /// otherwise. When `tap` is given every output sample is copied into it.
    pub fn start(
        &mut self,
        engine: Arc<Mutex<Engine>>,
        device: Option<&str>,
        tap: Option<Arc<Mutex<SampleBuffer>>>,
    ) -> Result<()> {
        let device = find_output_device(device)?;
        let config = device.default_output_config()?;
        let sample_format = config.sample_format();
        let stream_config: StreamConfig = config.into();

        if let Ok(mut eng) = engine.lock() {
            let rate = stream_config.sample_rate.0 as f64;
            if rate != eng.sample_rate() {
                warn!(
                    device_rate = rate,
                    engine_rate = eng.sample_rate(),
                    "device sample rate differs from configuration"
                );
            }
            eng.silence();
        }

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, engine, running, tap)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, engine, running, tap)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, engine, running, tap)?,
            other => return Err(anyhow!("Unsupported sample format: {:?}", other)),
        };

        stream.play()?;
        info!(device = %device.name().unwrap_or_default(), "audio output started");
        self.stream = Some(stream);

        Ok(())
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.stream = None;
    }

    pub fn is_playing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

fn find_output_device(name: Option<&str>) -> Result<Device> {
    let host = cpal::default_host();
    match name {
        Some(name) => host
            .output_devices()?
            .find(|d| d.name().map(|n| n.contains(name)).unwrap_or(false))
            .ok_or_else(|| anyhow!("Output device '{}' not found", name)),
        None => host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available")),
    }
}

fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
    device: &Device,
    config: &StreamConfig,
    engine: Arc<Mutex<Engine>>,
    running: Arc<AtomicBool>,
    tap: Option<Arc<Mutex<SampleBuffer>>>,
) -> Result<Stream> {
    let channels = config.channels as usize;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if !running.load(Ordering::SeqCst) {
                data.fill(T::from_sample(0.0f32));
                return;
            }

            // Never block the audio thread on the renderer
            let Ok(mut eng) = engine.try_lock() else {
                data.fill(T::from_sample(0.0f32));
                return;
            };

            let mut tap = tap.as_ref().and_then(|t| t.try_lock().ok());
            for frame in data.chunks_mut(channels) {
                let sample = eng.process() as f32;
                if let Some(buf) = tap.as_mut() {
                    buf.push(sample);
                }
                for channel_sample in frame.iter_mut() {
                    *channel_sample = T::from_sample(sample);
                }
            }
        },
        |err| {
            error!(%err, "audio stream error");
        },
        None,
    )?;

    Ok(stream)
}

/// Get the default output device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}

/// List all available output devices
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}

//! Audio engine for Sway
//!
//! Owns the synth and its effect chain:
//! `poly → low-pass → [delay] → reverb → limiter → master volume`.
//! The delay stage only exists for the FM variant.

mod midi;
mod pipeline;
mod player;
mod recorder;
mod renderer;

pub use midi::{list_midi_ports, midi_messages, MidiMessage, MidiRenderer, MidiScaling};
pub use pipeline::{Pipeline, PipelineStats};
pub use player::{default_device_name, list_output_devices, Player};
pub use recorder::Recorder;
pub use renderer::SoundRenderer;

use tracing::trace;

use crate::config::{SoundVariant, SwayConfig};
use crate::mapping::{EffectParams, SynthParams};
use crate::synth::{db_to_gain, FeedbackDelay, Limiter, LowPassFilter, PolySynth, Reverb};

/// The main audio engine
pub struct Engine {
    variant: SoundVariant,
    sample_rate: f64,
    poly: PolySynth,
    filter: LowPassFilter,
    delay: Option<FeedbackDelay>,
    reverb: Reverb,
    limiter: Limiter,
    synth_gain: f64,
    master_volume: f64,
    note_length_secs: f64,
    notes_played: u64,
}

impl Engine {
    /// Build the graph for the configured sound variant
    pub fn new(config: &SwayConfig) -> Self {
        let sample_rate = config.audio.sample_rate as f64;
        let sound = &config.sound;
        let mapping = &config.mapping;

        let (poly, delay, reverb) = match sound.variant {
            SoundVariant::Simple => (
                PolySynth::simple(sample_rate, sound.max_voices),
                None,
                Reverb::new(sample_rate, sound.reverb_decay_secs),
            ),
            SoundVariant::Fm => {
                let mut reverb = Reverb::new(sample_rate, sound.reverb_decay_secs);
                reverb.set_wet(sound.fm_reverb_wet);
                (
                    PolySynth::fm(
                        sample_rate,
                        sound.max_voices,
                        sound.harmonicity,
                        sound.modulation_index,
                    ),
                    Some(FeedbackDelay::new(
                        sample_rate,
                        0.25,
                        sound.delay_feedback,
                        sound.delay_wet,
                    )),
                    reverb,
                )
            }
        };

        Self {
            variant: sound.variant,
            sample_rate,
            poly,
            filter: LowPassFilter::new(sample_rate, mapping.filter_max_hz),
            delay,
            reverb,
            limiter: Limiter::new(sample_rate, config.master.limiter_ceiling_db),
            synth_gain: db_to_gain(config.master.synth_volume_db),
            master_volume: config.master.volume as f64,
            note_length_secs: config.master.note_length_secs,
            notes_played: 0,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn variant(&self) -> SoundVariant {
        self.variant
    }

    /// Notes triggered since the engine was built
    pub fn notes_played(&self) -> u64 {
        self.notes_played
    }

    pub fn active_voices(&self) -> usize {
        self.poly.active_voices()
    }

    pub fn filter_cutoff(&self) -> f64 {
        self.filter.cutoff()
    }

    pub fn reverb_wet(&self) -> f64 {
        self.reverb.wet()
    }

    pub fn reverb_decay(&self) -> f64 {
        self.reverb.decay()
    }

    /// Current delay time, `None` for the simple variant
    pub fn delay_time(&self) -> Option<f64> {
        self.delay.as_ref().map(FeedbackDelay::time_secs)
    }

    /// Apply a frame's effect settings and trigger its note
    pub fn apply(&mut self, params: &SynthParams) {
        self.filter.set_cutoff(params.filter_hz);

        match params.effects {
            EffectParams::Reverb { amount } => {
                self.reverb.set_wet(amount);
            }
            EffectParams::Spatial {
                reverb_decay_secs,
                delay_time_secs,
                ..
            } => {
                self.reverb.set_decay(reverb_decay_secs);
                if let Some(delay) = self.delay.as_mut() {
                    delay.set_time(delay_time_secs);
                }
            }
        }

        trace!(note = %params.note, filter_hz = params.filter_hz, "trigger");
        self.poly.trigger_attack_release(
            params.note.frequency_hz(),
            params.velocity(),
            self.note_length_secs,
        );
        self.notes_played += 1;
    }

    /// Release all voices; effect tails keep ringing
    pub fn silence(&mut self) {
        self.poly.release_all();
    }

    /// Generate the next sample
    pub fn process(&mut self) -> f64 {
        let mut output = self.poly.process() * self.synth_gain;
        output = self.filter.process(output);
        if let Some(delay) = self.delay.as_mut() {
            output = delay.process(output);
        }
        output = self.reverb.process(output);
        self.limiter.process(output) * self.master_volume
    }

    /// Fill a buffer with samples
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }
}

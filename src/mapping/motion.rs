//! Motion mapper
//!
//! Turns one [`MotionSample`] into synthesis parameters, the activity gate
//! decision and indicator placement. Every call looks at the current sample
//! only; nothing is carried between calls.
//!
//! Axis assignment:
//! - `y` picks the note from the pentatonic table
//! - `|x|` sets the low-pass cutoff
//! - `|z|` sets the reverb (amount for the simple variant, decay for FM)
//! - `|x| + |y| + |z|` gates the trigger and, for FM, drives velocity and
//!   delay time

use serde::Serialize;

use super::gate::ActivityGate;
use super::pitch::{NoteMapper, Pitch};
use super::{LinearMapper, MagnitudeMapper, MappingPipeline};
use crate::config::{MappingConfig, SoundVariant};
use crate::motion::MotionSample;

/// Total motion at which FM velocity and delay time reach their far end
const INTENSITY_CEILING: f64 = 30.0;
const FM_VELOCITY_RANGE: (f64, f64) = (0.3, 1.0);
pub(crate) const FM_DECAY_RANGE_SECS: (f64, f64) = (1.0, 6.0);
const FM_DELAY_RANGE_SECS: (f64, f64) = (0.5, 0.1);

/// Indicator colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorColor {
    Active,
    Idle,
}

impl IndicatorColor {
    pub fn hex(&self) -> &'static str {
        match self {
            IndicatorColor::Active => "#ff4444",
            IndicatorColor::Idle => "#4CAF50",
        }
    }
}

/// Indicator offset in pixels from the top-left of the motion pad
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayOffset {
    pub dx: f64,
    pub dy: f64,
}

/// Everything the display needs for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayFrame {
    pub sample: MotionSample,
    pub offset: DisplayOffset,
    pub indicator: IndicatorColor,
}

/// Effect settings, per sound variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectParams {
    /// Reverb wet amount in `[0, reverb_max]`
    Reverb { amount: f64 },
    /// Reverb decay, delay time and note velocity driven by motion
    Spatial {
        reverb_decay_secs: f64,
        delay_time_secs: f64,
        velocity: f64,
    },
}

/// Parameters for one note trigger
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SynthParams {
    pub note: Pitch,
    pub filter_hz: f64,
    pub effects: EffectParams,
}

impl SynthParams {
    /// Trigger velocity in `[0, 1]`
    pub fn velocity(&self) -> f64 {
        match self.effects {
            EffectParams::Reverb { .. } => 1.0,
            EffectParams::Spatial { velocity, .. } => velocity,
        }
    }
}

/// A note to play plus what to show
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderCommand {
    pub params: SynthParams,
    pub display: DisplayFrame,
}

/// Outcome of one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum Frame {
    /// Gate open while playing: trigger a note
    Render(RenderCommand),
    /// No trigger. Carries the display update when playing; `None` when
    /// paused, in which case nothing is updated.
    Idle { display: Option<DisplayFrame> },
}

impl Frame {
    pub fn is_render(&self) -> bool {
        matches!(self, Frame::Render(_))
    }

    pub fn display(&self) -> Option<&DisplayFrame> {
        match self {
            Frame::Render(command) => Some(&command.display),
            Frame::Idle { display } => display.as_ref(),
        }
    }
}

/// Stateless mapping from samples to frames
pub struct MotionMapper {
    variant: SoundVariant,
    axis_range: f64,
    display_scale: f64,
    gate: ActivityGate,
    note: NoteMapper,
    filter: MappingPipeline,
    reverb: MappingPipeline,
    decay: MappingPipeline,
    velocity: MappingPipeline,
    delay: MappingPipeline,
}

impl MotionMapper {
    /// Build a mapper from configuration
    pub fn new(config: &MappingConfig, variant: SoundVariant, display_scale: f64) -> Self {
        let range = config.axis_range;
        let clamp = config.clamp;
        let threshold = config.threshold;
        let intensity_ceiling = INTENSITY_CEILING.max(threshold + 1.0);

        Self {
            variant,
            axis_range: range,
            display_scale,
            gate: ActivityGate::new(threshold),
            note: NoteMapper::new(range),
            filter: MappingPipeline::new().with(MagnitudeMapper).with(
                LinearMapper::new("filter", 0.0, range, config.filter_min_hz, config.filter_max_hz)
                    .with_clamp(clamp),
            ),
            reverb: MappingPipeline::new().with(MagnitudeMapper).with(
                LinearMapper::new("reverb", 0.0, range, 0.0, config.reverb_max).with_clamp(clamp),
            ),
            decay: MappingPipeline::new().with(MagnitudeMapper).with(
                LinearMapper::new("decay", 0.0, range, FM_DECAY_RANGE_SECS.0, FM_DECAY_RANGE_SECS.1)
                    .with_clamp(clamp),
            ),
            // Velocity and delay time are always clamped: they feed hard
            // limits on the synth and the delay line
            velocity: MappingPipeline::new().with(LinearMapper::new(
                "velocity",
                threshold,
                intensity_ceiling,
                FM_VELOCITY_RANGE.0,
                FM_VELOCITY_RANGE.1,
            )),
            delay: MappingPipeline::new().with(LinearMapper::new(
                "delay",
                threshold,
                intensity_ceiling,
                FM_DELAY_RANGE_SECS.0,
                FM_DELAY_RANGE_SECS.1,
            )),
        }
    }

    pub fn variant(&self) -> SoundVariant {
        self.variant
    }

    pub fn threshold(&self) -> f64 {
        self.gate.threshold()
    }

    /// Pitch for the note axis
    pub fn map_to_note(&self, axis: f64) -> Pitch {
        self.note.pitch(axis)
    }

    /// Low-pass cutoff in Hz for the brightness axis
    pub fn map_to_filter_frequency(&self, axis: f64) -> f64 {
        self.filter.apply(axis)
    }

    /// Reverb wet amount for the space axis
    pub fn map_to_reverb_amount(&self, axis: f64) -> f64 {
        self.reverb.apply(axis)
    }

    /// Reverb decay in seconds for the space axis (FM variant)
    pub fn map_to_reverb_decay(&self, axis: f64) -> f64 {
        self.decay.apply(axis)
    }

    /// Note velocity for a total-motion intensity (FM variant)
    pub fn map_to_velocity(&self, intensity: f64) -> f64 {
        self.velocity.apply(intensity)
    }

    /// Delay time in seconds for a total-motion intensity (FM variant)
    pub fn map_to_delay_time(&self, intensity: f64) -> f64 {
        self.delay.apply(intensity)
    }

    /// Whether this sample should trigger a note
    pub fn compute_activity(&self, sample: &MotionSample) -> bool {
        self.gate.is_open(sample)
    }

    /// Indicator offset: each axis shifted by the axis range, then scaled
    pub fn scale_for_display(&self, sample: &MotionSample) -> DisplayOffset {
        DisplayOffset {
            dx: (sample.x + self.axis_range) * self.display_scale,
            dy: (sample.y + self.axis_range) * self.display_scale,
        }
    }

    /// Width and height of the space offsets are placed in
    pub fn display_extent(&self) -> f64 {
        2.0 * self.axis_range * self.display_scale
    }

    /// Synthesis parameters for a sample, regardless of the gate
    pub fn synth_params(&self, sample: &MotionSample) -> SynthParams {
        let effects = match self.variant {
            SoundVariant::Simple => EffectParams::Reverb {
                amount: self.map_to_reverb_amount(sample.z),
            },
            SoundVariant::Fm => {
                let intensity = sample.total_motion();
                EffectParams::Spatial {
                    reverb_decay_secs: self.map_to_reverb_decay(sample.z),
                    delay_time_secs: self.map_to_delay_time(intensity),
                    velocity: self.map_to_velocity(intensity),
                }
            }
        };

        SynthParams {
            note: self.map_to_note(sample.y),
            filter_hz: self.map_to_filter_frequency(sample.x),
            effects,
        }
    }

    /// Map one sample given the current play state
    pub fn on_motion_sample(&self, sample: MotionSample, is_playing: bool) -> Frame {
        if !is_playing {
            return Frame::Idle { display: None };
        }

        let active = self.compute_activity(&sample);
        let display = DisplayFrame {
            sample,
            offset: self.scale_for_display(&sample),
            indicator: if active {
                IndicatorColor::Active
            } else {
                IndicatorColor::Idle
            },
        };

        if active {
            Frame::Render(RenderCommand {
                params: self.synth_params(&sample),
                display,
            })
        } else {
            Frame::Idle {
                display: Some(display),
            }
        }
    }
}

impl Default for MotionMapper {
    fn default() -> Self {
        let variant = SoundVariant::default();
        Self::new(&MappingConfig::default(), variant, variant.default_display_scale())
    }
}

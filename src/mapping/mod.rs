//! Mapping from motion to sound
//!
//! Small composable mappers (linear, magnitude, note selection, activity
//! gate) assembled by [`MotionMapper`] into the per-sample transform.

mod gate;
mod linear;
mod mapper;
mod motion;
mod pitch;
pub mod rescale;

pub use gate::{ActivityGate, DEFAULT_THRESHOLD};
pub use linear::{LinearMapper, MagnitudeMapper};
pub use mapper::{Mapper, MappingPipeline};
pub(crate) use motion::FM_DECAY_RANGE_SECS;
pub use motion::{
    DisplayFrame, DisplayOffset, EffectParams, Frame, IndicatorColor, MotionMapper, RenderCommand,
    SynthParams,
};
pub use pitch::{NoteMapper, Pitch, PENTATONIC};
pub use rescale::{clamp, linear_rescale};

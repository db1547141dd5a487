//! Synthesis building blocks
//!
//! Oscillators, envelopes and voices feed a [`PolySynth`]; the filter, delay,
//! reverb and limiter make up the effect chain behind it.

mod delay;
mod envelope;
mod filter;
mod fm;
mod limiter;
mod oscillator;
mod poly;
mod reverb;
mod simple;
mod voice;

pub use delay::{FeedbackDelay, MAX_DELAY_SECS};
pub use envelope::{Adsr, Envelope, EnvelopeStage};
pub use filter::LowPassFilter;
pub use fm::FmVoice;
pub use limiter::{db_to_gain, Limiter};
pub use oscillator::{Oscillator, Waveform};
pub use poly::PolySynth;
pub use reverb::Reverb;
pub use simple::SimpleVoice;
pub use voice::Voice;

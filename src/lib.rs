//! Sway - Motion-driven synthesis from accelerometer streams
//!
//! Tilt picks a note from a pentatonic scale, sideways motion opens the
//! filter, forward motion adds space, and a still device stays silent.

pub mod config;
pub mod engine;
pub mod mapping;
pub mod motion;
pub mod session;
pub mod synth;
pub mod viz;

pub use config::SwayConfig;
pub use engine::Engine;
pub use mapping::MotionMapper;
pub use session::Session;

//! Motion input
//!
//! Sources deliver three-axis acceleration samples (gravity included) as
//! [`MotionEvent`]s over a broadcast channel. Consumers don't care whether the
//! readings come from a recording, standard input or the simulator.

mod replay;
mod sample;
mod simulated;
mod source;

pub use replay::{ReplayInput, ReplaySource};
pub use sample::{parse_line, read_samples, MotionError, MotionSample};
pub use simulated::{simulated_sample, SimulatedSource};
pub use source::{MotionEvent, MotionSource};

use crate::config::{SourceConfig, SourceKind};

/// Build the source a configuration asks for
pub fn build_source(config: &SourceConfig) -> Box<dyn MotionSource> {
    match config.kind {
        SourceKind::Simulated => Box::new(SimulatedSource::new("simulated", config.rate_hz)),
        SourceKind::Stdin => Box::new(ReplaySource::new("stdin", ReplayInput::Stdin, config.rate_hz)),
        SourceKind::File => {
            let path = config.path.clone().unwrap_or_default();
            Box::new(ReplaySource::new("file", ReplayInput::File(path), config.rate_hz))
        }
    }
}

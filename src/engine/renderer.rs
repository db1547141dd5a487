//! The seam between mapping and sound output

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;

use super::Engine;
use crate::mapping::SynthParams;

/// Something that can turn synthesis parameters into sound
pub trait SoundRenderer: Send {
    /// Renderer name for logs
    fn name(&self) -> &str;

    /// Apply the effect settings and trigger one note
    fn render(&mut self, params: &SynthParams) -> Result<()>;

    /// Release everything that is sounding
    fn silence(&mut self) -> Result<()>;
}

/// The audio engine shared with the output stream
impl SoundRenderer for Arc<Mutex<Engine>> {
    fn name(&self) -> &str {
        "audio"
    }

    fn render(&mut self, params: &SynthParams) -> Result<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).apply(params);
        Ok(())
    }

    fn silence(&mut self) -> Result<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).silence();
        Ok(())
    }
}

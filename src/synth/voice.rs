//! Voice trait for note generators

/// A monophonic note generator managed by [`super::PolySynth`]
pub trait Voice: Send + Sync {
    /// Start a note at `frequency` Hz with `velocity` in `[0, 1]`
    fn note_on(&mut self, frequency: f64, velocity: f64);

    /// Begin the release of the current note
    fn note_off(&mut self);

    /// True while the note (including its release tail) is sounding
    fn is_active(&self) -> bool;

    /// Generate the next sample
    fn process(&mut self) -> f64;
}

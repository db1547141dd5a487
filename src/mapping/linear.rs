//! Linear mapper implementation

use super::rescale::{clamp, linear_rescale};
use super::Mapper;

/// Linear interpolation mapper
pub struct LinearMapper {
    name: String,
    in_min: f64,
    in_max: f64,
    out_min: f64,
    out_max: f64,
    clamp: bool,
}

impl LinearMapper {
    /// Create a new linear mapper
    pub fn new(
        name: impl Into<String>,
        in_min: f64,
        in_max: f64,
        out_min: f64,
        out_max: f64,
    ) -> Self {
        Self {
            name: name.into(),
            in_min,
            in_max,
            out_min,
            out_max,
            clamp: true,
        }
    }

    /// Set whether to clamp output to range
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }
}

impl Mapper for LinearMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        let output = linear_rescale(input, self.in_min, self.in_max, self.out_min, self.out_max);

        if self.clamp {
            clamp(output, self.out_min.min(self.out_max), self.out_min.max(self.out_max))
        } else {
            output
        }
    }
}

/// Absolute value of the input; the magnitude of an axis regardless of tilt direction
pub struct MagnitudeMapper;

impl Mapper for MagnitudeMapper {
    fn name(&self) -> &str {
        "magnitude"
    }

    fn map(&self, input: f64) -> f64 {
        input.abs()
    }
}

//! Mapper trait and pipeline

/// A scalar transform from one axis reading to one synthesis parameter
pub trait Mapper: Send + Sync {
    /// Get the name of this mapper
    fn name(&self) -> &str;

    /// Map an input value to an output value
    fn map(&self, input: f64) -> f64;
}

/// A pipeline of mappers applied in sequence
pub struct MappingPipeline {
    mappers: Vec<Box<dyn Mapper>>,
}

impl MappingPipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self { mappers: Vec::new() }
    }

    /// Add a mapper to the pipeline (builder pattern)
    pub fn with<M: Mapper + 'static>(mut self, mapper: M) -> Self {
        self.mappers.push(Box::new(mapper));
        self
    }

    /// Apply all mappers in sequence
    pub fn apply(&self, value: f64) -> f64 {
        self.mappers.iter().fold(value, |acc, mapper| mapper.map(acc))
    }

    /// Check if the pipeline is empty
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl Default for MappingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

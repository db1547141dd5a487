//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<SwayConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {:?}", path))?;
    let config: SwayConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config {:?}", path))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration, falling back to defaults when the file is absent
pub fn load_or_default(path: &Path) -> Result<SwayConfig> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(?path, "no config file, using defaults");
        Ok(SwayConfig::default())
    }
}

//! YAML configuration loading for the server.
//!
//! Loads [`ServerConfig`] from a YAML file on disk, falling back to defaults
//! when no file is specified.

use cardioscope_core::{CardioError, Result, ServerConfig};
use std::path::Path;

/// Load a [`ServerConfig`] from a YAML file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the YAML is invalid.
pub fn load_config(path: &Path) -> Result<ServerConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CardioError::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    let config: ServerConfig = serde_yaml::from_str(&contents)
        .map_err(|e| CardioError::Config(format!("Failed to parse config YAML: {}", e)))?;
    Ok(config)
}

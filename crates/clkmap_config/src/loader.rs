//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{CellSection, ClkmapConfig};
use std::path::Path;

/// Loads and validates a configuration file.
pub fn load_config(path: &Path) -> Result<ClkmapConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates configuration text.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ClkmapConfig, ConfigError> {
    let config: ClkmapConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_cell(section: &CellSection, key: &str) -> Result<(), ConfigError> {
    if section.cell.is_empty() {
        return Err(ConfigError::MissingField(format!("{key}.cell")));
    }
    let spec = section.spec();
    if spec.out_port.is_empty() || spec.in_port.is_empty() {
        return Err(ConfigError::MissingField(format!("{key}.ports")));
    }
    Ok(())
}

/// Checks that every named cell and port is non-empty and every width is
/// positive.
pub fn validate_config(config: &ClkmapConfig) -> Result<(), ConfigError> {
    if let Some(buffer) = &config.buffer {
        validate_cell(buffer, "buffer")?;
    }
    if let Some(pad) = &config.pad {
        validate_cell(pad, "pad")?;
    }
    for cell in &config.secondary.cells {
        if cell.cell.is_empty() || cell.port.is_empty() {
            return Err(ConfigError::MissingField("secondary.cells".to_string()));
        }
    }
    let library = &config.library;
    for tag in library.sinks.iter().chain(&library.drivers) {
        if tag.cell.is_empty() || tag.port.is_empty() {
            return Err(ConfigError::MissingField("library port cell/port".to_string()));
        }
        if tag.width == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{}.{} has width 0",
                tag.cell, tag.port
            )));
        }
    }
    for inv in &library.inverters {
        if inv.cell.is_empty() || inv.output.is_empty() || inv.input.is_empty() {
            return Err(ConfigError::MissingField(
                "library.inverters cell/output/input".to_string(),
            ));
        }
        if inv.width == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{}.{} has width 0",
                inv.cell, inv.output
            )));
        }
        if inv.output == inv.input {
            return Err(ConfigError::ValidationError(format!(
                "inverter {} pairs port {} with itself",
                inv.cell, inv.output
            )));
        }
    }
    if config.top.as_deref() == Some("") {
        return Err(ConfigError::MissingField("top".to_string()));
    }
    Ok(())
}

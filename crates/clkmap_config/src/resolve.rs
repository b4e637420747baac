//! Overlaying command-line settings on a loaded configuration.

use crate::error::ConfigError;
use crate::loader::validate_config;
use crate::types::{CellSection, ClkmapConfig};

/// Settings given on the command line.
///
/// Present values replace the file's values entirely; selection patterns
/// replace the file's list when non-empty.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces `[buffer]`.
    pub buffer: Option<CellSection>,
    /// Replaces `[pad]`.
    pub pad: Option<CellSection>,
    /// Replaces `[selection] patterns` when non-empty.
    pub selection: Vec<String>,
    /// Replaces `top`.
    pub top: Option<String>,
}

impl ClkmapConfig {
    /// Applies overrides and revalidates the result.
    pub fn merge(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(buffer) = overrides.buffer {
            self.buffer = Some(buffer);
        }
        if let Some(pad) = overrides.pad {
            self.pad = Some(pad);
        }
        if !overrides.selection.is_empty() {
            self.selection.patterns = overrides.selection;
        }
        if let Some(top) = overrides.top {
            self.top = Some(top);
        }
        validate_config(&self)?;
        Ok(self)
    }
}

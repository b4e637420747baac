//! Parsing and validation of `clkmap.toml` configuration files.
//!
//! The file names the buffer and pad cell types to insert, an optional wire
//! selection, the secondary buffer types that must chain from an inserted
//! buffer, and tag seeds for library cells that have no blackbox definition
//! in the design. Command-line flags overlay the file through
//! [`ConfigOverrides`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, validate_config};
pub use resolve::ConfigOverrides;
pub use types::*;

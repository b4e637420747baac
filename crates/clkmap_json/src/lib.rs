//! Yosys-compatible JSON netlist interchange.
//!
//! [`import`] reads the `modules`/`ports`/`cells`/`netnames` document that
//! `write_json` produces into a [`Design`](clkmap_netlist::Design);
//! [`export`] writes a design back in the same shape, numbering nets by
//! their canonical bit so direct connections fold into shared numbers.

#![warn(missing_docs)]

pub mod error;
mod export;
mod format;
mod import;

pub use error::JsonError;
pub use export::export;
pub use import::import;

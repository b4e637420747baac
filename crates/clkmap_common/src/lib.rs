//! Shared foundational types used across the clkmap crates.
//!
//! This crate provides interned identifiers for module, wire, cell, and port
//! names, and the four-state constant values that can appear on netlist bits.

#![warn(missing_docs)]

pub mod ident;
pub mod logic;

pub use ident::{Ident, Interner};
pub use logic::Logic;

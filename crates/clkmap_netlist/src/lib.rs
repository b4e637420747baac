//! Bit-level hierarchical netlist representation.
//!
//! A [`Design`] holds [`Module`]s; each module owns [`Wire`]s, [`Cell`]s, and
//! direct point-to-point connections between wire bits. Cells are instances
//! either of another module in the design or of an opaque library type, and
//! bind named ports to [`SigSpec`]s. [`SigMap`] resolves connected bits to a
//! canonical representative, and [`Selection`] restricts which modules and
//! wires a pass may touch.

#![warn(missing_docs)]

pub mod arena;
pub mod attr;
pub mod cell;
pub mod design;
pub mod ids;
pub mod module;
pub mod selection;
pub mod sig;
pub mod sigmap;
pub mod wire;

pub use arena::{Arena, ArenaId};
pub use attr::{AttrValue, Attributes};
pub use cell::{Cell, Connection, PortDirection};
pub use design::Design;
pub use ids::{CellId, ModuleId, WireId};
pub use module::Module;
pub use selection::{Selection, SelectionError};
pub use sig::{SigBit, SigSpec};
pub use sigmap::SigMap;
pub use wire::Wire;

//! Typed view of the clock attributes on a module's wires.
//!
//! Attribute values that do not have the expected shape are treated as
//! absent: a string where a flag is expected, a non-string inverter link, or
//! an inverter link naming a port the module does not have.

use clkmap_common::{Ident, Interner};
use clkmap_netlist::{AttrValue, Module, Wire, WireId};
use std::collections::HashMap;

/// Marks a port that supplies a buffered clock.
pub const ATTR_CLKBUF_DRIVER: &str = "clkbuf_driver";
/// Marks a port that consumes a clock.
pub const ATTR_CLKBUF_SINK: &str = "clkbuf_sink";
/// Names the input port whose inverse this output port carries.
pub const ATTR_CLKBUF_INV: &str = "clkbuf_inv";
/// Excludes a wire from buffering unless an explicit selection is given.
pub const ATTR_CLKBUF_INHIBIT: &str = "clkbuf_inhibit";

/// Clock-related attributes of one wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WireClockInfo {
    /// The wire is a buffered clock output of its module.
    pub driver: bool,
    /// The wire is a clock input of its module.
    pub sink: bool,
    /// The wire is the inverted output of this input port.
    pub inverts: Option<Ident>,
    /// The wire must not be buffered.
    pub inhibit: bool,
}

impl WireClockInfo {
    /// Reads the attributes of `wire`, a wire of `module`.
    pub fn read(module: &Module, wire: &Wire, interner: &Interner) -> Self {
        let attrs = &wire.attributes;
        let inverts = attrs
            .get_named(interner, ATTR_CLKBUF_INV)
            .and_then(AttrValue::as_str)
            .and_then(|name| interner.get(name))
            .filter(|&name| module.wire_by_name(name).is_some());
        Self {
            driver: attrs.flag(interner, ATTR_CLKBUF_DRIVER),
            sink: attrs.flag(interner, ATTR_CLKBUF_SINK),
            inverts,
            inhibit: attrs.flag(interner, ATTR_CLKBUF_INHIBIT),
        }
    }
}

/// Reads every wire of a module once.
pub fn scan_module(module: &Module, interner: &Interner) -> HashMap<WireId, WireClockInfo> {
    module
        .wires
        .iter()
        .map(|(id, wire)| (id, WireClockInfo::read(module, wire, interner)))
        .collect()
}

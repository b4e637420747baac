//! Replacement wires for buffered input ports.
//!
//! A buffered input port cannot carry the post-buffer signal under its own
//! name, so a copy of the port is created and wired to the source side of the
//! inserted cells. Once every driver has been reconnected the copy takes over
//! the port's name and the original is demoted to an internal wire.

use crate::insert::Substitution;
use clkmap_common::Interner;
use clkmap_netlist::{Module, SigBit, SigMap, WireId};
use std::collections::BTreeMap;

/// Creates the replacement of input port `wire` and connects it bit by bit.
///
/// A bit with a substitution connects to the source-side wire of its inserted
/// cells; every other bit connects straight to the original port bit.
pub fn split_input_port(
    module: &mut Module,
    interner: &Interner,
    sigmap: &SigMap,
    wire: WireId,
    substitutions: &BTreeMap<SigBit, Substitution>,
) -> WireId {
    let name = module.fresh_name(interner);
    let replacement = module.add_wire_like(name, wire);
    for i in 0..module.wires[wire].width {
        let bit = SigBit::wire(wire, i);
        let source = substitutions
            .get(&sigmap.map(bit))
            .map_or(bit, Substitution::bit);
        module.connect(source.into(), SigBit::wire(replacement, i).into());
    }
    replacement
}

/// Hands port identity from each original wire to its replacement.
///
/// Must run after driver reconnection: the demoted wire keeps the bits the
/// frozen signal map was built from.
pub fn swap_identities(module: &mut Module, split_ports: &[(WireId, WireId)]) {
    for &(original, replacement) in split_ports {
        module.swap_names(replacement, original);
        let wire = &mut module.wires[original];
        wire.attributes.clear();
        wire.port_id = 0;
        wire.port_input = false;
        wire.port_output = false;
    }
}

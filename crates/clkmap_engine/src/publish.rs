//! Publishing a module's port roles for the modules that instantiate it.

use crate::insert::InsertOutcome;
use crate::tags::{PortBit, TagTables};
use clkmap_common::Interner;
use clkmap_netlist::{Module, Selection, SigMap};

/// Records the clock role of the module's ports in the run-wide tables and
/// recomputes its port list.
///
/// Output port bits that were bypassed, found buffered, or received a buffer
/// become buffered outputs of the module type; deferred input bits become
/// sinks. Only selected output ports are checked for inserted buffers, and
/// the inhibit attribute plays no part here.
pub fn publish(
    module: &mut Module,
    interner: &Interner,
    selection: &Selection,
    sigmap: &SigMap,
    bypassed_outputs: &[PortBit],
    outcome: &InsertOutcome,
    tags: &mut TagTables,
) {
    for &port in bypassed_outputs.iter().chain(&outcome.buffered_outputs) {
        tags.add_buffered(port);
    }
    for &port in &outcome.deferred {
        tags.add_sink(port);
    }
    for wire in module.wires.values() {
        if wire.port_input || !wire.port_output {
            continue;
        }
        if !selection.selects_wire(module, wire, interner) {
            continue;
        }
        for (i, bit) in wire.bits().enumerate() {
            if outcome.substitutions.contains_key(&sigmap.map(bit)) {
                tags.add_buffered(PortBit::new(module.name, wire.name, i as u32));
            }
        }
    }
    module.fixup_ports();
}

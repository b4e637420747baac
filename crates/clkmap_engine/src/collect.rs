//! Per-module clock tag collection.

use crate::metadata::scan_module;
use crate::tags::{PortBit, TagTables};
use clkmap_common::Interner;
use clkmap_netlist::{Module, SigBit, SigMap};
use std::collections::{BTreeSet, HashSet};

/// The bit sets of one module, rebuilt for every module.
#[derive(Debug, Default)]
pub struct ModuleTags {
    /// Canonical bits that feed a clock sink.
    pub sinks: BTreeSet<SigBit>,
    /// Canonical bits that already carry a buffered clock.
    pub buffered: BTreeSet<SigBit>,
    /// Raw bits on the output side of some cell port.
    pub driven: HashSet<SigBit>,
}

/// Scans the cell connections of an ordinary module.
///
/// Constant bits never enter the sink or buffered sets.
pub fn collect(module: &Module, sigmap: &SigMap, tags: &TagTables) -> ModuleTags {
    let mut local = ModuleTags::default();
    for cell in module.cells.values() {
        for conn in &cell.connections {
            for (i, bit) in conn.signal.iter().enumerate() {
                let slot = PortBit::new(cell.cell_type, conn.port, i as u32);
                let mapped = sigmap.map(bit);
                if !mapped.is_const() {
                    if tags.is_sink(&slot) {
                        local.sinks.insert(mapped);
                    }
                    if tags.is_buffered(&slot) {
                        local.buffered.insert(mapped);
                    }
                }
                if conn.direction.drives() {
                    local.driven.insert(bit);
                }
            }
        }
    }
    local
}

/// Publishes the port contract of a blackbox module.
///
/// Instances of the blackbox are then tagged exactly like instances of an
/// ordinary module that was already processed.
pub fn extract_blackbox(module: &Module, interner: &Interner, tags: &mut TagTables) {
    let info = scan_module(module, interner);
    for &id in &module.ports {
        let wire = &module.wires[id];
        let Some(clock) = info.get(&id) else {
            continue;
        };
        for bit in 0..wire.width {
            let slot = PortBit::new(module.name, wire.name, bit);
            if clock.driver {
                tags.add_buffered(slot);
            }
            if clock.sink {
                tags.add_sink(slot);
            }
            if let Some(input) = clock.inverts {
                tags.add_inverter(module.name, wire.name, input, bit);
            }
        }
    }
}

//! Moving drivers of buffered bits onto the source side of their buffer.

use crate::insert::Substitution;
use clkmap_common::Ident;
use clkmap_netlist::{CellId, Module, SigBit, SigMap};
use std::collections::{BTreeMap, BTreeSet};

/// Secondary buffer instances keyed by the canonical bit on their input.
#[derive(Debug, Default)]
pub struct SecondaryIndex(BTreeMap<SigBit, Vec<(CellId, Ident)>>);

impl SecondaryIndex {
    /// Indexes every instance of a `(cell type, input port)` pair whose
    /// single-bit input is one of the `eligible` canonical bits.
    pub fn build(
        module: &Module,
        sigmap: &SigMap,
        eligible: &BTreeSet<SigBit>,
        secondary: &[(Ident, Ident)],
    ) -> Self {
        let mut index: BTreeMap<SigBit, Vec<(CellId, Ident)>> = BTreeMap::new();
        for (id, cell) in module.cells.iter() {
            for &(cell_type, port) in secondary {
                if cell.cell_type != cell_type {
                    continue;
                }
                let Some(bit) = cell.port(port).and_then(|sig| sig.as_bit()) else {
                    continue;
                };
                let mapped = sigmap.map(bit);
                if eligible.contains(&mapped) {
                    index.entry(mapped).or_default().push((id, port));
                }
            }
        }
        Self(index)
    }

    /// Instances reading `bit`.
    pub fn get(&self, bit: &SigBit) -> &[(CellId, Ident)] {
        self.0.get(bit).map_or(&[], Vec::as_slice)
    }
}

/// Rewrites every cell output bit whose canonical bit has a substitution to
/// the substitution's source-side wire.
///
/// The inserted cell itself is left alone. Secondary buffers reading a
/// rewritten bit are moved to the same source-side wire. Edits are computed
/// against the unmodified module and applied afterwards. Returns the number
/// of rewritten driver bits.
pub fn reconnect_drivers(
    module: &mut Module,
    sigmap: &SigMap,
    substitutions: &BTreeMap<SigBit, Substitution>,
    secondary: &SecondaryIndex,
) -> usize {
    if substitutions.is_empty() {
        return 0;
    }
    let mut rewrites = Vec::new();
    let mut repoints = Vec::new();
    for (id, cell) in module.cells.iter() {
        for (c, conn) in cell.connections.iter().enumerate() {
            if !conn.direction.drives() {
                continue;
            }
            for (b, bit) in conn.signal.iter().enumerate() {
                let mapped = sigmap.map(bit);
                let Some(sub) = substitutions.get(&mapped) else {
                    continue;
                };
                if id == sub.cell {
                    continue;
                }
                repoints.extend(
                    secondary
                        .get(&mapped)
                        .iter()
                        .map(|&(cell, port)| (cell, port, sub.bit())),
                );
                rewrites.push((id, c, b, sub.bit()));
            }
        }
    }

    for &(id, c, b, target) in &rewrites {
        module.cells[id].connections[c].signal.set(b, target);
    }
    for (id, port, target) in repoints {
        if let Some(sig) = module.cells[id].port_mut(port) {
            for b in 0..sig.len() {
                sig.set(b, target);
            }
        }
    }
    rewrites.len()
}

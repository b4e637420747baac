//! Pushing clock tags through inverting cells.
//!
//! Every registered inverter instance contributes a pair of canonical bits
//! (input, output). Two rules are applied until nothing changes:
//!
//! 1. an output that feeds a sink and is not buffered becomes buffered, and
//!    its input becomes a sink (the buffer moves in front of the inverter);
//! 2. an output whose input is buffered becomes buffered.
//!
//! Applied greedily, rule 2 can pre-empt rule 1 and make the final sink set
//! depend on scan order. [`propagate`] instead computes one fixed point that
//! is a function of the pair *set*: rule 1 is evaluated against the bits
//! buffered without its help, then rule 2 closes the result.

use crate::tags::{PortBit, TagTables};
use clkmap_netlist::{Module, SigBit, SigMap};
use std::collections::{BTreeMap, BTreeSet};

/// The canonical input and output bit of one inverter instance.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct InverterPair {
    /// Canonical bit on the inverter input.
    pub input: SigBit,
    /// Canonical bit on the inverter output.
    pub output: SigBit,
}

/// Finds every inverter instance of a module.
///
/// A paired port the instance does not connect is skipped.
pub fn inverter_pairs(module: &Module, sigmap: &SigMap, tags: &TagTables) -> Vec<InverterPair> {
    let mut pairs = BTreeSet::new();
    for cell in module.cells.values() {
        let paired_bit = |port, bit: u32| {
            cell.port(port)
                .and_then(|sig| sig.get(bit as usize))
                .map(|b| sigmap.map(b))
        };
        for conn in &cell.connections {
            for (i, bit) in conn.signal.iter().enumerate() {
                let slot = PortBit::new(cell.cell_type, conn.port, i as u32);
                let mapped = sigmap.map(bit);
                if let Some((port, b)) = tags.inverter_input(&slot) {
                    if let Some(input) = paired_bit(port, b) {
                        pairs.insert(InverterPair {
                            input,
                            output: mapped,
                        });
                    }
                }
                if let Some((port, b)) = tags.inverter_output(&slot) {
                    if let Some(output) = paired_bit(port, b) {
                        pairs.insert(InverterPair {
                            input: mapped,
                            output,
                        });
                    }
                }
            }
        }
    }
    pairs.into_iter().collect()
}

/// Closes `seed` under rule 2.
fn forward_closure(
    seed: &BTreeSet<SigBit>,
    by_input: &BTreeMap<SigBit, Vec<SigBit>>,
) -> BTreeSet<SigBit> {
    let mut closed = seed.clone();
    let mut work: Vec<SigBit> = seed.iter().copied().collect();
    while let Some(bit) = work.pop() {
        for &out in by_input.get(&bit).into_iter().flatten() {
            if closed.insert(out) {
                work.push(out);
            }
        }
    }
    closed
}

/// Applies both rules to a module's sink and buffered sets.
///
/// Both sets only grow. The result does not depend on the order of `pairs`.
pub fn propagate(
    pairs: &[InverterPair],
    sinks: &mut BTreeSet<SigBit>,
    buffered: &mut BTreeSet<SigBit>,
) {
    if pairs.is_empty() {
        return;
    }
    let mut by_input: BTreeMap<SigBit, Vec<SigBit>> = BTreeMap::new();
    let mut by_output: BTreeMap<SigBit, Vec<SigBit>> = BTreeMap::new();
    for pair in pairs {
        by_input.entry(pair.input).or_default().push(pair.output);
        by_output.entry(pair.output).or_default().push(pair.input);
    }

    let base = forward_closure(buffered, &by_input);

    let mut pushed = BTreeSet::new();
    let mut work: Vec<SigBit> = sinks.iter().copied().collect();
    while let Some(bit) = work.pop() {
        let Some(inputs) = by_output.get(&bit) else {
            continue;
        };
        if base.contains(&bit) {
            continue;
        }
        pushed.insert(bit);
        for &input in inputs {
            if sinks.insert(input) {
                work.push(input);
            }
        }
    }

    pushed.extend(base);
    *buffered = forward_closure(&pushed, &by_input);
}

//! Run-wide clock tags keyed by (cell type, port, bit).
//!
//! A [`TagTables`] value is threaded through every module of a run. Modules
//! processed earlier publish the clock role of their ports here, and modules
//! processed later read those roles when they meet instances of the earlier
//! ones. Entries are only ever added.

use clkmap_common::{Ident, Interner};
use clkmap_config::LibraryTags;
use std::collections::{HashMap, HashSet};

/// One bit of one port of a cell type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PortBit {
    /// The cell type, or the module name when the port belongs to a module.
    pub cell_type: Ident,
    /// The port name.
    pub port: Ident,
    /// Bit index within the port.
    pub bit: u32,
}

impl PortBit {
    /// Creates a port bit.
    pub fn new(cell_type: Ident, port: Ident, bit: u32) -> Self {
        Self {
            cell_type,
            port,
            bit,
        }
    }
}

/// The propagation context of a run.
#[derive(Debug, Clone, Default)]
pub struct TagTables {
    sink_ports: HashSet<PortBit>,
    buf_ports: HashSet<PortBit>,
    inv_out: HashMap<PortBit, (Ident, u32)>,
    inv_in: HashMap<PortBit, (Ident, u32)>,
}

impl TagTables {
    /// Creates empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a port bit as consuming a clock. Returns `true` if newly added.
    pub fn add_sink(&mut self, port: PortBit) -> bool {
        self.sink_ports.insert(port)
    }

    /// Marks a port bit as supplying a buffered clock. Returns `true` if
    /// newly added.
    pub fn add_buffered(&mut self, port: PortBit) -> bool {
        self.buf_ports.insert(port)
    }

    /// Pairs bit `bit` of `output` with the same bit of `input` on an
    /// inverting cell type.
    pub fn add_inverter(&mut self, cell_type: Ident, output: Ident, input: Ident, bit: u32) {
        self.inv_out
            .insert(PortBit::new(cell_type, output, bit), (input, bit));
        self.inv_in
            .insert(PortBit::new(cell_type, input, bit), (output, bit));
    }

    /// Returns `true` if the port bit consumes a clock.
    pub fn is_sink(&self, port: &PortBit) -> bool {
        self.sink_ports.contains(port)
    }

    /// Returns `true` if the port bit supplies a buffered clock.
    pub fn is_buffered(&self, port: &PortBit) -> bool {
        self.buf_ports.contains(port)
    }

    /// For an inverter output slot, the paired input port and bit.
    pub fn inverter_input(&self, output: &PortBit) -> Option<(Ident, u32)> {
        self.inv_out.get(output).copied()
    }

    /// For an inverter input slot, the paired output port and bit.
    pub fn inverter_output(&self, input: &PortBit) -> Option<(Ident, u32)> {
        self.inv_in.get(input).copied()
    }

    /// Adds the tags configured for library cells.
    pub fn seed_library(&mut self, library: &LibraryTags, interner: &Interner) {
        for tag in &library.sinks {
            let (cell, port) = (interner.get_or_intern(&tag.cell), interner.get_or_intern(&tag.port));
            for bit in 0..tag.width {
                self.add_sink(PortBit::new(cell, port, bit));
            }
        }
        for tag in &library.drivers {
            let (cell, port) = (interner.get_or_intern(&tag.cell), interner.get_or_intern(&tag.port));
            for bit in 0..tag.width {
                self.add_buffered(PortBit::new(cell, port, bit));
            }
        }
        for inv in &library.inverters {
            let cell = interner.get_or_intern(&inv.cell);
            let output = interner.get_or_intern(&inv.output);
            let input = interner.get_or_intern(&inv.input);
            for bit in 0..inv.width {
                self.add_inverter(cell, output, input, bit);
            }
        }
    }
}

//! Run-wide settings resolved once before any module is processed.

use crate::metadata::ATTR_CLKBUF_DRIVER;
use crate::tags::{PortBit, TagTables};
use crate::ClkbufOptions;
use clkmap_common::{Ident, Interner};
use clkmap_config::CellSpec;
use clkmap_diagnostics::DiagnosticSink;
use clkmap_netlist::{Design, Selection};

/// An inserted cell type with its interned port names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellPorts {
    /// The cell type.
    pub cell_type: Ident,
    /// Port facing the clock sinks.
    pub out_port: Ident,
    /// Port facing the clock source.
    pub in_port: Ident,
}

impl CellPorts {
    /// Interns the names of a parsed cell spec.
    pub fn intern(spec: &CellSpec, interner: &Interner) -> Self {
        Self {
            cell_type: interner.get_or_intern(&spec.cell_type),
            out_port: interner.get_or_intern(&spec.out_port),
            in_port: interner.get_or_intern(&spec.in_port),
        }
    }
}

/// Everything a module pass reads but never changes.
pub struct PassContext<'a> {
    /// Names of the design being processed.
    pub interner: &'a Interner,
    /// Where notes go.
    pub sink: &'a DiagnosticSink,
    /// Which wires may be buffered.
    pub selection: &'a Selection,
    /// The buffer to insert, if any.
    pub buffer: Option<CellPorts>,
    /// The pad to insert on top-level clock inputs, if any.
    pub pad: Option<CellPorts>,
    /// Secondary buffer types and their single input port.
    pub secondary: Vec<(Ident, Ident)>,
    /// Whether a buffer also goes behind an inserted pad.
    pub buffer_inputs: bool,
}

impl<'a> PassContext<'a> {
    /// Resolves the options against the design.
    ///
    /// When the pad type is defined in the design and its output port is a
    /// clock driver, the pad alone supplies the clock on top-level inputs.
    /// An undefined pad type always gets a buffer behind it.
    pub fn new(
        design: &Design,
        interner: &'a Interner,
        options: &'a ClkbufOptions,
        sink: &'a DiagnosticSink,
    ) -> Self {
        let buffer = options.buffer.as_ref().map(|s| CellPorts::intern(s, interner));
        let pad = options.pad.as_ref().map(|s| CellPorts::intern(s, interner));
        let secondary = options
            .secondary
            .iter()
            .map(|s| (interner.get_or_intern(&s.cell), interner.get_or_intern(&s.port)))
            .collect();

        let mut buffer_inputs = true;
        if let Some(pad) = pad {
            if let Some(id) = design.module_by_name(pad.cell_type) {
                let module = design.module(id);
                let drives = module
                    .wire_by_name(pad.out_port)
                    .is_some_and(|w| module.wires[w].attributes.flag(interner, ATTR_CLKBUF_DRIVER));
                if drives {
                    buffer_inputs = false;
                }
            }
        }

        Self {
            interner,
            sink,
            selection: &options.selection,
            buffer,
            pad,
            secondary,
            buffer_inputs,
        }
    }

    /// Marks the outputs of cells this run inserts as buffered, so a later
    /// run recognizes them without a library definition.
    pub fn seed_inserted_cells(&self, tags: &mut TagTables) {
        if let Some(buf) = self.buffer {
            tags.add_buffered(PortBit::new(buf.cell_type, buf.out_port, 0));
        }
        if let Some(pad) = self.pad {
            if self.buffer.is_none() || !self.buffer_inputs {
                tags.add_buffered(PortBit::new(pad.cell_type, pad.out_port, 0));
            }
        }
    }

    /// Resolves an identifier.
    pub fn name(&self, ident: Ident) -> &'a str {
        self.interner.resolve(ident)
    }
}

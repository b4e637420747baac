//! The per-bit buffering decision and cell placement.
//!
//! Wires are visited in ID order over a snapshot taken before any cell is
//! added. For each bit of a processed wire, with `m` its canonical bit:
//!
//! | condition | action |
//! |---|---|
//! | `m` is buffered | nothing; an output port bit is published as buffered |
//! | `m` is not a sink | nothing |
//! | the raw bit is driven here, or the wire is a top-level input | insert |
//! | the wire is an input port | defer to the instantiating module |
//!
//! An inserted buffer drives `m` from its out port and reads a fresh wire on
//! its in port; [`reconnect_drivers`](crate::reconnect::reconnect_drivers)
//! later moves the original drivers of `m` onto that fresh wire.

use crate::codes;
use crate::collect::ModuleTags;
use crate::context::{CellPorts, PassContext};
use crate::metadata::WireClockInfo;
use crate::report::{Insertion, InsertionKind};
use crate::rewire::split_input_port;
use crate::tags::PortBit;
use clkmap_diagnostics::{Diagnostic, Location};
use clkmap_netlist::{CellId, Module, PortDirection, SigBit, SigMap, WireId};
use std::collections::{BTreeMap, BTreeSet};

/// Where the original drivers of a buffered bit are moved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Substitution {
    /// The inserted cell that now drives the canonical bit.
    pub cell: CellId,
    /// The fresh wire on the source side of the inserted cells.
    pub wire: WireId,
}

impl Substitution {
    /// The single bit of the source-side wire.
    pub fn bit(&self) -> SigBit {
        SigBit::wire(self.wire, 0)
    }
}

/// The wires of a module sorted by how the pass treats them.
#[derive(Debug, Default)]
pub struct WirePlan {
    /// Wires whose bits go through the decision table, in ID order.
    pub processed: Vec<WireId>,
    /// Canonical bits of all processed wires.
    pub eligible: BTreeSet<SigBit>,
    /// Bits of output ports excluded from processing.
    pub bypassed_outputs: Vec<PortBit>,
}

/// Classifies every wire of a module.
///
/// Wires flagged as both input and output are left alone. A wire is
/// processed if it is selected and, unless the selection is
/// explicit, not inhibited.
pub fn plan_wires(module: &Module, sigmap: &SigMap, ctx: &PassContext<'_>) -> WirePlan {
    let mut plan = WirePlan::default();
    for id in module.wires.ids() {
        let wire = &module.wires[id];
        if wire.port_input && wire.port_output {
            continue;
        }
        let inhibited = WireClockInfo::read(module, wire, ctx.interner).inhibit;
        let selected = ctx.selection.selects_wire(module, wire, ctx.interner)
            && (ctx.selection.is_explicit() || !inhibited);
        if !selected {
            if wire.port_output {
                plan.bypassed_outputs
                    .extend((0..wire.width).map(|i| PortBit::new(module.name, wire.name, i)));
            }
            continue;
        }
        plan.eligible.extend(wire.bits().map(|bit| sigmap.map(bit)));
        plan.processed.push(id);
    }
    plan
}

/// Everything the decision pass produced for one module.
#[derive(Debug, Default)]
pub struct InsertOutcome {
    /// Canonical bit to the cells inserted for it.
    pub substitutions: BTreeMap<SigBit, Substitution>,
    /// Input ports that got a replacement wire, as (original, replacement).
    pub split_ports: Vec<(WireId, WireId)>,
    /// Output port bits found already buffered.
    pub buffered_outputs: Vec<PortBit>,
    /// Input port bits left to the instantiating module.
    pub deferred: Vec<PortBit>,
    /// One entry per inserted cell.
    pub insertions: Vec<Insertion>,
}

/// Runs the decision table over the processed wires of a module.
pub struct Inserter<'c, 'a> {
    ctx: &'c PassContext<'a>,
    sigmap: &'c SigMap,
    tags: &'c ModuleTags,
    outcome: InsertOutcome,
}

impl<'c, 'a> Inserter<'c, 'a> {
    /// Creates an inserter over the tags collected for a module.
    pub fn new(ctx: &'c PassContext<'a>, sigmap: &'c SigMap, tags: &'c ModuleTags) -> Self {
        Self {
            ctx,
            sigmap,
            tags,
            outcome: InsertOutcome::default(),
        }
    }

    /// Visits every processed wire and returns what was done.
    pub fn run(mut self, module: &mut Module, plan: &WirePlan) -> InsertOutcome {
        let is_top = module.is_top(self.ctx.interner);
        for &id in &plan.processed {
            self.visit_wire(module, id, is_top);
        }
        self.outcome
    }

    fn visit_wire(&mut self, module: &mut Module, id: WireId, is_top: bool) {
        let (name, width, port_input, port_output) = {
            let w = &module.wires[id];
            (w.name, w.width, w.port_input, w.port_output)
        };
        let mut split = false;
        for i in 0..width {
            let bit = SigBit::wire(id, i);
            let mapped = self.sigmap.map(bit);
            if self.tags.buffered.contains(&mapped) {
                if port_output {
                    self.outcome
                        .buffered_outputs
                        .push(PortBit::new(module.name, name, i));
                }
            } else if !self.tags.sinks.contains(&mapped) {
                // not a clock
            } else if self.tags.driven.contains(&bit) || (port_input && is_top) {
                if !self.outcome.substitutions.contains_key(&mapped) {
                    let at_pad = port_input && is_top && self.ctx.pad.is_some();
                    if let Some(sub) = self.place_cells(module, id, i, mapped, at_pad) {
                        self.outcome.substitutions.insert(mapped, sub);
                    }
                }
                if port_input {
                    split = true;
                }
            } else if port_input {
                let module_name = self.ctx.name(module.name);
                self.ctx.sink.emit(
                    Diagnostic::note(
                        codes::CLOCK_INPUT_DEFERRED,
                        format!(
                            "clock input {}.{}[{}] is left to instantiating modules",
                            module_name,
                            self.ctx.name(name),
                            i
                        ),
                    )
                    .at(Location::object(module_name, self.ctx.name(name))),
                );
                self.outcome.deferred.push(PortBit::new(module.name, name, i));
            }
        }
        if split {
            let replacement = split_input_port(
                module,
                self.ctx.interner,
                self.sigmap,
                id,
                &self.outcome.substitutions,
            );
            self.outcome.split_ports.push((id, replacement));
        }
    }

    /// Adds the buffer and, on a top-level clock input, the pad for one
    /// canonical bit.
    ///
    /// With both present the pad feeds the buffer. Returns `None` when
    /// neither cell applies.
    fn place_cells(
        &mut self,
        module: &mut Module,
        wire: WireId,
        bit: u32,
        mapped: SigBit,
        at_pad: bool,
    ) -> Option<Substitution> {
        let mut placed: Option<Substitution> = None;
        if let Some(buf) = self.ctx.buffer {
            if !at_pad || self.ctx.buffer_inputs {
                let (cell, source) = self.add_cell(module, buf, mapped);
                self.record(module, wire, bit, InsertionKind::Buffer, buf, cell);
                placed = Some(Substitution { cell, wire: source });
            }
        }
        if at_pad {
            if let Some(pad) = self.ctx.pad {
                let toward_sinks = placed.map_or(mapped, |sub| sub.bit());
                let (cell, source) = self.add_cell(module, pad, toward_sinks);
                self.record(module, wire, bit, InsertionKind::Pad, pad, cell);
                placed = Some(Substitution {
                    cell: placed.map_or(cell, |sub| sub.cell),
                    wire: source,
                });
            }
        }
        placed
    }

    /// Adds one cell driving `toward_sinks` from a fresh source-side wire.
    fn add_cell(&self, module: &mut Module, ports: CellPorts, toward_sinks: SigBit) -> (CellId, WireId) {
        let cell_name = module.fresh_name(self.ctx.interner);
        let cell = module.add_cell(cell_name, ports.cell_type);
        let wire_name = module.fresh_name(self.ctx.interner);
        let source = module.add_wire(wire_name, 1);
        module.set_cell_port(cell, ports.out_port, PortDirection::Output, toward_sinks.into());
        module.set_cell_port(
            cell,
            ports.in_port,
            PortDirection::Input,
            SigBit::wire(source, 0).into(),
        );
        (cell, source)
    }

    fn record(
        &mut self,
        module: &Module,
        wire: WireId,
        bit: u32,
        kind: InsertionKind,
        ports: CellPorts,
        cell: CellId,
    ) {
        let module_name = self.ctx.name(module.name);
        let wire_name = self.ctx.name(module.wires[wire].name);
        let cell_type = self.ctx.name(ports.cell_type);
        let code = match kind {
            InsertionKind::Buffer => codes::BUFFER_INSERTED,
            InsertionKind::Pad => codes::PAD_INSERTED,
        };
        self.ctx.sink.emit(
            Diagnostic::note(
                code,
                format!("inserting {cell_type} on {module_name}.{wire_name}[{bit}]"),
            )
            .at(Location::object(module_name, wire_name)),
        );
        self.outcome.insertions.push(Insertion {
            module: module_name.to_string(),
            wire: wire_name.to_string(),
            bit,
            kind,
            cell_type: cell_type.to_string(),
            cell: self.ctx.name(module.cells[cell].name).to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect;
    use crate::tags::TagTables;
    use crate::ClkbufOptions;
    use clkmap_common::Interner;
    use clkmap_config::CellSpec;
    use clkmap_diagnostics::DiagnosticSink;
    use clkmap_netlist::{AttrValue, Design, ModuleId, Selection};

    struct Fixture {
        interner: Interner,
        design: Design,
        top: ModuleId,
    }

    /// `top` with input `clk` feeding an `FDRE.C` sink.
    fn fixture() -> Fixture {
        let interner = Interner::new();
        let mut design = Design::new();
        let top = design.add_module(interner.get_or_intern("top"));
        let m = design.module_mut(top);
        m.set_top(&interner);
        let clk = m.add_port(interner.get_or_intern("clk"), 1, PortDirection::Input);
        let ff = m.add_cell(interner.get_or_intern("ff"), interner.get_or_intern("FDRE"));
        m.set_cell_port(
            ff,
            interner.get_or_intern("C"),
            PortDirection::Input,
            SigBit::wire(clk, 0).into(),
        );
        Fixture {
            interner,
            design,
            top,
        }
    }

    fn sink_tags(interner: &Interner) -> TagTables {
        let mut tags = TagTables::new();
        tags.add_sink(PortBit::new(
            interner.get_or_intern("FDRE"),
            interner.get_or_intern("C"),
            0,
        ));
        tags
    }

    fn insert(f: &mut Fixture, options: &ClkbufOptions, sink: &DiagnosticSink) -> InsertOutcome {
        let tags = sink_tags(&f.interner);
        let ctx = PassContext::new(&f.design, &f.interner, options, sink);
        let module = f.design.module_mut(f.top);
        let sigmap = SigMap::from_module(module);
        let local = collect(module, &sigmap, &tags);
        let plan = plan_wires(module, &sigmap, &ctx);
        Inserter::new(&ctx, &sigmap, &local).run(module, &plan)
    }

    #[test]
    fn top_input_gets_buffer_and_split() {
        let mut f = fixture();
        let options = ClkbufOptions::default().with_buffer(CellSpec::parse("BUFG", "O:I"));
        let sink = DiagnosticSink::new();
        let outcome = insert(&mut f, &options, &sink);
        assert_eq!(outcome.insertions.len(), 1);
        assert_eq!(outcome.insertions[0].kind, InsertionKind::Buffer);
        assert_eq!(outcome.substitutions.len(), 1);
        assert_eq!(outcome.split_ports.len(), 1);
        assert_eq!(sink.diagnostics()[0].code, codes::BUFFER_INSERTED);
    }

    #[test]
    fn pad_feeds_buffer_on_top_input() {
        let mut f = fixture();
        let options = ClkbufOptions::default()
            .with_buffer(CellSpec::parse("BUFG", "O:I"))
            .with_pad(CellSpec::parse("IBUF", "O:I"));
        let sink = DiagnosticSink::new();
        let outcome = insert(&mut f, &options, &sink);
        let kinds: Vec<_> = outcome.insertions.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![InsertionKind::Buffer, InsertionKind::Pad]);

        let sub = outcome.substitutions.values().next().copied().unwrap();
        let module = f.design.module(f.top);
        let bufg = &module.cells[sub.cell];
        assert_eq!(f.interner.resolve(bufg.cell_type), "BUFG");
        let ibuf = module
            .cells
            .values()
            .find(|c| f.interner.resolve(c.cell_type) == "IBUF")
            .unwrap();
        let o = f.interner.get_or_intern("O");
        let i = f.interner.get_or_intern("I");
        assert_eq!(ibuf.port(o), bufg.port(i));
        assert_eq!(ibuf.port(i).and_then(|s| s.as_bit()), Some(sub.bit()));
    }

    #[test]
    fn non_top_input_is_deferred() {
        let mut f = fixture();
        let top_attr = f.interner.get_or_intern("top");
        f.design.module_mut(f.top).attributes.remove(top_attr);
        let options = ClkbufOptions::default().with_buffer(CellSpec::parse("BUFG", "O:I"));
        let sink = DiagnosticSink::new();
        let outcome = insert(&mut f, &options, &sink);
        assert!(outcome.insertions.is_empty());
        assert_eq!(outcome.deferred.len(), 1);
        assert!(outcome.split_ports.is_empty());
        assert_eq!(sink.diagnostics()[0].code, codes::CLOCK_INPUT_DEFERRED);
    }

    #[test]
    fn inhibited_output_is_bypassed() {
        let mut f = fixture();
        let m = f.design.module_mut(f.top);
        let q = m.add_port(f.interner.get_or_intern("q"), 2, PortDirection::Output);
        m.wires[q].attributes.set(
            f.interner.get_or_intern(crate::metadata::ATTR_CLKBUF_INHIBIT),
            AttrValue::flag(true),
        );
        let options = ClkbufOptions::default().with_buffer(CellSpec::parse("BUFG", "O:I"));
        let sink = DiagnosticSink::new();
        let ctx = PassContext::new(&f.design, &f.interner, &options, &sink);
        let module = f.design.module(f.top);
        let plan = plan_wires(module, &SigMap::from_module(module), &ctx);
        assert_eq!(plan.bypassed_outputs.len(), 2);
        assert!(!plan.processed.contains(&q));

        let explicit = ClkbufOptions::default()
            .with_buffer(CellSpec::parse("BUFG", "O:I"))
            .with_selection(Selection::parse(&["q"]).unwrap());
        let ctx = PassContext::new(&f.design, &f.interner, &explicit, &sink);
        let plan = plan_wires(module, &SigMap::from_module(module), &ctx);
        assert_eq!(plan.processed, vec![q]);
    }

    #[test]
    fn inout_ports_are_skipped_quietly() {
        let mut f = fixture();
        let m = f.design.module_mut(f.top);
        let io = m.add_port(f.interner.get_or_intern("io"), 1, PortDirection::InOut);
        let options = ClkbufOptions::default().with_buffer(CellSpec::parse("BUFG", "O:I"));
        let sink = DiagnosticSink::new();
        let ctx = PassContext::new(&f.design, &f.interner, &options, &sink);
        let module = f.design.module(f.top);
        let plan = plan_wires(module, &SigMap::from_module(module), &ctx);
        assert!(!plan.processed.contains(&io));
        assert!(!plan.bypassed_outputs.iter().any(|p| p.port == f.interner.get_or_intern("io")));
        assert!(sink.diagnostics().is_empty());
    }
}

use clkmap_common::{Ident, Interner};
use clkmap_config::{CellSpec, InverterTag, LibraryTags, PortTag};
use clkmap_diagnostics::DiagnosticSink;
use clkmap_engine::{
    run, run_with_tags, ClkbufError, ClkbufOptions, InsertionKind, InsertionReport, PortBit,
    TagTables,
};
use clkmap_netlist::{
    AttrValue, CellId, Design, ModuleId, PortDirection, Selection, SigBit, SigMap, WireId,
};

struct Netlist {
    interner: Interner,
    design: Design,
}

impl Netlist {
    fn new() -> Self {
        Self {
            interner: Interner::new(),
            design: Design::new(),
        }
    }

    fn id(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    fn module(&mut self, name: &str, top: bool) -> ModuleId {
        let id = self.design.add_module(self.id(name));
        if top {
            self.design.module_mut(id).set_top(&self.interner);
        }
        id
    }

    fn port(&mut self, m: ModuleId, name: &str, width: u32, dir: PortDirection) -> WireId {
        let name = self.id(name);
        self.design.module_mut(m).add_port(name, width, dir)
    }

    fn wire(&mut self, m: ModuleId, name: &str) -> WireId {
        let name = self.id(name);
        self.design.module_mut(m).add_wire(name, 1)
    }

    fn cell(
        &mut self,
        m: ModuleId,
        name: &str,
        cell_type: &str,
        ports: &[(&str, PortDirection, WireId)],
    ) -> CellId {
        let (name, cell_type) = (self.id(name), self.id(cell_type));
        let bound: Vec<_> = ports.iter().map(|&(p, d, w)| (self.id(p), d, w)).collect();
        let module = self.design.module_mut(m);
        let cell = module.add_cell(name, cell_type);
        for (port, dir, wire) in bound {
            module.set_cell_port(cell, port, dir, SigBit::wire(wire, 0).into());
        }
        cell
    }

    fn flag(&mut self, m: ModuleId, wire: WireId, attr: &str) {
        let attr = self.id(attr);
        self.design.module_mut(m).wires[wire]
            .attributes
            .set(attr, AttrValue::flag(true));
    }

    fn cells_of(&self, m: ModuleId, cell_type: &str) -> Vec<CellId> {
        let ty = self.id(cell_type);
        self.design
            .module(m)
            .cells
            .iter()
            .filter(|(_, c)| c.cell_type == ty)
            .map(|(id, _)| id)
            .collect()
    }

    /// Canonical bit 0 on `port` of `cell`.
    fn pin(&self, m: ModuleId, cell: CellId, port: &str) -> SigBit {
        let module = self.design.module(m);
        let bit = module
            .cell_port(cell, self.id(port))
            .and_then(|sig| sig.get(0))
            .expect("port is bound");
        SigMap::from_module(module).map(bit)
    }

    /// Canonical bit 0 of the wire currently named `name`.
    fn net(&self, m: ModuleId, name: &str) -> SigBit {
        let module = self.design.module(m);
        let wire = module.wire_by_name(self.id(name)).expect("wire exists");
        SigMap::from_module(module).map(SigBit::wire(wire, 0))
    }

    fn run(&mut self, options: &ClkbufOptions) -> InsertionReport {
        let sink = DiagnosticSink::new();
        run(&mut self.design, &self.interner, options, &sink).expect("run succeeds")
    }

    fn cell_count(&self) -> usize {
        self.design.modules_iter().map(|(_, m)| m.cells.len()).sum()
    }
}

fn library() -> LibraryTags {
    LibraryTags {
        sinks: vec![PortTag {
            cell: "FDRE".into(),
            port: "C".into(),
            width: 1,
        }],
        drivers: vec![PortTag {
            cell: "BUFR".into(),
            port: "O".into(),
            width: 1,
        }],
        inverters: vec![InverterTag {
            cell: "$_NOT_".into(),
            output: "Y".into(),
            input: "A".into(),
            width: 1,
        }],
    }
}

fn bufg() -> ClkbufOptions {
    ClkbufOptions::default()
        .with_buffer(CellSpec::parse("BUFG", "O:I"))
        .with_library(library())
}

/// `top` with input `clk` clocking one flip-flop.
fn single_flop() -> (Netlist, ModuleId, CellId) {
    let mut n = Netlist::new();
    let top = n.module("top", true);
    let clk = n.port(top, "clk", 1, PortDirection::Input);
    let ff = n.cell(top, "ff", "FDRE", &[("C", PortDirection::Input, clk)]);
    (n, top, ff)
}

#[test]
fn top_input_clock_gets_one_buffer() {
    let (mut n, top, ff) = single_flop();
    let report = n.run(&bufg());

    assert_eq!(report.insertions.len(), 1);
    assert_eq!(report.insertions[0].kind, InsertionKind::Buffer);
    assert_eq!(report.insertions[0].wire, "clk");
    assert_eq!(report.modules[0].reconnected, 0);
    let bufs = n.cells_of(top, "BUFG");
    assert_eq!(bufs.len(), 1);
    assert_eq!(n.pin(top, ff, "C"), n.pin(top, bufs[0], "O"));
    assert_eq!(n.pin(top, bufs[0], "I"), n.net(top, "clk"));
    assert_ne!(n.pin(top, ff, "C"), n.net(top, "clk"));

    let module = n.design.module(top);
    let clk = module.wire_by_name(n.id("clk")).unwrap();
    assert_eq!(module.ports, vec![clk]);
    assert!(module.wires[clk].port_input);
}

fn with_driver_pad(n: &mut Netlist) {
    let ibuf = n.module("IBUFG", false);
    let bb = n.id("blackbox");
    n.design
        .module_mut(ibuf)
        .attributes
        .set(bb, AttrValue::flag(true));
    let o = n.port(ibuf, "O", 1, PortDirection::Output);
    n.port(ibuf, "I", 1, PortDirection::Input);
    n.flag(ibuf, o, "clkbuf_driver");
}

#[test]
fn driver_pad_replaces_buffer_on_top_input() {
    for buffer in [false, true] {
        let (mut n, top, ff) = single_flop();
        with_driver_pad(&mut n);
        let mut options = ClkbufOptions::default()
            .with_pad(CellSpec::parse("IBUFG", "O:I"))
            .with_library(library());
        if buffer {
            options = options.with_buffer(CellSpec::parse("BUFG", "O:I"));
        }
        let report = n.run(&options);

        assert_eq!(report.count(InsertionKind::Pad), 1);
        assert_eq!(report.count(InsertionKind::Buffer), 0);
        assert!(n.cells_of(top, "BUFG").is_empty());
        let pads = n.cells_of(top, "IBUFG");
        assert_eq!(pads.len(), 1);
        assert_eq!(n.pin(top, ff, "C"), n.pin(top, pads[0], "O"));
        assert_eq!(n.pin(top, pads[0], "I"), n.net(top, "clk"));
    }
}

#[test]
fn plain_pad_sits_in_front_of_buffer() {
    let (mut n, top, ff) = single_flop();
    let options = bufg().with_pad(CellSpec::parse("IBUF", "O:I"));
    let report = n.run(&options);

    assert_eq!(report.insertions.len(), 2);
    let (bufg, ibuf) = (n.cells_of(top, "BUFG")[0], n.cells_of(top, "IBUF")[0]);
    assert_eq!(n.pin(top, ff, "C"), n.pin(top, bufg, "O"));
    assert_eq!(n.pin(top, bufg, "I"), n.pin(top, ibuf, "O"));
    assert_eq!(n.pin(top, ibuf, "I"), n.net(top, "clk"));
}

#[test]
fn buffer_moves_in_front_of_inverter() {
    let mut n = Netlist::new();
    let top = n.module("top", true);
    let src = n.wire(top, "src");
    let inv = n.wire(top, "inv");
    let pll = n.cell(top, "pll", "PLL", &[("O", PortDirection::Output, src)]);
    let not = n.cell(
        top,
        "not",
        "$_NOT_",
        &[
            ("A", PortDirection::Input, src),
            ("Y", PortDirection::Output, inv),
        ],
    );
    let ff = n.cell(top, "ff", "FDRE", &[("C", PortDirection::Input, inv)]);

    let report = n.run(&bufg());
    assert_eq!(report.insertions.len(), 1);
    assert_eq!(report.insertions[0].wire, "src");
    let buf = n.cells_of(top, "BUFG")[0];
    assert_eq!(n.pin(top, not, "A"), n.pin(top, buf, "O"));
    assert_eq!(n.pin(top, pll, "O"), n.pin(top, buf, "I"));
    assert_eq!(n.pin(top, ff, "C"), n.pin(top, not, "Y"));

    assert!(n.run(&bufg()).is_empty());
}

/// `sub` clocks a flip-flop from its input `clk`; `top` feeds it from its
/// own input.
fn deferred_hierarchy() -> (Netlist, ModuleId, ModuleId, CellId) {
    let mut n = Netlist::new();
    let sub = n.module("sub", false);
    let sub_clk = n.port(sub, "clk", 1, PortDirection::Input);
    n.cell(sub, "ff", "FDRE", &[("C", PortDirection::Input, sub_clk)]);
    let top = n.module("top", true);
    let clk = n.port(top, "clk", 1, PortDirection::Input);
    let inst = n.cell(top, "u_sub", "sub", &[("clk", PortDirection::Input, clk)]);
    (n, sub, top, inst)
}

#[test]
fn submodule_clock_input_is_buffered_by_parent() {
    let (mut n, sub, top, inst) = deferred_hierarchy();
    let report = n.run(&bufg());

    assert!(n.cells_of(sub, "BUFG").is_empty());
    let bufs = n.cells_of(top, "BUFG");
    assert_eq!(bufs.len(), 1);
    assert_eq!(n.pin(top, inst, "clk"), n.pin(top, bufs[0], "O"));

    let names: Vec<_> = report.modules.iter().map(|s| s.module.as_str()).collect();
    assert_eq!(names, vec!["sub", "top"]);
    assert_eq!(report.modules[0].deferred, 1);
    assert_eq!(report.modules[1].inserted, 1);
}

#[test]
fn second_run_changes_nothing() {
    let (mut n, _, _) = single_flop();
    n.run(&bufg());
    let cells = n.cell_count();
    assert!(n.run(&bufg()).is_empty());
    assert_eq!(n.cell_count(), cells);

    let (mut n, _, _, _) = deferred_hierarchy();
    n.run(&bufg());
    let cells = n.cell_count();
    assert!(n.run(&bufg()).is_empty());
    assert_eq!(n.cell_count(), cells);
}

#[test]
fn ports_keep_name_width_and_direction() {
    let mut n = Netlist::new();
    let top = n.module("top", true);
    let clk = n.port(top, "clk", 1, PortDirection::Input);
    let d = n.port(top, "d", 4, PortDirection::Input);
    let q = n.port(top, "q", 2, PortDirection::Output);
    n.cell(top, "ff", "FDRE", &[("C", PortDirection::Input, clk), ("D", PortDirection::Input, d)]);
    n.cell(top, "ff2", "FDRE", &[("C", PortDirection::Input, clk), ("Q", PortDirection::Output, q)]);

    let describe = |n: &Netlist| -> Vec<(String, u32, Option<PortDirection>)> {
        let module = n.design.module(top);
        module
            .ports
            .iter()
            .map(|&p| {
                let w = &module.wires[p];
                (n.interner.resolve(w.name).to_string(), w.width, w.direction())
            })
            .collect()
    };
    let before = describe(&n);
    assert_eq!(n.run(&bufg()).insertions.len(), 1);
    assert_eq!(describe(&n), before);
}

#[test]
fn inhibited_wire_is_left_alone() {
    let build = || {
        let mut n = Netlist::new();
        let top = n.module("top", true);
        let a = n.port(top, "clk_a", 1, PortDirection::Input);
        let b = n.port(top, "clk_b", 1, PortDirection::Input);
        n.flag(top, a, "clkbuf_inhibit");
        let ff_a = n.cell(top, "ff_a", "FDRE", &[("C", PortDirection::Input, a)]);
        let ff_b = n.cell(top, "ff_b", "FDRE", &[("C", PortDirection::Input, b)]);
        (n, top, ff_a, ff_b)
    };

    let (mut n, top, ff_a, ff_b) = build();
    let report = n.run(&bufg());
    assert_eq!(report.insertions.len(), 1);
    assert_eq!(report.insertions[0].wire, "clk_b");
    assert_eq!(n.pin(top, ff_a, "C"), n.net(top, "clk_a"));
    assert_ne!(n.pin(top, ff_b, "C"), n.net(top, "clk_b"));

    let (mut n, top, ff_a, ff_b) = build();
    let explicit = bufg().with_selection(Selection::parse(&["w:clk_a"]).unwrap());
    let report = n.run(&explicit);
    assert_eq!(report.insertions.len(), 1);
    assert_eq!(report.insertions[0].wire, "clk_a");
    assert_ne!(n.pin(top, ff_a, "C"), n.net(top, "clk_a"));
    assert_eq!(n.pin(top, ff_b, "C"), n.net(top, "clk_b"));
}

#[test]
fn buffered_submodule_output_is_not_buffered_again() {
    let mut n = Netlist::new();
    let sub = n.module("sub", false);
    let out = n.port(sub, "clk_out", 1, PortDirection::Output);
    n.cell(sub, "pll", "PLL", &[("O", PortDirection::Output, out)]);
    n.cell(sub, "ff", "FDRE", &[("C", PortDirection::Input, out)]);
    let top = n.module("top", true);
    let gclk = n.wire(top, "gclk");
    n.cell(top, "u_sub", "sub", &[("clk_out", PortDirection::Output, gclk)]);
    n.cell(top, "ff", "FDRE", &[("C", PortDirection::Input, gclk)]);

    let mut tags = TagTables::new();
    let sink = DiagnosticSink::new();
    let report = run_with_tags(&mut n.design, &n.interner, &bufg(), &mut tags, &sink).unwrap();

    assert_eq!(report.insertions.len(), 1);
    assert_eq!(report.insertions[0].module, "sub");
    assert!(n.cells_of(top, "BUFG").is_empty());
    assert!(tags.is_buffered(&PortBit::new(n.id("sub"), n.id("clk_out"), 0)));
}

#[test]
fn secondary_buffer_reads_source_side() {
    let mut n = Netlist::new();
    let top = n.module("top", true);
    let clk = n.wire(top, "clk");
    let rclk = n.wire(top, "rclk");
    n.cell(top, "pll", "PLL", &[("O", PortDirection::Output, clk)]);
    n.cell(top, "ff", "FDRE", &[("C", PortDirection::Input, clk)]);
    let bufr = n.cell(
        top,
        "bufr",
        "BUFR",
        &[
            ("I", PortDirection::Input, clk),
            ("O", PortDirection::Output, rclk),
        ],
    );
    n.cell(top, "ff_r", "FDRE", &[("C", PortDirection::Input, rclk)]);

    let report = n.run(&bufg());
    assert_eq!(report.insertions.len(), 1);
    let buf = n.cells_of(top, "BUFG")[0];
    assert_eq!(n.pin(top, bufr, "I"), n.pin(top, buf, "I"));
    assert_ne!(n.pin(top, bufr, "I"), n.pin(top, buf, "O"));
    assert_eq!(report.modules[0].reconnected, 1);
}

#[test]
fn cyclic_hierarchy_is_rejected_untouched() {
    let (mut n, _, _) = single_flop();
    let a = n.module("a", false);
    let b = n.module("b", false);
    n.cell(a, "u_b", "b", &[]);
    n.cell(b, "u_a", "a", &[]);
    let cells = n.cell_count();

    let sink = DiagnosticSink::new();
    let err = run(&mut n.design, &n.interner, &bufg(), &sink).unwrap_err();
    assert!(matches!(err, ClkbufError::HierarchyCycle { ref chain } if chain.len() == 3));
    assert_eq!(n.cell_count(), cells);
}

#[test]
fn imported_netlist_round_trip() {
    let json = r#"{
  "modules": {
    "top": {
      "attributes": { "top": "00000000000000000000000000000001" },
      "ports": { "clk": { "direction": "input", "bits": [2] } },
      "cells": {
        "ff": {
          "hide_name": 0,
          "type": "FDRE",
          "parameters": {},
          "attributes": {},
          "port_directions": { "C": "input" },
          "connections": { "C": [2] }
        }
      },
      "netnames": { "clk": { "hide_name": 0, "bits": [2], "attributes": {} } }
    }
  }
}"#;
    let interner = Interner::new();
    let mut design = clkmap_json::import(json.as_bytes(), &interner).unwrap();
    let sink = DiagnosticSink::new();
    let report = run(&mut design, &interner, &bufg(), &sink).unwrap();
    assert_eq!(report.insertions.len(), 1);

    let mut out = Vec::new();
    clkmap_json::export(&mut out, &design, &interner).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let cells = value["modules"]["top"]["cells"].as_object().unwrap();
    let bufg = cells
        .values()
        .find(|c| c["type"] == "BUFG")
        .expect("buffer exported");
    let ff = &cells["ff"];
    assert_eq!(bufg["connections"]["O"], ff["connections"]["C"]);
    assert_eq!(
        bufg["connections"]["I"],
        value["modules"]["top"]["ports"]["clk"]["bits"]
    );
}

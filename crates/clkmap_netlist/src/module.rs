//! Modules: the unit of hierarchy.
//!
//! A [`Module`] owns its wires and cells in arenas plus a list of direct
//! bit connections. Modules form a hierarchy through cells whose
//! `cell_type` names another module of the same [`Design`](crate::Design).

use crate::arena::Arena;
use crate::attr::{AttrValue, Attributes};
use crate::cell::{Cell, PortDirection};
use crate::ids::{CellId, ModuleId, WireId};
use crate::sig::SigSpec;
use crate::wire::Wire;
use clkmap_common::{Ident, Interner};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Attribute marking the design root.
pub const ATTR_TOP: &str = "top";
/// Attribute marking a module with no usable contents.
pub const ATTR_BLACKBOX: &str = "blackbox";
/// Attribute marking a module whose contents are informational only.
pub const ATTR_WHITEBOX: &str = "whitebox";

const FRESH_PREFIX: &str = "$clkmap$";

/// A single module of a design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The ID of this module in its design.
    pub id: ModuleId,
    /// The module name, also used as cell type by instantiating modules.
    pub name: Ident,
    /// Module attributes.
    pub attributes: Attributes,
    /// All wires, ports included.
    pub wires: Arena<WireId, Wire>,
    /// All cells.
    pub cells: Arena<CellId, Cell>,
    /// Direct connections between equally wide signals.
    pub connections: Vec<(SigSpec, SigSpec)>,
    /// Port wires ordered by `port_id`. Rebuilt by [`Module::fixup_ports`].
    pub ports: Vec<WireId>,
    #[serde(default)]
    next_fresh: u32,
    /// Wire and cell names, built on the first [`Module::fresh_name`] call.
    #[serde(skip)]
    used_names: Option<HashSet<Ident>>,
}

impl Module {
    /// Creates an empty module.
    pub fn new(id: ModuleId, name: Ident) -> Self {
        Self {
            id,
            name,
            attributes: Attributes::new(),
            wires: Arena::new(),
            cells: Arena::new(),
            connections: Vec::new(),
            ports: Vec::new(),
            next_fresh: 0,
            used_names: None,
        }
    }

    /// Adds a non-port wire.
    pub fn add_wire(&mut self, name: Ident, width: u32) -> WireId {
        self.note_name(name);
        let id = self.wires.next_id();
        self.wires.alloc(Wire {
            id,
            name,
            width,
            port_input: false,
            port_output: false,
            port_id: 0,
            attributes: Attributes::new(),
        })
    }

    /// Adds a port wire at the end of the port list.
    pub fn add_port(&mut self, name: Ident, width: u32, direction: PortDirection) -> WireId {
        let id = self.add_wire(name, width);
        let port_id = self.ports.len() as u32 + 1;
        let wire = &mut self.wires[id];
        wire.port_input = matches!(direction, PortDirection::Input | PortDirection::InOut);
        wire.port_output = matches!(direction, PortDirection::Output | PortDirection::InOut);
        wire.port_id = port_id;
        self.ports.push(id);
        id
    }

    /// Adds a wire copying width, port flags, port position, and attributes
    /// from `template`.
    ///
    /// The copy is not added to [`ports`](Self::ports); callers are expected
    /// to demote one of the two wires and then call
    /// [`fixup_ports`](Self::fixup_ports).
    pub fn add_wire_like(&mut self, name: Ident, template: WireId) -> WireId {
        let src = &self.wires[template];
        let (width, port_input, port_output, port_id, attributes) = (
            src.width,
            src.port_input,
            src.port_output,
            src.port_id,
            src.attributes.clone(),
        );
        let id = self.add_wire(name, width);
        let wire = &mut self.wires[id];
        wire.port_input = port_input;
        wire.port_output = port_output;
        wire.port_id = port_id;
        wire.attributes = attributes;
        id
    }

    /// Adds a cell with no port bindings.
    pub fn add_cell(&mut self, name: Ident, cell_type: Ident) -> CellId {
        self.note_name(name);
        let id = self.cells.next_id();
        self.cells.alloc(Cell {
            id,
            name,
            cell_type,
            parameters: Attributes::new(),
            attributes: Attributes::new(),
            connections: Vec::new(),
        })
    }

    /// Returns the signal bound to `port` of `cell`.
    pub fn cell_port(&self, cell: CellId, port: Ident) -> Option<&SigSpec> {
        self.cells[cell].port(port)
    }

    /// Binds `port` of `cell`, replacing any existing binding.
    pub fn set_cell_port(
        &mut self,
        cell: CellId,
        port: Ident,
        direction: PortDirection,
        signal: SigSpec,
    ) {
        self.cells[cell].set_port(port, direction, signal);
    }

    /// Records a direct connection between two signals of equal width.
    pub fn connect(&mut self, lhs: SigSpec, rhs: SigSpec) {
        debug_assert_eq!(lhs.len(), rhs.len(), "connected signals differ in width");
        self.connections.push((lhs, rhs));
    }

    /// Looks up a wire by name.
    pub fn wire_by_name(&self, name: Ident) -> Option<WireId> {
        self.wires.iter().find(|(_, w)| w.name == name).map(|(id, _)| id)
    }

    /// Looks up a cell by name.
    pub fn cell_by_name(&self, name: Ident) -> Option<CellId> {
        self.cells.iter().find(|(_, c)| c.name == name).map(|(id, _)| id)
    }

    /// Exchanges the names of two wires. Port flags stay where they are.
    pub fn swap_names(&mut self, a: WireId, b: WireId) {
        let name_a = self.wires[a].name;
        let name_b = self.wires[b].name;
        self.wires[a].name = name_b;
        self.wires[b].name = name_a;
    }

    /// Rebuilds [`ports`](Self::ports) from the wire port flags.
    ///
    /// Ports keep their relative `port_id` order; wires that became ports
    /// without a position go last. Positions are renumbered from 1 and
    /// non-ports get `port_id` 0.
    pub fn fixup_ports(&mut self) {
        let mut ports: Vec<(u32, WireId)> = Vec::new();
        for (id, wire) in self.wires.iter_mut() {
            if wire.is_port() {
                ports.push((wire.port_id, id));
            } else {
                wire.port_id = 0;
            }
        }
        ports.sort_by_key(|&(port_id, id)| (port_id == 0, port_id, id));
        self.ports = ports.into_iter().map(|(_, id)| id).collect();
        for (i, &id) in self.ports.iter().enumerate() {
            self.wires[id].port_id = i as u32 + 1;
        }
    }

    /// Returns `true` for blackbox and whitebox modules.
    pub fn is_blackbox(&self, interner: &Interner) -> bool {
        self.attributes.flag(interner, ATTR_BLACKBOX)
            || self.attributes.flag(interner, ATTR_WHITEBOX)
    }

    /// Returns `true` if the module carries the `top` attribute.
    pub fn is_top(&self, interner: &Interner) -> bool {
        self.attributes.flag(interner, ATTR_TOP)
    }

    /// Marks this module as the design top.
    pub fn set_top(&mut self, interner: &Interner) {
        self.attributes
            .set(interner.get_or_intern(ATTR_TOP), AttrValue::flag(true));
    }

    /// Returns a name used by no wire or cell of this module.
    ///
    /// The returned name counts as used from then on, whether or not an
    /// object is created with it.
    pub fn fresh_name(&mut self, interner: &Interner) -> Ident {
        let (wires, cells) = (&self.wires, &self.cells);
        let used = self.used_names.get_or_insert_with(|| {
            wires
                .values()
                .map(|w| w.name)
                .chain(cells.values().map(|c| c.name))
                .collect()
        });
        loop {
            let candidate = format!("{FRESH_PREFIX}{}", self.next_fresh);
            self.next_fresh += 1;
            let taken = interner.get(&candidate).is_some_and(|name| used.contains(&name));
            if !taken {
                let name = interner.get_or_intern(&candidate);
                used.insert(name);
                return name;
            }
        }
    }

    fn note_name(&mut self, name: Ident) {
        if let Some(used) = &mut self.used_names {
            used.insert(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sig::SigBit;

    fn module(interner: &Interner) -> Module {
        Module::new(ModuleId::from_raw(0), interner.get_or_intern("m"))
    }

    #[test]
    fn ports_are_numbered_in_order() {
        let interner = Interner::new();
        let mut m = module(&interner);
        let a = m.add_port(interner.get_or_intern("a"), 1, PortDirection::Input);
        let y = m.add_port(interner.get_or_intern("y"), 4, PortDirection::Output);
        assert_eq!(m.ports, vec![a, y]);
        assert_eq!(m.wires[y].port_id, 2);
        assert!(m.wires[y].port_output && !m.wires[y].port_input);
    }

    #[test]
    fn add_wire_like_copies_port_identity() {
        let interner = Interner::new();
        let mut m = module(&interner);
        let clk = m.add_port(interner.get_or_intern("clk"), 2, PortDirection::Input);
        m.wires[clk]
            .attributes
            .set(interner.get_or_intern("keep"), AttrValue::flag(true));
        let name = m.fresh_name(&interner);
        let copy = m.add_wire_like(name, clk);
        let w = &m.wires[copy];
        assert_eq!(w.width, 2);
        assert!(w.port_input);
        assert_eq!(w.port_id, 1);
        assert!(w.attributes.flag(&interner, "keep"));
    }

    #[test]
    fn swap_then_fixup_moves_port_to_new_wire() {
        let interner = Interner::new();
        let mut m = module(&interner);
        let first = m.add_port(interner.get_or_intern("first"), 1, PortDirection::Input);
        let clk = m.add_port(interner.get_or_intern("clk"), 1, PortDirection::Input);
        let last = m.add_port(interner.get_or_intern("last"), 1, PortDirection::Output);
        let name = m.fresh_name(&interner);
        let new = m.add_wire_like(name, clk);
        m.swap_names(new, clk);
        let old = &mut m.wires[clk];
        old.port_input = false;
        old.port_id = 0;
        m.fixup_ports();

        assert_eq!(m.ports, vec![first, new, last]);
        assert_eq!(interner.resolve(m.wires[new].name), "clk");
        assert_eq!(m.wires[clk].port_id, 0);
        assert_eq!(m.wires[last].port_id, 3);
    }

    #[test]
    fn fixup_appends_unnumbered_ports() {
        let interner = Interner::new();
        let mut m = module(&interner);
        let a = m.add_port(interner.get_or_intern("a"), 1, PortDirection::Input);
        let b = m.add_wire(interner.get_or_intern("b"), 1);
        m.wires[b].port_output = true;
        m.fixup_ports();
        assert_eq!(m.ports, vec![a, b]);
        assert_eq!(m.wires[b].port_id, 2);
    }

    #[test]
    fn fresh_names_skip_existing() {
        let interner = Interner::new();
        let mut m = module(&interner);
        m.add_wire(interner.get_or_intern("$clkmap$0"), 1);
        let fresh = m.fresh_name(&interner);
        assert_eq!(interner.resolve(fresh), "$clkmap$1");
        let cell_name = m.fresh_name(&interner);
        m.add_cell(cell_name, interner.get_or_intern("BUFG"));
        assert_ne!(m.fresh_name(&interner), cell_name);
    }

    #[test]
    fn fresh_names_see_objects_added_later() {
        let interner = Interner::new();
        let mut m = module(&interner);
        assert_eq!(interner.resolve(m.fresh_name(&interner)), "$clkmap$0");
        m.add_wire(interner.get_or_intern("$clkmap$1"), 1);
        m.add_cell(interner.get_or_intern("$clkmap$2"), interner.get_or_intern("BUFG"));
        assert_eq!(interner.resolve(m.fresh_name(&interner)), "$clkmap$3");
    }

    #[test]
    fn many_fresh_names_are_distinct() {
        let interner = Interner::new();
        let mut m = module(&interner);
        let mut seen = HashSet::new();
        for _ in 0..2000 {
            let name = m.fresh_name(&interner);
            m.add_wire(name, 1);
            assert!(seen.insert(name));
        }
        assert_eq!(m.wires.len(), 2000);
    }

    #[test]
    fn blackbox_and_top_flags() {
        let interner = Interner::new();
        let mut m = module(&interner);
        assert!(!m.is_blackbox(&interner));
        m.attributes
            .set(interner.get_or_intern("whitebox"), AttrValue::flag(true));
        assert!(m.is_blackbox(&interner));
        m.set_top(&interner);
        assert!(m.is_top(&interner));
    }

    #[test]
    fn cell_ports_and_connections() {
        let interner = Interner::new();
        let mut m = module(&interner);
        let a = m.add_wire(interner.get_or_intern("a"), 1);
        let b = m.add_wire(interner.get_or_intern("b"), 1);
        let c = m.add_cell(interner.get_or_intern("u0"), interner.get_or_intern("BUFG"));
        let o = interner.get_or_intern("O");
        m.set_cell_port(c, o, PortDirection::Output, SigBit::wire(a, 0).into());
        m.connect(m.wires[a].sig(), m.wires[b].sig());
        assert_eq!(m.cell_port(c, o).and_then(SigSpec::as_bit), Some(SigBit::wire(a, 0)));
        assert_eq!(m.connections.len(), 1);
    }
}

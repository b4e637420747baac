use crate::error::JsonError;
use crate::format::{JsonBit, JsonDesign, JsonDirection, JsonModule, JsonNet, NamedMap};
use clkmap_common::{Interner, Logic};
use clkmap_netlist::{AttrValue, Attributes, Design, Module, PortDirection, SigBit, SigSpec};
use std::collections::{HashMap, HashSet};
use std::io::Read;

/// Reads a JSON netlist.
///
/// Every netname becomes a wire and bits sharing a net number are joined by
/// module connections. Cell port directions come from `port_directions`,
/// then from the ports of an instantiated module of the same document, and
/// default to input.
pub fn import<R: Read>(mut reader: R, interner: &Interner) -> Result<Design, JsonError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let doc: JsonDesign = serde_json::from_str(&text)?;

    let mut port_dirs: HashMap<&str, HashMap<&str, JsonDirection>> = HashMap::new();
    for (name, module) in doc.modules.iter() {
        let dirs = module.ports.iter().map(|(p, port)| (p, port.direction)).collect();
        port_dirs.insert(name, dirs);
    }

    let mut design = Design::new();
    for (name, json) in doc.modules.iter() {
        if design.module_by_name(interner.get_or_intern(name)).is_some() {
            return Err(JsonError::Malformed(format!("duplicate module '{name}'")));
        }
        let id = design.add_module(interner.get_or_intern(name));
        let module = design.module_mut(id);
        ModuleReader {
            module,
            interner,
            nets: HashMap::new(),
            module_name: name,
        }
        .read(json, &port_dirs)?;
    }
    Ok(design)
}

fn attributes(map: &NamedMap<crate::format::JsonAttr>, interner: &Interner) -> Attributes {
    let mut attrs = Attributes::new();
    for (name, value) in map.iter() {
        attrs.set(interner.get_or_intern(name), AttrValue::from(value));
    }
    attrs
}

struct ModuleReader<'a> {
    module: &'a mut Module,
    interner: &'a Interner,
    nets: HashMap<u64, SigBit>,
    module_name: &'a str,
}

impl ModuleReader<'_> {
    fn malformed(&self, what: String) -> JsonError {
        JsonError::Malformed(format!("module '{}': {what}", self.module_name))
    }

    fn constant(&self, text: &str) -> Result<SigBit, JsonError> {
        let mut chars = text.chars();
        match (chars.next().and_then(Logic::from_char), chars.next()) {
            (Some(logic), None) => Ok(SigBit::Const(logic)),
            _ => Err(self.malformed(format!("unknown bit \"{text}\""))),
        }
    }

    /// Binds the bits of a named wire to their net numbers.
    fn bind_wire(&mut self, bits: &[JsonBit], wire: SigSpec) -> Result<(), JsonError> {
        for (json, bit) in bits.iter().zip(wire.iter()) {
            let other = match json {
                JsonBit::Net(n) => match self.nets.get(n) {
                    Some(&first) => first,
                    None => {
                        self.nets.insert(*n, bit);
                        continue;
                    }
                },
                JsonBit::Const(text) => self.constant(text)?,
            };
            self.module.connect(bit.into(), other.into());
        }
        Ok(())
    }

    fn resolve(&mut self, json: &JsonBit) -> Result<SigBit, JsonError> {
        match json {
            JsonBit::Const(text) => self.constant(text),
            JsonBit::Net(n) => {
                if let Some(&bit) = self.nets.get(n) {
                    return Ok(bit);
                }
                let name = self.module.fresh_name(self.interner);
                let wire = self.module.add_wire(name, 1);
                let bit = SigBit::wire(wire, 0);
                self.nets.insert(*n, bit);
                Ok(bit)
            }
        }
    }

    fn read(
        mut self,
        json: &JsonModule,
        port_dirs: &HashMap<&str, HashMap<&str, JsonDirection>>,
    ) -> Result<(), JsonError> {
        self.module.attributes = attributes(&json.attributes, self.interner);
        let netnames: HashMap<&str, &JsonNet> = json.netnames.iter().collect();
        let mut seen: HashSet<&str> = HashSet::new();

        for (name, port) in json.ports.iter() {
            if !seen.insert(name) {
                return Err(self.malformed(format!("duplicate port '{name}'")));
            }
            let ident = self.interner.get_or_intern(name);
            let width = port.bits.len() as u32;
            let wire = self.module.add_port(ident, width, port.direction.into());
            if let Some(net) = netnames.get(name) {
                if net.bits.len() != port.bits.len() {
                    return Err(self.malformed(format!("port '{name}' width differs from its net")));
                }
                self.module.wires[wire].attributes = attributes(&net.attributes, self.interner);
            }
            let sig = self.module.wires[wire].sig();
            self.bind_wire(&port.bits, sig)?;
        }

        let ports = seen.clone();
        for (name, net) in json.netnames.iter() {
            if ports.contains(name) {
                continue;
            }
            if !seen.insert(name) {
                return Err(self.malformed(format!("duplicate net '{name}'")));
            }
            let ident = self.interner.get_or_intern(name);
            let wire = self.module.add_wire(ident, net.bits.len() as u32);
            self.module.wires[wire].attributes = attributes(&net.attributes, self.interner);
            let sig = self.module.wires[wire].sig();
            self.bind_wire(&net.bits, sig)?;
        }

        for (name, json_cell) in json.cells.iter() {
            let cell = self.module.add_cell(
                self.interner.get_or_intern(name),
                self.interner.get_or_intern(&json_cell.cell_type),
            );
            self.module.cells[cell].parameters = attributes(&json_cell.parameters, self.interner);
            self.module.cells[cell].attributes = attributes(&json_cell.attributes, self.interner);
            for (port, bits) in json_cell.connections.iter() {
                let direction = json_cell
                    .port_directions
                    .get(port)
                    .copied()
                    .or_else(|| {
                        port_dirs
                            .get(json_cell.cell_type.as_str())
                            .and_then(|dirs| dirs.get(port).copied())
                    })
                    .map_or(PortDirection::Input, PortDirection::from);
                let signal = bits
                    .iter()
                    .map(|b| self.resolve(b))
                    .collect::<Result<SigSpec, _>>()?;
                self.module.set_cell_port(
                    cell,
                    self.interner.get_or_intern(port),
                    direction,
                    signal,
                );
            }
        }
        Ok(())
    }
}

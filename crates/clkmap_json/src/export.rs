use crate::error::JsonError;
use crate::format::{
    hide_name, JsonAttr, JsonBit, JsonCell, JsonDesign, JsonDirection, JsonModule, JsonNet, JsonPort,
    NamedMap,
};
use clkmap_common::Interner;
use clkmap_netlist::{Attributes, Design, Module, SigBit, SigMap, SigSpec};
use std::collections::HashMap;
use std::io::Write;

/// Writes a design as a JSON netlist.
pub fn export<W: Write>(writer: W, design: &Design, interner: &Interner) -> Result<(), JsonError> {
    let mut doc = JsonDesign {
        creator: Some(format!("clkmap {}", env!("CARGO_PKG_VERSION"))),
        modules: NamedMap::default(),
    };
    for (_, module) in design.modules_iter() {
        let name = interner.resolve(module.name).to_string();
        doc.modules.push(name, ModuleWriter::new(module).write(interner));
    }
    serde_json::to_writer_pretty(writer, &doc)?;
    Ok(())
}

fn attributes(attrs: &Attributes, interner: &Interner) -> NamedMap<JsonAttr> {
    NamedMap(
        attrs
            .iter()
            .map(|(name, value)| (interner.resolve(name).to_string(), JsonAttr::from(value)))
            .collect(),
    )
}

struct ModuleWriter<'a> {
    module: &'a Module,
    sigmap: SigMap,
    nets: HashMap<SigBit, u64>,
}

impl<'a> ModuleWriter<'a> {
    fn new(module: &'a Module) -> Self {
        Self {
            module,
            sigmap: SigMap::from_module(module),
            nets: HashMap::new(),
        }
    }

    /// Net numbers start at 2; 0 and 1 read like constants to some tools.
    fn bit(&mut self, bit: SigBit) -> JsonBit {
        match self.sigmap.map(bit) {
            SigBit::Const(logic) => JsonBit::Const(logic.to_char().to_string()),
            canonical => {
                let next = self.nets.len() as u64 + 2;
                JsonBit::Net(*self.nets.entry(canonical).or_insert(next))
            }
        }
    }

    fn bits(&mut self, spec: &SigSpec) -> Vec<JsonBit> {
        spec.iter().map(|b| self.bit(b)).collect()
    }

    fn write(mut self, interner: &Interner) -> JsonModule {
        let module = self.module;
        let mut json = JsonModule {
            attributes: attributes(&module.attributes, interner),
            ..JsonModule::default()
        };

        for &id in &module.ports {
            let wire = &module.wires[id];
            let Some(direction) = wire.direction() else {
                continue;
            };
            let bits = self.bits(&wire.sig());
            json.ports.push(
                interner.resolve(wire.name).to_string(),
                JsonPort {
                    direction: direction.into(),
                    bits,
                },
            );
        }

        for (_, cell) in module.cells.iter() {
            let name = interner.resolve(cell.name).to_string();
            let mut port_directions: NamedMap<JsonDirection> = NamedMap::default();
            let mut connections = NamedMap::default();
            for conn in &cell.connections {
                let port = interner.resolve(conn.port).to_string();
                port_directions.push(port.clone(), conn.direction.into());
                connections.push(port, self.bits(&conn.signal));
            }
            json.cells.push(
                name.clone(),
                JsonCell {
                    hide_name: hide_name(&name),
                    cell_type: interner.resolve(cell.cell_type).to_string(),
                    parameters: attributes(&cell.parameters, interner),
                    attributes: attributes(&cell.attributes, interner),
                    port_directions,
                    connections,
                },
            );
        }

        for (_, wire) in module.wires.iter() {
            let name = interner.resolve(wire.name).to_string();
            json.netnames.push(
                name.clone(),
                JsonNet {
                    hide_name: hide_name(&name),
                    bits: self.bits(&wire.sig()),
                    attributes: attributes(&wire.attributes, interner),
                },
            );
        }
        json
    }
}

//! Cells: instances of library types or of other modules in the design.

use crate::attr::Attributes;
use crate::ids::CellId;
use crate::sig::SigSpec;
use clkmap_common::Ident;
use serde::{Deserialize, Serialize};

/// The direction of data flow through a cell port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// The cell reads the connected signal.
    Input,
    /// The cell drives the connected signal.
    Output,
    /// Both.
    InOut,
}

impl PortDirection {
    /// Returns `true` if a cell port with this direction drives its signal.
    pub fn drives(self) -> bool {
        matches!(self, PortDirection::Output | PortDirection::InOut)
    }
}

/// A binding of one cell port to a signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// The port name on the cell type.
    pub port: Ident,
    /// The direction of the port.
    pub direction: PortDirection,
    /// The connected bits, LSB first.
    pub signal: SigSpec,
}

/// An instance of a cell type.
///
/// `cell_type` names either a module of the same design or an opaque
/// library primitive; the netlist does not distinguish the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// The ID of this cell within its module.
    pub id: CellId,
    /// The instance name.
    pub name: Ident,
    /// The instantiated type.
    pub cell_type: Ident,
    /// Type parameters.
    pub parameters: Attributes,
    /// Instance attributes.
    pub attributes: Attributes,
    /// Port bindings, in insertion order.
    pub connections: Vec<Connection>,
}

impl Cell {
    /// Returns the connection of the named port.
    pub fn connection(&self, port: Ident) -> Option<&Connection> {
        self.connections.iter().find(|c| c.port == port)
    }

    /// Returns the signal bound to the named port.
    pub fn port(&self, port: Ident) -> Option<&SigSpec> {
        self.connection(port).map(|c| &c.signal)
    }

    /// Returns the signal bound to the named port, mutably.
    pub fn port_mut(&mut self, port: Ident) -> Option<&mut SigSpec> {
        self.connections
            .iter_mut()
            .find(|c| c.port == port)
            .map(|c| &mut c.signal)
    }

    /// Binds a port, replacing any existing binding of the same name.
    pub fn set_port(&mut self, port: Ident, direction: PortDirection, signal: SigSpec) {
        match self.connections.iter_mut().find(|c| c.port == port) {
            Some(conn) => {
                conn.direction = direction;
                conn.signal = signal;
            }
            None => self.connections.push(Connection {
                port,
                direction,
                signal,
            }),
        }
    }
}

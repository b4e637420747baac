//! Wires: named bit vectors, optionally exposed as module ports.

use crate::attr::Attributes;
use crate::cell::PortDirection;
use crate::ids::WireId;
use crate::sig::{SigBit, SigSpec};
use clkmap_common::Ident;
use serde::{Deserialize, Serialize};

/// A named bit vector inside a module.
///
/// A wire is a port when `port_input` or `port_output` is set; `port_id`
/// gives its 1-based position in the module's port list (0 for non-ports).
/// Well-formed netlists never set both direction flags, but such wires are
/// representable so passes can detect and skip them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wire {
    /// The ID of this wire within its module.
    pub id: WireId,
    /// The wire name.
    pub name: Ident,
    /// Width in bits.
    pub width: u32,
    /// Whether the wire is driven from outside the module.
    pub port_input: bool,
    /// Whether the wire is visible outside the module as an output.
    pub port_output: bool,
    /// 1-based port position, 0 if not a port.
    pub port_id: u32,
    /// Attributes attached to the wire.
    pub attributes: Attributes,
}

impl Wire {
    /// Returns `true` if either port flag is set.
    pub fn is_port(&self) -> bool {
        self.port_input || self.port_output
    }

    /// The port direction, if this wire is a port.
    pub fn direction(&self) -> Option<PortDirection> {
        match (self.port_input, self.port_output) {
            (true, true) => Some(PortDirection::InOut),
            (true, false) => Some(PortDirection::Input),
            (false, true) => Some(PortDirection::Output),
            (false, false) => None,
        }
    }

    /// Bit `offset` of this wire.
    pub fn bit(&self, offset: u32) -> SigBit {
        SigBit::wire(self.id, offset)
    }

    /// Iterates over the bits of this wire, LSB first.
    pub fn bits(&self) -> impl Iterator<Item = SigBit> + '_ {
        (0..self.width).map(move |i| self.bit(i))
    }

    /// All bits of this wire.
    pub fn sig(&self) -> SigSpec {
        SigSpec::from_wire(self.id, self.width)
    }
}

//! Bit-level signal references.

use crate::ids::WireId;
use clkmap_common::Logic;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// One addressable netlist bit: a constant, or bit `offset` of a wire.
///
/// Constants order before wire bits, and wire bits order by
/// (wire identity, offset). [`SigMap`](crate::SigMap) relies on this order to
/// pick representatives.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum SigBit {
    /// A constant driver.
    Const(Logic),
    /// A bit of a wire.
    Wire {
        /// The wire.
        wire: WireId,
        /// Bit index within the wire, LSB first.
        offset: u32,
    },
}

impl SigBit {
    /// Bit `offset` of `wire`.
    pub fn wire(wire: WireId, offset: u32) -> Self {
        SigBit::Wire { wire, offset }
    }

    /// Returns `true` for constant bits.
    pub fn is_const(self) -> bool {
        matches!(self, SigBit::Const(_))
    }
}

/// An ordered vector of [`SigBit`]s, LSB first.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct SigSpec(Vec<SigBit>);

impl SigSpec {
    /// An empty signal.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// All bits of a wire of the given width.
    pub fn from_wire(wire: WireId, width: u32) -> Self {
        Self((0..width).map(|i| SigBit::wire(wire, i)).collect())
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the signal has no bits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the bit at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<SigBit> {
        self.0.get(index).copied()
    }

    /// Replaces the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set(&mut self, index: usize, bit: SigBit) {
        self.0[index] = bit;
    }

    /// Appends a bit.
    pub fn push(&mut self, bit: SigBit) {
        self.0.push(bit);
    }

    /// Returns the single bit of a one-bit signal.
    pub fn as_bit(&self) -> Option<SigBit> {
        match self.0.as_slice() {
            [bit] => Some(*bit),
            _ => None,
        }
    }

    /// The bits as a slice.
    pub fn bits(&self) -> &[SigBit] {
        &self.0
    }

    /// Iterates over the bits.
    pub fn iter(&self) -> impl Iterator<Item = SigBit> + '_ {
        self.0.iter().copied()
    }
}

impl From<SigBit> for SigSpec {
    fn from(bit: SigBit) -> Self {
        Self(vec![bit])
    }
}

impl From<Vec<SigBit>> for SigSpec {
    fn from(bits: Vec<SigBit>) -> Self {
        Self(bits)
    }
}

impl FromIterator<SigBit> for SigSpec {
    fn from_iter<T: IntoIterator<Item = SigBit>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Index<usize> for SigSpec {
    type Output = SigBit;

    fn index(&self, index: usize) -> &SigBit {
        &self.0[index]
    }
}

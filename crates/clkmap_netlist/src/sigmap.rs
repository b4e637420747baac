//! Canonicalization of electrically identical bits.

use crate::module::Module;
use crate::sig::SigBit;
use std::collections::HashMap;

/// A frozen union-find over the direct connections of one module.
///
/// Each class of connected bits is represented by its smallest member under
/// the [`SigBit`] order, so a constant always represents its class. The map
/// is built once and never observes later edits to the module.
#[derive(Debug, Clone, Default)]
pub struct SigMap {
    parent: HashMap<SigBit, SigBit>,
}

impl SigMap {
    /// Creates a map in which every bit is its own representative.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map from a module's connection list.
    pub fn from_module(module: &Module) -> Self {
        let mut map = Self::new();
        for (lhs, rhs) in &module.connections {
            for (a, b) in lhs.iter().zip(rhs.iter()) {
                map.add(a, b);
            }
        }
        map.flatten();
        map
    }

    fn root(&self, mut bit: SigBit) -> SigBit {
        while let Some(&next) = self.parent.get(&bit) {
            if next == bit {
                break;
            }
            bit = next;
        }
        bit
    }

    /// Merges the classes of `a` and `b`.
    pub fn add(&mut self, a: SigBit, b: SigBit) {
        let ra = self.root(a);
        let rb = self.root(b);
        if ra == rb {
            return;
        }
        let (keep, merge) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent.insert(merge, keep);
    }

    fn flatten(&mut self) {
        let keys: Vec<SigBit> = self.parent.keys().copied().collect();
        for key in keys {
            let root = self.root(key);
            self.parent.insert(key, root);
        }
    }

    /// Returns the representative of `bit`.
    pub fn map(&self, bit: SigBit) -> SigBit {
        self.root(bit)
    }
}

//! Top-level design container.

use crate::arena::Arena;
use crate::ids::ModuleId;
use crate::module::Module;
use clkmap_common::{Ident, Interner};
use serde::{Deserialize, Serialize};

/// A set of modules that may instantiate each other by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Design {
    /// All modules, keyed by [`ModuleId`].
    pub modules: Arena<ModuleId, Module>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty module and returns its ID.
    pub fn add_module(&mut self, name: Ident) -> ModuleId {
        let id = self.modules.next_id();
        self.modules.alloc(Module::new(id, name))
    }

    /// Looks up a module by name.
    pub fn module_by_name(&self, name: Ident) -> Option<ModuleId> {
        self.modules
            .iter()
            .find(|(_, m)| m.name == name)
            .map(|(id, _)| id)
    }

    /// Returns a module.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// Returns a module mutably.
    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id]
    }

    /// Iterates over all modules in insertion order.
    pub fn modules_iter(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules.iter()
    }

    /// Returns the first module marked as top, if any.
    pub fn top(&self, interner: &Interner) -> Option<ModuleId> {
        self.modules
            .iter()
            .find(|(_, m)| m.is_top(interner))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let interner = Interner::new();
        let mut design = Design::new();
        let a = design.add_module(interner.get_or_intern("a"));
        let b = design.add_module(interner.get_or_intern("b"));
        assert_eq!(design.module_by_name(interner.get_or_intern("b")), Some(b));
        assert_eq!(design.module(a).id, a);
        assert_eq!(design.modules_iter().count(), 2);
        assert!(design.module_by_name(interner.get_or_intern("c")).is_none());
    }

    #[test]
    fn top_lookup() {
        let interner = Interner::new();
        let mut design = Design::new();
        design.add_module(interner.get_or_intern("leaf"));
        assert!(design.top(&interner).is_none());
        let top = design.add_module(interner.get_or_intern("top"));
        design.module_mut(top).set_top(&interner);
        assert_eq!(design.top(&interner), Some(top));
    }
}

use std::collections::BTreeMap;

use crate::Module;

/// A collection of modules, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Design {
    modules: BTreeMap<String, Module>,
}

impl Design {
    pub fn new() -> Self {
        Design { modules: BTreeMap::new() }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Adds a module.  Panics if a module with the same name already exists.
    pub fn add_module(&mut self, module: Module) {
        let name = module.name().to_owned();
        assert!(!self.modules.contains_key(&name), "module {name:?} already exists");
        self.modules.insert(name, module);
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.get_mut(name)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> + '_ {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

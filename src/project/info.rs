use std::path::Path;

use crate::{
    metadata::typesystem::{TypeDefinition, TypeRegistry},
    module::ModuleDescriptor,
};

/// How far a selected module has come through [`crate::project::Project::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadState {
    /// Registered with the project
    Registered,
    /// References to other selected modules are linked
    Linked,
    /// Type lookup is available
    Initialized,
}

/// A selected module together with its links inside the project.
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    descriptor: ModuleDescriptor,
    references: Vec<String>,
    referenced_by: Vec<String>,
    registry: TypeRegistry,
    state: LoadState,
}

impl ModuleInfo {
    pub(crate) fn new(descriptor: ModuleDescriptor) -> Self {
        ModuleInfo {
            descriptor,
            references: Vec::new(),
            referenced_by: Vec::new(),
            registry: TypeRegistry::default(),
            state: LoadState::Registered,
        }
    }

    /// The declared module name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// The file the module was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.descriptor.path()
    }

    /// The module as read from disk.
    #[must_use]
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// Selected modules this module references.
    #[must_use]
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Selected modules referencing this module, the module itself included.
    #[must_use]
    pub fn referenced_by(&self) -> &[String] {
        &self.referenced_by
    }

    /// Returns `true` if the module contains native code.
    #[must_use]
    pub fn is_mixed_mode(&self) -> bool {
        self.descriptor.is_mixed_mode()
    }

    /// Current load state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Type lookup, empty before initialization.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The declared type called `full_name`.
    #[must_use]
    pub fn get_type(&self, full_name: &str) -> Option<&TypeDefinition> {
        self.registry.get_by_fullname(full_name)
    }

    pub(crate) fn add_reference(&mut self, name: &str) {
        if !self.references.iter().any(|known| known == name) {
            self.references.push(name.to_string());
        }
        self.state = self.state.max(LoadState::Linked);
    }

    pub(crate) fn add_referenced_by(&mut self, name: &str) {
        if !self.referenced_by.iter().any(|known| known == name) {
            self.referenced_by.push(name.to_string());
        }
        self.state = self.state.max(LoadState::Linked);
    }

    pub(crate) fn init(&mut self) {
        self.registry = TypeRegistry::new(self.descriptor.types().to_vec());
        self.state = LoadState::Initialized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::typesystem::{TypeAttributes, TypeKey};

    #[test]
    fn lifecycle() {
        let descriptor = ModuleDescriptor::new("B.dll", "B", ["A"], false).with_types(vec![
            TypeDefinition {
                key: TypeKey::new("B", "Ns", "Thing"),
                flags: TypeAttributes::PUBLIC,
                base: None,
            },
        ]);
        let mut info = ModuleInfo::new(descriptor);
        assert_eq!(info.state(), LoadState::Registered);
        assert!(info.get_type("Ns.Thing").is_none());

        info.add_referenced_by("B");
        info.add_referenced_by("B");
        info.add_reference("A");
        assert_eq!(info.referenced_by(), ["B"]);
        assert_eq!(info.references(), ["A"]);
        assert_eq!(info.state(), LoadState::Linked);

        info.init();
        assert_eq!(info.state(), LoadState::Initialized);
        assert_eq!(info.types().len(), 1);
        assert!(info.get_type("Ns.Thing").is_some());

        info.add_reference("C");
        assert_eq!(info.state(), LoadState::Initialized);
    }
}

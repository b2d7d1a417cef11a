//! Base and derived types across the selected modules.

use std::collections::{HashMap, HashSet};

use crate::{
    metadata::typesystem::{TypeKey, TypeReference},
    project::Project,
};

/// Inheritance relations of every type declared by a selected module.
///
/// Base types are resolved through the project, so a base declared by another selected
/// module maps to that module's definition. A base outside the project is kept as written.
#[derive(Debug, Clone, Default)]
pub struct InheritMap {
    bases: HashMap<TypeKey, TypeKey>,
    derived: HashMap<TypeKey, Vec<TypeKey>>,
}

impl InheritMap {
    pub(crate) fn build(project: &Project) -> Self {
        let mut map = InheritMap::default();
        for module in project.modules() {
            for definition in module.types().iter() {
                let Some(base) = &definition.base else {
                    continue;
                };

                let reference = TypeReference::External(base.clone());
                let base = project
                    .resolve_type_definition(&reference)
                    .map_or_else(|| base.clone(), |resolved| resolved.key.clone());

                map.derived
                    .entry(base.clone())
                    .or_default()
                    .push(definition.key.clone());
                map.bases.insert(definition.key.clone(), base);
            }
        }

        map
    }

    /// The direct base of `key`.
    #[must_use]
    pub fn base_of(&self, key: &TypeKey) -> Option<&TypeKey> {
        self.bases.get(key)
    }

    /// Types directly deriving from `key`, in the order their modules were added to the
    /// project.
    #[must_use]
    pub fn derived_of(&self, key: &TypeKey) -> &[TypeKey] {
        self.derived.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bases of `key`, nearest first.
    ///
    /// The walk ends at the first type without a known base or at the first type seen twice.
    #[must_use]
    pub fn ancestors(&self, key: &TypeKey) -> Vec<&TypeKey> {
        let mut seen = HashSet::from([key]);
        let mut ancestors = Vec::new();
        let mut current = key;

        while let Some(base) = self.bases.get(current) {
            if !seen.insert(base) {
                break;
            }
            ancestors.push(base);
            current = base;
        }

        ancestors
    }

    /// Number of types with a base.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Returns `true` if no type has a base.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> TypeKey {
        TypeKey::new("M", "Ns", name)
    }

    #[test]
    fn ancestors_stop_on_cycle() {
        let mut map = InheritMap::default();
        map.bases.insert(key("A"), key("B"));
        map.bases.insert(key("B"), key("C"));
        map.bases.insert(key("C"), key("A"));

        assert_eq!(map.ancestors(&key("A")), [&key("B"), &key("C")]);
        assert!(map.ancestors(&key("Z")).is_empty());
        assert!(map.derived_of(&key("A")).is_empty());
        assert_eq!(map.len(), 3);
    }
}

use std::collections::HashMap;

use crate::metadata::typesystem::TypeDefinition;

/// The declared types of one module, addressable by full name.
///
/// Declaration order is kept. When two definitions share a full name the first one wins.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: Vec<TypeDefinition>,
    by_fullname: HashMap<String, usize>,
}

impl TypeRegistry {
    /// Builds the lookup over `types`.
    #[must_use]
    pub fn new(types: Vec<TypeDefinition>) -> Self {
        let mut by_fullname = HashMap::with_capacity(types.len());
        for (position, definition) in types.iter().enumerate() {
            by_fullname
                .entry(definition.key.full_name())
                .or_insert(position);
        }

        TypeRegistry { types, by_fullname }
    }

    /// The definition called `fullname` (`Namespace.Name`).
    #[must_use]
    pub fn get_by_fullname(&self, fullname: &str) -> Option<&TypeDefinition> {
        self.by_fullname
            .get(fullname)
            .and_then(|position| self.types.get(*position))
    }

    /// All definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.iter()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if the module declares no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

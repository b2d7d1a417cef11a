//! Modules as the project graph sees them.
//!
//! A [`ModuleDescriptor`] is produced once per file by a [`ModuleReader`] and is read-only
//! afterwards. The graph layers only look at its name, the names it references and whether
//! it contains native code; the declared types are carried along for type resolution.

mod reader;

use std::path::{Path, PathBuf};

pub use reader::{is_binary_file, CilModuleReader, ModuleReader, ReadOutcome};

use crate::metadata::typesystem::TypeDefinition;

/// A module read from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    path: PathBuf,
    name: String,
    references: Vec<String>,
    mixed_mode: bool,
    types: Vec<TypeDefinition>,
}

impl ModuleDescriptor {
    /// Creates a descriptor without declared types.
    ///
    /// Repeated reference names are kept once, in first-seen order.
    pub fn new<I, S>(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        references: I,
        mixed_mode: bool,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for reference in references {
            let reference = reference.into();
            if !unique.contains(&reference) {
                unique.push(reference);
            }
        }

        ModuleDescriptor {
            path: path.into(),
            name: name.into(),
            references: unique,
            mixed_mode,
            types: Vec::new(),
        }
    }

    /// Attaches the declared types.
    #[must_use]
    pub fn with_types(mut self, types: Vec<TypeDefinition>) -> Self {
        self.types = types;
        self
    }

    /// The file the module was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The declared name, unique within a project.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the referenced modules.
    #[must_use]
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Returns `true` if the module references `name`.
    #[must_use]
    pub fn references_name(&self, name: &str) -> bool {
        self.references.iter().any(|reference| reference == name)
    }

    /// Returns `true` if the module contains native code besides managed code.
    #[must_use]
    pub fn is_mixed_mode(&self) -> bool {
        self.mixed_mode
    }

    /// Declared types in declaration order.
    #[must_use]
    pub fn types(&self) -> &[TypeDefinition] {
        &self.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_are_unique() {
        let descriptor = ModuleDescriptor::new("bin/C.dll", "C", ["A", "B", "A"], false);

        assert_eq!(descriptor.name(), "C");
        assert_eq!(descriptor.path(), Path::new("bin/C.dll"));
        assert_eq!(descriptor.references(), ["A", "B"]);
        assert!(descriptor.references_name("B"));
        assert!(!descriptor.references_name("C"));
        assert!(!descriptor.is_mixed_mode());
        assert!(descriptor.types().is_empty());
    }
}

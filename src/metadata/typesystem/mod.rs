//! Type identities of the modules in a project.
//!
//! Types are identified by the module that declares them (the scope) and their namespace
//! qualified name. Nested types carry their enclosing types in the name, separated by `/`,
//! and share the namespace of the outermost type.
//!
//! # Key Components
//!
//! - [`TypeKey`] - Scope, namespace and name of a type
//! - [`TypeDefinition`] - A type declared by a module, with its base type
//! - [`TypeReference`] - Either a concrete definition or a key naming a type elsewhere
//! - [`TypeRegistry`] - Full-name lookup over the types of one module
//! - [`TypeResolver`] - Builds the definitions from the raw metadata tables

mod registry;
mod resolver;

use std::fmt;

use bitflags::bitflags;

pub use registry::TypeRegistry;
pub use resolver::TypeResolver;

bitflags! {
    /// The subset of `TypeAttributes` (ECMA-335 II.23.1.15) the type model looks at.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeAttributes: u32 {
        /// Visibility mask
        const VISIBILITY_MASK = 0x0000_0007;
        /// Public top-level type
        const PUBLIC = 0x0000_0001;
        /// The type is an interface
        const INTERFACE = 0x0000_0020;
        /// The type is abstract
        const ABSTRACT = 0x0000_0080;
        /// The type cannot be derived from
        const SEALED = 0x0000_0100;
    }
}

/// Identity of a type across the modules of a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    /// Name of the module that declares the type
    pub scope: String,
    /// Namespace, empty for the global namespace and for nested types' own part
    pub namespace: String,
    /// Type name, `Outer/Inner` for nested types
    pub name: String,
}

impl TypeKey {
    /// Creates a new key.
    pub fn new(
        scope: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        TypeKey {
            scope: scope.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// `Namespace.Name`, or just `Name` in the global namespace.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.scope, self.full_name())
    }
}

/// A type declared by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    /// Identity of the type
    pub key: TypeKey,
    /// `TypeAttributes` of the declaration
    pub flags: TypeAttributes,
    /// The base type, `None` for interfaces, `System.Object` and generic instantiations
    pub base: Option<TypeKey>,
}

impl TypeDefinition {
    /// Returns `true` if the type is an interface.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags.contains(TypeAttributes::INTERFACE)
    }
}

/// A reference to a type as it appears to a consumer of the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeReference {
    /// The reference already denotes a concrete definition
    Definition(TypeDefinition),
    /// The type is only known by its key
    External(TypeKey),
}

impl TypeReference {
    /// The key of the referenced type.
    #[must_use]
    pub fn key(&self) -> &TypeKey {
        match self {
            TypeReference::Definition(definition) => &definition.key,
            TypeReference::External(key) => key,
        }
    }

    /// Name of the module the referenced type lives in.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.key().scope
    }
}

impl From<TypeKey> for TypeReference {
    fn from(key: TypeKey) -> Self {
        TypeReference::External(key)
    }
}

use std::collections::HashMap;

use crate::{
    module::ModuleDescriptor,
    utils::graph::NodeId,
    Error::{IndexOutOfRange, UnknownName},
    Result,
};

/// Bidirectional mapping between module names and dense [`NodeId`]s.
///
/// Built once from a fixed set of names and immutable afterwards. Names receive ids in the
/// order they are first observed, so building twice from the same sequence yields the same
/// ids.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    ids: HashMap<String, NodeId>,
    names: Vec<String>,
}

impl NameIndex {
    /// Builds the index over `names`, ignoring repeats.
    pub fn build<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = NameIndex::default();
        for name in names {
            let name = name.as_ref();
            if !index.ids.contains_key(name) {
                index.ids.insert(name.to_string(), NodeId(index.names.len()));
                index.names.push(name.to_string());
            }
        }

        index
    }

    /// Builds the index over every declared and every referenced name of `modules`.
    ///
    /// Each module contributes its own name first, then its references.
    pub fn for_modules<'m>(modules: impl IntoIterator<Item = &'m ModuleDescriptor>) -> Self {
        Self::build(modules.into_iter().flat_map(|module| {
            std::iter::once(module.name()).chain(module.references().iter().map(String::as_str))
        }))
    }

    /// The id of `name`.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownName`] if `name` was not part of the build.
    pub fn id_of(&self, name: &str) -> Result<NodeId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| UnknownName(name.to_string()))
    }

    /// The name behind `id`.
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if `id` is not below [`NameIndex::len`].
    pub fn name_of(&self, id: NodeId) -> Result<&str> {
        self.names
            .get(id.index())
            .map(String::as_str)
            .ok_or(IndexOutOfRange {
                index: id.index(),
                count: self.names.len(),
            })
    }

    /// Returns `true` if `name` was part of the build.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the index holds no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All names in id order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

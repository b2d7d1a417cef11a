//! Dense vertex identifiers.

use std::fmt;

/// Identifier of a vertex in a [`NameIndex`](crate::utils::graph::NameIndex) and the graphs
/// built over it.
///
/// Ids are dense: an index over `n` names hands out exactly `0..n`, so per-vertex data lives in
/// plain vectors indexed by [`NodeId::index`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Wraps a raw index. Only meaningful for an index with more than `index` names.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    /// The raw index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<NodeId> for usize {
    #[inline]
    fn from(node: NodeId) -> Self {
        node.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_index() {
        let mut nodes = vec![NodeId::new(3), NodeId::new(1), NodeId::new(2)];
        nodes.sort();

        assert_eq!(nodes, vec![NodeId::new(1), NodeId::new(2), NodeId::new(3)]);
        assert_eq!(usize::from(nodes[2]), 3);
    }

    #[test]
    fn formatting() {
        assert_eq!(format!("{}", NodeId::new(7)), "n7");
        assert_eq!(format!("{:?}", NodeId::new(7)), "NodeId(7)");
    }
}

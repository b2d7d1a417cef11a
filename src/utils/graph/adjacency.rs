use std::collections::{BTreeSet, VecDeque};

use crate::{
    module::ModuleDescriptor,
    utils::graph::{NameIndex, NodeId},
    Result,
};

/// Reference graph over the ids of a [`NameIndex`].
///
/// An edge `A -> B` means "A references B". The root set holds every vertex no edge points
/// at. It is computed whenever a graph is built or reversed and never edited afterwards.
///
/// Successor sets and the root set are ordered by id, which makes traversals reproducible.
#[derive(Debug, Clone)]
pub struct AdjacencyGraph<'i> {
    index: &'i NameIndex,
    edges: Vec<BTreeSet<NodeId>>,
    roots: BTreeSet<NodeId>,
}

impl<'i> AdjacencyGraph<'i> {
    /// Adds an edge from every module to each name it references.
    ///
    /// Referenced names need not belong to one of `vertices`; a module only known as a
    /// dependency is still a valid edge target.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownName`] if a module or reference name is missing from
    /// `index`.
    pub fn build<'m>(
        vertices: impl IntoIterator<Item = &'m ModuleDescriptor>,
        index: &'i NameIndex,
    ) -> Result<Self> {
        let mut edges = vec![BTreeSet::new(); index.len()];
        let mut roots: BTreeSet<NodeId> = (0..index.len()).map(NodeId).collect();

        for vertex in vertices {
            let from = index.id_of(vertex.name())?;
            for reference in vertex.references() {
                let to = index.id_of(reference)?;
                edges[from.index()].insert(to);
                roots.remove(&to);
            }
        }

        Ok(AdjacencyGraph {
            index,
            edges,
            roots,
        })
    }

    /// The same graph with every edge flipped.
    ///
    /// The roots of the result are the vertices without outgoing edges here.
    #[must_use]
    pub fn reverse(&self) -> AdjacencyGraph<'i> {
        let mut edges = vec![BTreeSet::new(); self.edges.len()];
        let mut roots = BTreeSet::new();

        for (from, targets) in self.edges.iter().enumerate() {
            if targets.is_empty() {
                roots.insert(NodeId(from));
            }
            for to in targets {
                edges[to.index()].insert(NodeId(from));
            }
        }

        AdjacencyGraph {
            index: self.index,
            edges,
            roots,
        }
    }

    /// Breadth-first traversal calling `visitor(from, to)` for every edge it crosses.
    ///
    /// The queue starts with all roots in ascending id order. Vertices still unvisited once it
    /// drains, those only reachable through a cycle, are then used as further starting points
    /// in ascending id order. Each vertex is expanded once; the visitor sees an edge before
    /// its target is enqueued.
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] if the graph and its index disagree.
    pub fn breadth_first_visit<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&str, &str),
    {
        let mut visited = vec![false; self.edges.len()];
        let mut queue: VecDeque<NodeId> = self.roots.iter().copied().collect();

        let mut next_start = 0;
        loop {
            while let Some(vertex) = queue.pop_front() {
                if visited[vertex.index()] {
                    continue;
                }
                visited[vertex.index()] = true;

                let from = self.index.name_of(vertex)?;
                for child in &self.edges[vertex.index()] {
                    visitor(from, self.index.name_of(*child)?);
                    if !visited[child.index()] {
                        queue.push_back(*child);
                    }
                }
            }

            while next_start < visited.len() && visited[next_start] {
                next_start += 1;
            }
            if next_start == visited.len() {
                return Ok(());
            }
            queue.push_back(NodeId(next_start));
        }
    }

    /// The index the graph is built over.
    #[must_use]
    pub fn index(&self) -> &'i NameIndex {
        self.index
    }

    /// Number of vertices, equal to the size of the index.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(BTreeSet::len).sum()
    }

    /// Vertices without incoming edges, ascending.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.iter().copied()
    }

    /// Returns `true` if no edge points at `node`.
    #[must_use]
    pub fn is_root(&self, node: NodeId) -> bool {
        self.roots.contains(&node)
    }

    /// Targets of the edges leaving `node`, ascending.
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .get(node.index())
            .into_iter()
            .flat_map(|targets| targets.iter().copied())
    }

    /// Returns `true` if the edge `from -> to` exists.
    #[must_use]
    pub fn contains_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edges
            .get(from.index())
            .is_some_and(|targets| targets.contains(&to))
    }

    /// All edges as `(from, to)`, ordered by `from` then `to`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().enumerate().flat_map(|(from, targets)| {
            targets.iter().map(move |to| (NodeId(from), *to))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn module(name: &str, references: &[&str]) -> ModuleDescriptor {
        ModuleDescriptor::new(format!("{name}.dll"), name, references.iter().copied(), false)
    }

    fn visit(graph: &AdjacencyGraph<'_>) -> Vec<(String, String)> {
        let mut edges = Vec::new();
        graph
            .breadth_first_visit(|from, to| edges.push((from.to_string(), to.to_string())))
            .unwrap();
        edges
    }

    #[test]
    fn build_and_roots() {
        let modules = [
            module("C", &["A", "B"]),
            module("B", &["A"]),
            module("A", &["mscorlib"]),
        ];
        let index = NameIndex::for_modules(&modules);
        let graph = AdjacencyGraph::build(&modules, &index).unwrap();

        let c = index.id_of("C").unwrap();
        let a = index.id_of("A").unwrap();
        let corlib = index.id_of("mscorlib").unwrap();

        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.contains_edge(c, a));
        assert!(!graph.contains_edge(a, c));
        assert_eq!(graph.roots().collect::<Vec<_>>(), vec![c]);
        assert_eq!(graph.successors(a).collect::<Vec<_>>(), vec![corlib]);
        assert!(graph.is_root(c));
        assert!(!graph.is_root(corlib));
    }

    #[test]
    fn reverse_flips_edges() {
        let modules = [module("B", &["A"]), module("C", &["A"])];
        let index = NameIndex::for_modules(&modules);
        let graph = AdjacencyGraph::build(&modules, &index).unwrap();
        let reversed = graph.reverse();

        let a = index.id_of("A").unwrap();
        let b = index.id_of("B").unwrap();
        let c = index.id_of("C").unwrap();

        assert!(reversed.contains_edge(a, b));
        assert!(reversed.contains_edge(a, c));
        assert_eq!(reversed.edge_count(), 2);
        assert_eq!(reversed.roots().collect::<Vec<_>>(), vec![a]);

        let twice = reversed.reverse();
        assert_eq!(
            twice.edges().collect::<Vec<_>>(),
            graph.edges().collect::<Vec<_>>()
        );
    }

    #[test]
    fn breadth_first_from_roots() {
        let modules = [
            module("A", &[]),
            module("B", &["A"]),
            module("C", &["B"]),
            module("D", &["A"]),
        ];
        let index = NameIndex::for_modules(&modules);
        let reversed = AdjacencyGraph::build(&modules, &index).unwrap().reverse();

        assert_eq!(
            visit(&reversed),
            vec![
                ("A".to_string(), "B".to_string()),
                ("A".to_string(), "D".to_string()),
                ("B".to_string(), "C".to_string()),
            ]
        );
    }

    #[test]
    fn cycles_without_roots_are_visited() {
        let modules = [module("A", &["B"]), module("B", &["A"])];
        let index = NameIndex::for_modules(&modules);
        let graph = AdjacencyGraph::build(&modules, &index).unwrap();

        assert_eq!(graph.roots().count(), 0);
        assert_eq!(
            visit(&graph),
            vec![
                ("A".to_string(), "B".to_string()),
                ("B".to_string(), "A".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_reference() {
        let modules = [module("A", &["B"])];
        let index = NameIndex::build(["A"]);

        assert!(matches!(
            AdjacencyGraph::build(&modules, &index),
            Err(Error::UnknownName(name)) if name == "B"
        ));
    }
}

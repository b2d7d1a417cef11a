//! Name-indexed reference graphs.
//!
//! Module names are mapped once to dense [`NodeId`]s by a [`NameIndex`]; the
//! [`AdjacencyGraph`] stores ids only and goes back to names through its index when a
//! traversal reports an edge.
//!
//! # Examples
//!
//! ```rust
//! use dotgraph::module::ModuleDescriptor;
//! use dotgraph::utils::graph::{AdjacencyGraph, NameIndex};
//!
//! let modules = [
//!     ModuleDescriptor::new("A.dll", "A", Vec::<String>::new(), false),
//!     ModuleDescriptor::new("B.dll", "B", ["A"], false),
//! ];
//! let index = NameIndex::for_modules(&modules);
//! let reversed = AdjacencyGraph::build(&modules, &index)?.reverse();
//!
//! let mut edges = Vec::new();
//! reversed.breadth_first_visit(|from, to| edges.push(format!("{from} <- {to}")))?;
//! assert_eq!(edges, ["A <- B"]);
//! # Ok::<(), dotgraph::Error>(())
//! ```

mod adjacency;
mod index;
mod node;

pub use adjacency::AdjacencyGraph;
pub use index::NameIndex;
pub use node::NodeId;

//! Processing order of the selected modules.
//!
//! Each selected module becomes a node in an arena. A node waits on the selected modules it
//! references (its parents) and releases the modules that reference it (its children). The
//! resolver emits, in rounds, every node that waits on nothing, in the order the modules were
//! added, and then releases their children. A round that cannot emit anything means the
//! remaining nodes wait on a cycle. The first module of a cycle that waits on nothing outside
//! itself is released regardless and the break is reported. Modules that only depend on a
//! cycle keep following it.

use std::collections::{BTreeSet, HashMap};

use log::warn;

use crate::{Error::UnknownName, Result};

/// A node emitted before the selected modules it references, to break a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleBreak {
    /// The module that was released
    pub module: String,
    /// The modules it still waited on, in the order they were added
    pub waiting_on: Vec<String>,
    /// Every module of the broken cycle, in the order they were added
    pub cycle: Vec<String>,
}

/// The result of one ordering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderReport {
    /// Every added module exactly once, referenced modules before referencing ones
    pub order: Vec<String>,
    /// Cycles broken to complete the order, in the order they were hit
    pub cycle_breaks: Vec<CycleBreak>,
}

impl OrderReport {
    /// Returns `true` if no cycle had to be broken.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.cycle_breaks.is_empty()
    }

    /// Position of `name` in the order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|emitted| emitted == name)
    }
}

#[derive(Debug)]
struct DependencyNode {
    name: String,
    parents: BTreeSet<usize>,
    children: BTreeSet<usize>,
}

/// Arena of dependency nodes for one ordering pass.
#[derive(Debug, Default)]
pub struct DependencyResolver {
    nodes: Vec<DependencyNode>,
    ids: HashMap<String, usize>,
}

impl DependencyResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module. Adding a known name again has no effect.
    pub fn add_module(&mut self, name: &str) {
        if self.ids.contains_key(name) {
            return;
        }

        self.ids.insert(name.to_string(), self.nodes.len());
        self.nodes.push(DependencyNode {
            name: name.to_string(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        });
    }

    /// Records that `from` references `to`, so `to` is emitted first.
    ///
    /// A module referencing itself is ignored.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownName`] if either module was not added.
    pub fn add_reference(&mut self, from: &str, to: &str) -> Result<()> {
        let from = self.id_of(from)?;
        let to = self.id_of(to)?;
        if from == to {
            return Ok(());
        }

        self.nodes[from].parents.insert(to);
        self.nodes[to].children.insert(from);
        Ok(())
    }

    /// Number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no module was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consumes the arena and produces the order.
    #[must_use]
    pub fn resolve(mut self) -> OrderReport {
        let mut report = OrderReport::default();
        let mut pool: Vec<usize> = (0..self.nodes.len()).collect();
        let mut emitted = vec![false; self.nodes.len()];

        while !pool.is_empty() {
            let mut ready: Vec<usize> = pool
                .iter()
                .copied()
                .filter(|id| self.nodes[*id].parents.is_empty())
                .collect();

            if ready.is_empty() {
                let cycle = self.blocking_cycle(pool[0]);
                let released = cycle.first().copied().unwrap_or(pool[0]);
                let waiting_on: Vec<String> = self.nodes[released]
                    .parents
                    .iter()
                    .map(|parent| self.nodes[*parent].name.clone())
                    .collect();

                warn!(
                    "Dependency cycle between {}: processing '{}' first",
                    cycle
                        .iter()
                        .map(|id| format!("'{}'", self.nodes[*id].name))
                        .collect::<Vec<_>>()
                        .join(", "),
                    self.nodes[released].name
                );

                report.cycle_breaks.push(CycleBreak {
                    module: self.nodes[released].name.clone(),
                    waiting_on,
                    cycle: cycle
                        .iter()
                        .map(|id| self.nodes[*id].name.clone())
                        .collect(),
                });
                ready.push(released);
            }

            for id in &ready {
                if !emitted[*id] {
                    emitted[*id] = true;
                    report.order.push(self.nodes[*id].name.clone());
                }
            }

            pool.retain(|id| !ready.contains(id));
            for id in ready {
                let children = std::mem::take(&mut self.nodes[id].children);
                for child in children {
                    self.nodes[child].parents.remove(&id);
                }
            }
        }

        report
    }

    /// A cycle among the remaining nodes that waits on nothing outside itself, reachable
    /// from `start` through parent links. Ids are ascending.
    ///
    /// Every remaining node has a parent, so following parents from `start` always ends in
    /// such a cycle. It is the first strongly connected component Tarjan's walk completes.
    fn blocking_cycle(&self, start: usize) -> Vec<usize> {
        let mut state = TarjanState::new(self.nodes.len());
        state.strongconnect(&self.nodes, start);

        let mut cycle = state.first.unwrap_or_default();
        cycle.sort_unstable();
        cycle
    }

    fn id_of(&self, name: &str) -> Result<usize> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| UnknownName(name.to_string()))
    }
}

/// Tarjan's algorithm over parent links, stopping at the first completed component.
struct TarjanState {
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    current_index: usize,
    first: Option<Vec<usize>>,
}

impl TarjanState {
    fn new(n: usize) -> Self {
        Self {
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            current_index: 0,
            first: None,
        }
    }

    fn strongconnect(&mut self, nodes: &[DependencyNode], v: usize) {
        self.index[v] = Some(self.current_index);
        self.lowlink[v] = self.current_index;
        self.current_index += 1;
        self.stack.push(v);
        self.on_stack[v] = true;

        for &w in &nodes[v].parents {
            if self.first.is_some() {
                return;
            }
            match self.index[w] {
                None => {
                    self.strongconnect(nodes, w);
                    self.lowlink[v] = self.lowlink[v].min(self.lowlink[w]);
                }
                Some(w_index) if self.on_stack[w] => {
                    self.lowlink[v] = self.lowlink[v].min(w_index);
                }
                Some(_) => {}
            }
        }

        if self.first.is_none() && self.index[v] == Some(self.lowlink[v]) {
            let mut component = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            self.first = Some(component);
        }
    }
}

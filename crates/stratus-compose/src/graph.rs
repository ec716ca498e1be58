//! Dependency graph management using `petgraph`.
//!
//! Builds a directed graph from the references between resources
//! and resolves a topological ordering for synthesis.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};
use std::fmt;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use stratus_common::error::{Result, StratusError};

/// A resource qualified by the unit that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    /// Owning unit.
    pub unit: String,
    /// Resource identifier within the unit.
    pub identifier: String,
}

impl NodeKey {
    /// Creates a key for `identifier` in `unit`.
    #[must_use]
    pub fn new(unit: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.unit, self.identifier)
    }
}

/// A dependency graph of resources.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Internal petgraph representation.
    graph: DiGraph<NodeKey, ()>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
        }
    }

    /// Adds a resource node to the graph.
    ///
    /// Node indices follow insertion order, which is also the tie-break order
    /// of [`DependencyGraph::resolve_order`].
    pub fn add_resource(&mut self, key: NodeKey) -> NodeIndex {
        self.graph.add_node(key)
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    ///
    /// The graph edge points from `dependency` to `dependent`
    /// so that topological sort yields dependencies first.
    /// Repeated edges are collapsed.
    pub fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.update_edge(dependency, dependent, ());
    }

    /// Number of resources in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns a topological ordering of resources for synthesis.
    ///
    /// Dependencies appear before the resources that depend on them. Among
    /// resources whose dependencies are all satisfied, the one added first
    /// comes first, so the same input always yields the same order.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::CyclicDependency`] naming every resource that
    /// sits on a cycle.
    pub fn resolve_order(&self) -> Result<Vec<NodeKey>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(i)) = ready.pop() {
            let idx = NodeIndex::new(i);
            order.push(self.graph[idx].clone());
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                let deg = &mut in_degree[next.index()];
                *deg -= 1;
                if *deg == 0 {
                    ready.push(Reverse(next.index()));
                }
            }
        }

        if order.len() == self.graph.node_count() {
            Ok(order)
        } else {
            Err(self.cycle_error())
        }
    }

    fn cycle_error(&self) -> StratusError {
        let mut members: BTreeSet<&NodeKey> = BTreeSet::new();
        for component in petgraph::algo::tarjan_scc(&self.graph) {
            let on_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&idx| self.graph.contains_edge(idx, idx));
            if on_cycle {
                members.extend(component.iter().map(|&idx| &self.graph[idx]));
            }
        }

        let units: BTreeSet<&str> = members.iter().map(|k| k.unit.as_str()).collect();
        let identifiers: Vec<String> = members.iter().map(ToString::to_string).collect();
        tracing::warn!(?identifiers, "cyclic dependency detected");
        StratusError::CyclicDependency {
            units: units.into_iter().map(str::to_owned).collect(),
            identifiers,
        }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

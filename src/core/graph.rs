//! Dependency graph for blueprint ordering.
//!
//! The graph represents blueprint dependencies as a petgraph DiGraph whose
//! edges run prerequisite -> dependent. Cycle detection uses a DFS with an
//! explicit recursion stack so the offending node can be named; execution
//! ordering uses Kahn's algorithm with a deterministic tie-break.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::blueprint::validate_id;
use crate::error::{Error, Result};

/// Type of dependency between two blueprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// The dependent cannot start until the prerequisite completes.
    Blocking,
    /// Ordering preference only.
    Soft,
    /// The blueprints contend for a shared resource.
    Resource,
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DependencyKind::Blocking => write!(f, "blocking"),
            DependencyKind::Soft => write!(f, "soft"),
            DependencyKind::Resource => write!(f, "resource"),
        }
    }
}

/// A directed dependency edge: `dependent_task_id` requires
/// `prerequisite_task_id` to complete first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    /// The blueprint that waits.
    pub dependent_task_id: String,
    /// The blueprint that must complete first.
    pub prerequisite_task_id: String,
    /// What kind of dependency this is.
    pub kind: DependencyKind,
    /// Whether the dependency lies on the critical path.
    pub is_critical: bool,
}

impl TaskDependency {
    /// Create a validated dependency edge.
    ///
    /// # Errors
    /// Returns `Error::Validation` for malformed ids or a self-loop.
    pub fn new(
        dependent_task_id: impl Into<String>,
        prerequisite_task_id: impl Into<String>,
        kind: DependencyKind,
        is_critical: bool,
    ) -> Result<Self> {
        let dependent_task_id = dependent_task_id.into();
        let prerequisite_task_id = prerequisite_task_id.into();

        validate_id("dependent_task_id", &dependent_task_id)?;
        validate_id("prerequisite_task_id", &prerequisite_task_id)?;
        if dependent_task_id == prerequisite_task_id {
            return Err(Error::validation(
                "dependent_task_id",
                &dependent_task_id,
                "must not depend on itself",
            ));
        }

        Ok(Self {
            dependent_task_id,
            prerequisite_task_id,
            kind,
            is_critical,
        })
    }

    /// Convenience constructor for a blocking, non-critical edge.
    pub fn blocking(
        dependent_task_id: impl Into<String>,
        prerequisite_task_id: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            dependent_task_id,
            prerequisite_task_id,
            DependencyKind::Blocking,
            false,
        )
    }
}

/// Edge metadata stored in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EdgeMeta {
    kind: DependencyKind,
    is_critical: bool,
}

/// The blueprint dependency graph.
///
/// Nodes are blueprint ids, edges run prerequisite -> dependent with
/// dependency metadata. Duplicate (dependent, prerequisite) pairs are
/// deduplicated; self-loops are rejected at edge construction.
pub struct DependencyGraph {
    /// The underlying directed graph.
    graph: DiGraph<String, EdgeMeta>,
    /// Index mapping from blueprint id to NodeIndex for fast lookups.
    node_index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Build a graph from an edge set and validate it.
    ///
    /// # Errors
    /// Returns `Error::CircularDependency` naming a node on the cycle.
    pub fn from_edges(edges: &[TaskDependency]) -> Result<Self> {
        let mut graph = Self::new();
        for edge in edges {
            graph.insert_unchecked(edge);
        }
        graph.validate()?;
        Ok(graph)
    }

    /// Register a blueprint node, returning its index.
    ///
    /// Adding an id that already exists returns the existing index.
    pub fn add_blueprint(&mut self, id: &str) -> NodeIndex {
        if let Some(&index) = self.node_index.get(id) {
            return index;
        }
        let index = self.graph.add_node(id.to_string());
        self.node_index.insert(id.to_string(), index);
        index
    }

    /// Add a dependency edge, re-validating the whole edge set.
    ///
    /// The edge is inserted, the entire graph is checked for cycles, and on
    /// a cycle the edge is rolled back so the graph is left unchanged.
    ///
    /// # Errors
    /// Returns `Error::CircularDependency` naming the node where the cycle
    /// was detected; the rejected edge is not retained.
    pub fn add_dependency(&mut self, dependency: &TaskDependency) -> Result<()> {
        let pre = self.add_blueprint(&dependency.prerequisite_task_id);
        let dep = self.add_blueprint(&dependency.dependent_task_id);

        // Duplicate edges are deduplicated by (dependent, prerequisite).
        if self.graph.find_edge(pre, dep).is_some() {
            return Ok(());
        }

        let edge = self.graph.add_edge(
            pre,
            dep,
            EdgeMeta {
                kind: dependency.kind,
                is_critical: dependency.is_critical,
            },
        );

        if let Err(err) = self.validate() {
            self.graph.remove_edge(edge);
            return Err(err);
        }

        Ok(())
    }

    /// Remove a blueprint and all of its dependency edges.
    ///
    /// Returns true if the blueprint was present.
    pub fn remove_blueprint(&mut self, id: &str) -> bool {
        let Some(index) = self.node_index.remove(id) else {
            return false;
        };
        self.graph.remove_node(index);
        // remove_node swaps the last node into the vacated slot, so the
        // id -> index map must be rebuilt.
        self.node_index = self
            .graph
            .node_indices()
            .map(|i| (self.graph[i].clone(), i))
            .collect();
        true
    }

    /// Validate the full edge set for cycles.
    ///
    /// Runs a DFS with a visited set and an explicit recursion stack; a
    /// back-edge into the stack is a cycle.
    ///
    /// # Errors
    /// Returns `Error::CircularDependency` naming the node where the DFS
    /// re-entered its recursion stack.
    pub fn validate(&self) -> Result<()> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut rec_stack: HashSet<NodeIndex> = HashSet::new();

        for start in self.graph.node_indices() {
            if visited.contains(&start) {
                continue;
            }
            if let Some(node) = self.dfs_cycle(start, &mut visited, &mut rec_stack) {
                return Err(Error::CircularDependency {
                    node: self.graph[node].clone(),
                });
            }
        }
        Ok(())
    }

    fn dfs_cycle(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        rec_stack: &mut HashSet<NodeIndex>,
    ) -> Option<NodeIndex> {
        visited.insert(node);
        rec_stack.insert(node);

        for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
            if rec_stack.contains(&next) {
                return Some(next);
            }
            if !visited.contains(&next) {
                if let Some(found) = self.dfs_cycle(next, visited, rec_stack) {
                    return Some(found);
                }
            }
        }

        rec_stack.remove(&node);
        None
    }

    /// Resolve a topological execution order via Kahn's algorithm.
    ///
    /// Nodes with in-degree zero (prerequisites and isolated nodes) seed the
    /// queue in insertion order, which is the documented deterministic
    /// tie-break; every prerequisite appears before its dependents.
    ///
    /// # Errors
    /// Returns `Error::CircularDependency` if not every node can be ordered
    /// (cannot happen after a successful `validate`).
    pub fn execution_order(&self) -> Result<Vec<String>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|i| {
                (
                    i,
                    self.graph.neighbors_directed(i, Direction::Incoming).count(),
                )
            })
            .collect();

        // Seed with all in-degree-zero nodes, in insertion order.
        let mut queue: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|i| in_degree[i] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(node) = queue.pop_front() {
            order.push(self.graph[node].clone());
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(next);
                    }
                }
            }
        }

        if order.len() != self.graph.node_count() {
            let node = self
                .graph
                .node_indices()
                .find(|i| !order.contains(&self.graph[*i]))
                .map(|i| self.graph[i].clone())
                .unwrap_or_default();
            return Err(Error::CircularDependency { node });
        }

        Ok(order)
    }

    /// Check whether a dependency edge exists.
    pub fn has_dependency(&self, dependent: &str, prerequisite: &str) -> bool {
        match (
            self.node_index.get(prerequisite),
            self.node_index.get(dependent),
        ) {
            (Some(&pre), Some(&dep)) => self.graph.find_edge(pre, dep).is_some(),
            _ => false,
        }
    }

    /// Get the prerequisite ids of a blueprint.
    pub fn prerequisites_of(&self, id: &str) -> Vec<String> {
        self.node_index
            .get(id)
            .map(|&index| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .map(|i| self.graph[i].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the dependent ids of a blueprint.
    pub fn dependents_of(&self, id: &str) -> Vec<String> {
        self.node_index
            .get(id)
            .map(|&index| {
                self.graph
                    .neighbors_directed(index, Direction::Outgoing)
                    .map(|i| self.graph[i].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check if a blueprint node is present.
    pub fn contains(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Number of blueprint nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    fn insert_unchecked(&mut self, dependency: &TaskDependency) {
        let pre = self.add_blueprint(&dependency.prerequisite_task_id);
        let dep = self.add_blueprint(&dependency.dependent_task_id);
        if self.graph.find_edge(pre, dep).is_none() {
            self.graph.add_edge(
                pre,
                dep,
                EdgeMeta {
                    kind: dependency.kind,
                    is_critical: dependency.is_critical,
                },
            );
        }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("blueprints", &self.node_count())
            .field("dependencies", &self.edge_count())
            .finish()
    }
}

/// Validate a full edge set for acyclicity.
///
/// # Errors
/// Returns `Error::CircularDependency` naming a node on the cycle.
pub fn validate_edges(edges: &[TaskDependency]) -> Result<()> {
    DependencyGraph::from_edges(edges).map(|_| ())
}

/// Resolve the execution order implied by an edge set.
///
/// # Errors
/// Returns `Error::CircularDependency` when the edge set has a cycle.
pub fn execution_order(edges: &[TaskDependency]) -> Result<Vec<String>> {
    DependencyGraph::from_edges(edges)?.execution_order()
}

//! Index arena over a [`FunctionSet`].
//!
//! Node `i` for `i < declared_count()` is the i-th function in key order.
//! Targets that name no function in the set are appended after the declared
//! nodes as leaves, so traversal never needs a map lookup.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::model::FunctionSet;

/// Adjacency-list view of the `"function"`-edge subgraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
    declared: usize,
}

impl FunctionGraph {
    /// Build the arena. Adjacency lists keep dependency-list order.
    #[must_use]
    pub fn build(functions: &FunctionSet) -> Self {
        let mut graph = Self {
            names: Vec::with_capacity(functions.len()),
            index: HashMap::with_capacity(functions.len()),
            adjacency: Vec::with_capacity(functions.len()),
            declared: functions.len(),
        };

        for name in functions.names() {
            graph.add_node(name);
        }

        for (pos, (_, function)) in functions.iter().enumerate() {
            let targets: Vec<usize> = function
                .function_targets()
                .map(|target| graph.add_node(target))
                .collect();
            graph.adjacency[pos] = targets;
        }

        graph
    }

    fn add_node(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Declared functions plus undeclared targets.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Functions present in the source set.
    #[must_use]
    pub fn declared_count(&self) -> usize {
        self.declared
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Outgoing edges of `idx`, in dependency-list order.
    #[must_use]
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.adjacency[idx]
    }

    /// Targets referenced by some edge that are not functions of the set.
    pub fn undeclared(&self) -> impl Iterator<Item = &str> {
        self.names[self.declared..].iter().map(String::as_str)
    }

    /// Copy into a petgraph `DiGraph` (node weights are function names).
    /// Node indices match arena indices.
    #[must_use]
    pub fn to_digraph(&self) -> DiGraph<String, ()> {
        let mut graph = DiGraph::<String, ()>::with_capacity(self.node_count(), self.edge_count());
        for name in &self.names {
            graph.add_node(name.clone());
        }
        for (from, targets) in self.adjacency.iter().enumerate() {
            for &to in targets {
                graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dependency, Function};

    fn set(edges: &[(&str, &[&str])]) -> FunctionSet {
        edges
            .iter()
            .map(|(name, targets)| {
                let deps = targets
                    .iter()
                    .map(|t| Dependency::function(*t, "Name"))
                    .collect();
                (*name, Function::with_dependencies(deps))
            })
            .collect()
    }

    #[test]
    fn nodes_follow_key_order() {
        let graph = FunctionGraph::build(&set(&[("b", &[]), ("a", &["b"]), ("c", &[])]));
        assert_eq!(graph.declared_count(), 3);
        assert_eq!(graph.name(0), "b");
        assert_eq!(graph.name(1), "a");
        assert_eq!(graph.index_of("c"), Some(2));
        assert_eq!(graph.neighbors(1), &[0]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn undeclared_targets_become_leaves() {
        let graph = FunctionGraph::build(&set(&[("a", &["ghost", "b"]), ("b", &[])]));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.declared_count(), 2);
        assert_eq!(graph.undeclared().collect::<Vec<_>>(), vec!["ghost"]);
        let ghost = graph.index_of("ghost").expect("ghost node");
        assert!(graph.neighbors(ghost).is_empty());
        assert_eq!(graph.neighbors(0), &[ghost, 1]);
    }

    #[test]
    fn non_function_dependencies_are_ignored() {
        let mut f = Function::default();
        f.push_dependency(Dependency {
            attributes: vec!["Arn".into()],
            category: "storage".into(),
            resource_name: "bucket".into(),
            extra: serde_json::Map::new(),
        });
        let functions: FunctionSet = [("a", f)].into_iter().collect();
        let graph = FunctionGraph::build(&functions);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn digraph_mirrors_arena() {
        let graph = FunctionGraph::build(&set(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]));
        let dg = graph.to_digraph();
        assert_eq!(dg.node_count(), 3);
        assert_eq!(dg.edge_count(), 2);
        assert!(dg.contains_edge(NodeIndex::new(0), NodeIndex::new(1)));
        assert_eq!(dg[NodeIndex::new(2)], "c");
    }
}

//! Cycle detection for the function dependency graph.
//!
//! # Overview
//!
//! A cycle among `"function"` dependencies makes a deployment impossible:
//! each function waits on another in the loop. Synthesized graphs are
//! validated with [`find_cycle`] before they are handed back.
//!
//! # Design
//!
//! - **Three-color DFS**: `unvisited`, `in-progress` (on the current path),
//!   `done`. Roots are tried in key order, neighbors in dependency-list order,
//!   so the reported cycle is deterministic.
//! - **Iterative**: an explicit frame stack plus two `FixedBitSet`s
//!   (`visited`, `on_stack`) sized to the node count. Deep chains cannot
//!   overflow the call stack.
//! - **First cycle only**: [`find_cycle`] returns as soon as a back edge is
//!   seen. [`find_all_cycles`] is the diagnostic view (petgraph Tarjan SCC).
//! - **O(V+E)**: each node and edge is visited at most once.

#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::missing_const_for_fn
)]

use std::fmt;

use fixedbitset::FixedBitSet;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use super::arena::FunctionGraph;

// ---------------------------------------------------------------------------
// CyclePath
// ---------------------------------------------------------------------------

/// An ordered list of function names forming a cycle.
///
/// The path starts at the DFS root and ends at the repeated node. For
/// `X → Y → X` discovered from root `X`, the path is `["X", "Y", "X"]`. When
/// the root lies outside the loop, the path keeps the lead-in:
/// `["A", "X", "Y", "X"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CyclePath(Vec<String>);

impl CyclePath {
    #[must_use]
    pub fn new(path: Vec<String>) -> Self {
        Self(path)
    }

    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_nodes(self) -> Vec<String> {
        self.0
    }

    /// The node that closes the loop (last element).
    #[must_use]
    pub fn repeated(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The loop itself, from the first occurrence of the repeated node.
    #[must_use]
    pub fn cycle(&self) -> &[String] {
        let Some(last) = self.0.last() else {
            return &[];
        };
        let start = self.0.iter().position(|n| n == last).unwrap_or(0);
        &self.0[start..]
    }

    /// Number of distinct functions in the loop.
    #[must_use]
    pub fn cycle_len(&self) -> usize {
        self.cycle().len().saturating_sub(1)
    }

    /// Returns `true` if a function depends on itself.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.cycle_len() == 1
    }
}

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" -> "))?;
        if self.is_self_loop() {
            write!(f, " (function depends on itself)")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Core detection
// ---------------------------------------------------------------------------

/// Find the first cycle in key order, or `None` if the graph is acyclic.
///
/// Never fails; the caller decides whether a cycle is fatal.
///
/// # Complexity
///
/// O(V+E).
#[must_use]
pub fn find_cycle(graph: &FunctionGraph) -> Option<CyclePath> {
    let mut dfs = Dfs::new(graph.node_count());
    for root in 0..graph.declared_count() {
        if dfs.is_visited(root) {
            continue;
        }
        if let Some(indices) = dfs.run_from(graph, root, |_| {}) {
            let path = indices
                .into_iter()
                .map(|idx| graph.name(idx).to_string())
                .collect();
            return Some(CyclePath::new(path));
        }
    }
    None
}

/// Returns `true` if [`find_cycle`] would report a cycle.
#[must_use]
pub fn has_cycle(graph: &FunctionGraph) -> bool {
    find_cycle(graph).is_some()
}

/// Find every cycle group in the graph.
///
/// Each entry is a sorted list of function names in one strongly connected
/// component. Self-loops are reported as a one-element group. Groups are
/// sorted.
#[must_use]
pub fn find_all_cycles(graph: &FunctionGraph) -> Vec<Vec<String>> {
    let dg = graph.to_digraph();
    let mut groups: Vec<Vec<String>> = tarjan_scc(&dg)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || component.first().is_some_and(|node| has_self_loop(&dg, *node))
        })
        .map(|component| {
            let mut names: Vec<String> = component.into_iter().map(|idx| dg[idx].clone()).collect();
            names.sort_unstable();
            names
        })
        .collect();

    groups.sort_unstable();
    groups
}

fn has_self_loop(graph: &DiGraph<String, ()>, node: NodeIndex) -> bool {
    graph.find_edge(node, node).is_some()
}

// ---------------------------------------------------------------------------
// DFS internals
// ---------------------------------------------------------------------------

/// Reusable three-color DFS state.
///
/// `visited` without `on_stack` is `done`; both set is `in-progress`.
pub(crate) struct Dfs {
    visited: FixedBitSet,
    on_stack: FixedBitSet,
    frames: Vec<(usize, usize)>,
}

impl Dfs {
    pub(crate) fn new(node_count: usize) -> Self {
        Self {
            visited: FixedBitSet::with_capacity(node_count),
            on_stack: FixedBitSet::with_capacity(node_count),
            frames: Vec::new(),
        }
    }

    pub(crate) fn is_visited(&self, idx: usize) -> bool {
        self.visited.contains(idx)
    }

    /// Traverse from `root`. `on_enter` receives the path depth each time a
    /// node turns in-progress (the root has depth 1).
    ///
    /// Returns the node indices `root … current, neighbor` as soon as an
    /// in-progress neighbor is reached; `None` once the traversal completes.
    pub(crate) fn run_from(
        &mut self,
        graph: &FunctionGraph,
        root: usize,
        mut on_enter: impl FnMut(usize),
    ) -> Option<Vec<usize>> {
        self.frames.clear();
        self.enter(root);
        on_enter(self.frames.len());

        while let Some(frame) = self.frames.last_mut() {
            let (node, cursor) = *frame;
            let Some(&next) = graph.neighbors(node).get(cursor) else {
                self.on_stack.set(node, false);
                self.frames.pop();
                continue;
            };
            frame.1 += 1;

            if self.on_stack.contains(next) {
                let mut path: Vec<usize> = self.frames.iter().map(|(n, _)| *n).collect();
                path.push(next);
                self.unwind();
                return Some(path);
            }
            if !self.visited.contains(next) {
                self.enter(next);
                on_enter(self.frames.len());
            }
        }
        None
    }

    fn enter(&mut self, node: usize) {
        self.visited.insert(node);
        self.on_stack.insert(node);
        self.frames.push((node, 0));
    }

    fn unwind(&mut self) {
        for (node, _) in self.frames.drain(..) {
            self.on_stack.set(node, false);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! First and last function of a synthesized chain, for reporting.
//!
//! `first` is the first function in key order with no dependencies of any
//! kind: nothing has to be deployed before it.
//!
//! `last` reuses the cycle detector's three-color traversal. If a traversal
//! reaches an in-progress node, that node is reported. Otherwise it is the
//! root of the longest traversal path (first one wins on ties), which on a
//! simple chain is the function nothing depends on. This is a property of
//! iteration order, not a longest-path computation, and is only meaningful
//! for graphs that are plain chains.

use serde::Serialize;

use super::arena::FunctionGraph;
use super::cycles::Dfs;
use crate::model::FunctionSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEndpoints {
    pub first: String,
    pub last: String,
}

/// Returns `None` when every function has at least one dependency.
#[must_use]
pub fn find_endpoints(functions: &FunctionSet) -> Option<ChainEndpoints> {
    let first = functions
        .iter()
        .find(|(_, f)| f.has_no_dependencies())
        .map(|(name, _)| name.to_string())?;

    let graph = FunctionGraph::build(functions);
    let last = last_in_chain(&graph)?;

    Some(ChainEndpoints { first, last })
}

fn last_in_chain(graph: &FunctionGraph) -> Option<String> {
    let mut dfs = Dfs::new(graph.node_count());
    let mut best: Option<(usize, usize)> = None;

    for root in 0..graph.declared_count() {
        if dfs.is_visited(root) {
            continue;
        }
        let mut depth = 0;
        if let Some(path) = dfs.run_from(graph, root, |d| depth = depth.max(d)) {
            return path.last().map(|&idx| graph.name(idx).to_string());
        }
        if best.is_none_or(|(longest, _)| depth > longest) {
            best = Some((depth, root));
        }
    }

    best.map(|(_, root)| graph.name(root).to_string())
}

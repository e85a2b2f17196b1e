//! Chain synthesizer.
//!
//! # Overview
//!
//! Deployment engines build independent functions in parallel. To force
//! them to deploy one after another, this module injects synthetic
//! `"function"` dependencies between dependency-free functions until the
//! requested share of all functions sits in a dependency chain.
//!
//! ## Selection
//!
//! Dependency-free functions are visited in key order. Each one receives an
//! edge to the first dependency-free function that is neither itself nor
//! already used as a target, which links them into a single chain
//! `f1 → f2 → f3 → …`. Selection stops once the used set reaches the number
//! of functions still missing from the target share.
//!
//! The source of the very first edge also enters the used set, so it is never
//! picked as a target later ([`SourceMarking::FirstEdgeOnly`]). Sources of
//! later edges are left out of the used set.
//! [`SourceMarking::EverySource`] marks every source instead.
//!
//! ## Validation
//!
//! The edges are applied to a copy of the input set and the copy is checked
//! with [`find_cycle`]. On a cycle the copy is dropped and
//! [`ChainError::CycleDetected`] is returned; the caller's set is never
//! touched.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ErrorCode;
use crate::graph::{ChainEndpoints, CyclePath, FunctionGraph, find_cycle, find_endpoints};
use crate::metrics::SerializationMetrics;
use crate::model::{Dependency, FunctionSet};
use crate::percent::Percentage;

/// Attribute attached to synthetic edges when none is configured.
pub const DEFAULT_ATTRIBUTE: &str = "Name";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which sources enter the used set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMarking {
    /// Only the source of the first edge of the pass.
    #[default]
    FirstEdgeOnly,
    /// The source of every edge.
    EverySource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOptions {
    pub percentage: Percentage,
    /// Attribute name recorded on each synthetic edge.
    pub attribute: String,
    pub marking: SourceMarking,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            percentage: Percentage::FULL,
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            marking: SourceMarking::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntheticEdge {
    pub source: String,
    pub target: String,
}

/// Outcome of a successful pass.
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// The input set with synthetic edges applied.
    pub functions: FunctionSet,
    /// Added edges, in the order they were added.
    pub edges: Vec<SyntheticEdge>,
    pub metrics: SerializationMetrics,
    pub endpoints: Option<ChainEndpoints>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The function graph has a cycle; nothing may be persisted.
    #[error("circular dependency detected among functions: {path}")]
    CycleDetected { path: CyclePath },
}

impl ChainError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Add synthetic edges to a copy of `functions` and validate the result.
///
/// Falling short of the target because too few dependency-free functions
/// remain is not an error; the pass adds what it can.
///
/// # Errors
///
/// Returns [`ChainError::CycleDetected`] if the resulting graph has a cycle.
#[instrument(skip_all, fields(functions = functions.len(), target = %options.percentage))]
pub fn synthesize(
    functions: &FunctionSet,
    options: &SynthesisOptions,
) -> Result<Synthesis, ChainError> {
    let free = functions.dependency_free();
    let metrics = SerializationMetrics::classify(functions.len(), free.len(), options.percentage);

    info!(
        total = metrics.total_functions,
        dependency_free = metrics.dependency_free,
        current = metrics.current_percentage,
        target = metrics.target_percentage,
        to_serialize = metrics.to_serialize,
        "classified functions"
    );

    let edges = select_edges(&free, metrics.to_serialize, options.marking);

    let mut updated = functions.clone();
    for edge in &edges {
        if let Some(function) = updated.get_mut(&edge.source) {
            function.push_dependency(Dependency::function(&edge.target, &options.attribute));
            debug!(source = %edge.source, target = %edge.target, "added synthetic edge");
        }
    }

    if let Some(path) = find_cycle(&FunctionGraph::build(&updated)) {
        error!(%path, "circular dependency detected");
        return Err(ChainError::CycleDetected { path });
    }

    let metrics = metrics.with_result(&updated);
    if !metrics.target_reached() {
        warn!(
            reached = metrics.final_percentage,
            target = metrics.target_percentage,
            "not enough dependency-free functions to reach target"
        );
    }

    let endpoints = find_endpoints(&updated);
    info!(
        edges = edges.len(),
        serialized = metrics.final_percentage,
        "synthesis complete"
    );

    Ok(Synthesis {
        functions: updated,
        edges,
        metrics,
        endpoints,
    })
}

/// Pick synthetic edges among `free` (dependency-free names in key order).
///
/// Pure selection; no graph is touched. Returns nothing when `to_serialize`
/// is zero or negative.
#[must_use]
pub fn select_edges(free: &[&str], to_serialize: i64, marking: SourceMarking) -> Vec<SyntheticEdge> {
    let mut edges = Vec::new();
    let Ok(limit) = usize::try_from(to_serialize) else {
        return edges;
    };
    if limit == 0 {
        return edges;
    }

    let mut used: HashSet<&str> = HashSet::new();
    let mut pool: Vec<&str> = free.to_vec();

    for &source in free {
        let Some(&target) = pool
            .iter()
            .find(|&&candidate| candidate != source && !used.contains(candidate))
        else {
            continue;
        };

        edges.push(SyntheticEdge {
            source: source.to_string(),
            target: target.to_string(),
        });

        let mark_source = match marking {
            SourceMarking::FirstEdgeOnly => used.is_empty(),
            SourceMarking::EverySource => true,
        };
        if mark_source {
            used.insert(source);
        }

        if used.len() >= limit {
            break;
        }

        used.insert(target);
        pool.retain(|&candidate| candidate != target);
    }

    edges
}

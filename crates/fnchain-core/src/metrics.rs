//! Serialization metrics: how many functions sit in a dependency chain now,
//! how many should, and how many do after synthesis. Observability only.

#![allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]

use serde::Serialize;

use crate::model::FunctionSet;
use crate::percent::Percentage;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerializationMetrics {
    pub total_functions: usize,
    /// Functions without a `"function"` dependency before synthesis.
    pub dependency_free: usize,
    pub current_percentage: f64,
    pub target_percentage: u8,
    /// Additional functions needed to reach the target. Zero or negative
    /// means the target is already met.
    pub to_serialize: i64,
    /// Functions with a `"function"` dependency after synthesis.
    pub final_dependent: usize,
    pub final_percentage: f64,
}

impl SerializationMetrics {
    /// Metrics from the classification step, before any edge is added.
    #[must_use]
    pub fn classify(total: usize, dependency_free: usize, target: Percentage) -> Self {
        let dependent = total - dependency_free;
        Self {
            total_functions: total,
            dependency_free,
            current_percentage: percentage(dependent, total),
            target_percentage: target.get(),
            to_serialize: to_serialize(total, dependency_free, target),
            final_dependent: dependent,
            final_percentage: percentage(dependent, total),
        }
    }

    /// Record the outcome of synthesis.
    #[must_use]
    pub fn with_result(mut self, updated: &FunctionSet) -> Self {
        self.final_dependent = updated.dependent_count();
        self.final_percentage = percentage(self.final_dependent, self.total_functions);
        self
    }

    /// Returns `true` if the synthesized graph reached the target share.
    #[must_use]
    pub fn target_reached(&self) -> bool {
        let already = (self.total_functions - self.dependency_free) as i64;
        self.final_dependent as i64 >= already + self.to_serialize
    }
}

/// `ceil(total * target / 100) - (total - dependency_free)`.
#[must_use]
pub fn to_serialize(total: usize, dependency_free: usize, target: Percentage) -> i64 {
    let wanted = target.share_of(total) as i64;
    let already = (total - dependency_free) as i64;
    wanted - already
}

/// `part / total * 100`, or 0 for an empty set.
#[must_use]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

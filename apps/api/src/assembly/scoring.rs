//! Scoring policy — how per-constraint satisfactions combine into one objective.
//!
//! The policy is a priority-weighted linear sum: `Σ priority_i × satisfaction_i`.
//! It treats constraints as independent and linearly substitutable. Evaluators know
//! nothing about it, so a different combination (lexicographic, Pareto) only has to
//! replace `weighted_total`.

use std::collections::BTreeMap;

use crate::assembly::evaluator::evaluate;
use crate::models::constraint::{Constraint, ConstraintKind};
use crate::models::item::Item;

/// A constraint counts as satisfied at or above this satisfaction.
pub const SATISFACTION_THRESHOLD: f64 = 0.8;

/// Returns the constraints ordered by descending priority. Ties keep input order.
pub fn order_by_priority(constraints: &[Constraint]) -> Vec<Constraint> {
    let mut ordered = constraints.to_vec();
    ordered.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ordered
}

/// Weighted total of every constraint's satisfaction for `selection`.
pub fn weighted_total(selection: &[&Item], constraints: &[Constraint]) -> f64 {
    constraints
        .iter()
        .map(|c| c.priority * evaluate(selection, &c.rule))
        .sum()
}

/// Per-kind satisfaction of a finished selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SatisfactionReport {
    pub satisfied: BTreeMap<ConstraintKind, bool>,
    pub scores: BTreeMap<ConstraintKind, f64>,
}

/// Re-evaluates each constraint once. A kind shared by several constraints keeps the
/// minimum satisfaction, so it is satisfied only when all of them pass.
pub fn satisfaction_report(selection: &[&Item], constraints: &[Constraint]) -> SatisfactionReport {
    let mut scores: BTreeMap<ConstraintKind, f64> = BTreeMap::new();

    for constraint in constraints {
        let score = evaluate(selection, &constraint.rule);
        scores
            .entry(constraint.kind())
            .and_modify(|s| *s = s.min(score))
            .or_insert(score);
    }

    let satisfied = scores
        .iter()
        .map(|(kind, score)| (*kind, *score >= SATISFACTION_THRESHOLD))
        .collect();

    SatisfactionReport { satisfied, scores }
}

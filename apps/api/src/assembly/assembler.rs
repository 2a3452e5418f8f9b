//! Assembler — turns a strategy's raw selection into an `AssemblyResult`.
//!
//! Flow: strategy.select → metrics aggregation → one final re-evaluation of every
//! constraint (thresholded at 0.8). Never fails: a pool smaller than the target size
//! yields a shorter selection, and unmet constraints are flagged, not rejected.

use tracing::{info, warn};

use crate::assembly::scoring::satisfaction_report;
use crate::assembly::strategy::{GreedyStrategy, SelectionStrategy};
use crate::models::assembly::{AssemblyMetrics, AssemblyResult};
use crate::models::constraint::Constraint;
use crate::models::item::Item;

/// Assembles one form with the default greedy strategy.
pub fn assemble_test(pool: &[Item], constraints: &[Constraint], target_size: usize) -> AssemblyResult {
    assemble_with(&GreedyStrategy, pool, constraints, target_size)
}

/// Assembles one form with an arbitrary selection strategy.
pub fn assemble_with(
    strategy: &dyn SelectionStrategy,
    pool: &[Item],
    constraints: &[Constraint],
    target_size: usize,
) -> AssemblyResult {
    let selection = strategy.select(pool, constraints, target_size);

    let selected_refs: Vec<&Item> = selection.items.iter().collect();
    let report = satisfaction_report(&selected_refs, constraints);
    let metrics = AssemblyMetrics::from_items(&selection.items);

    if selection.items.len() < target_size {
        warn!(
            requested = target_size,
            selected = selection.items.len(),
            pool_size = pool.len(),
            "Undersized selection: pool exhausted before target size"
        );
    }

    let unmet: Vec<&str> = report
        .satisfied
        .iter()
        .filter(|(_, ok)| !**ok)
        .map(|(kind, _)| kind.as_str())
        .collect();
    if !unmet.is_empty() {
        warn!("Constraint shortfall (< 0.8): {}", unmet.join(", "));
    }

    info!(
        strategy = strategy.name(),
        selected = selection.items.len(),
        score = selection.score,
        "Assembly complete"
    );

    AssemblyResult {
        selected_items: selection.items,
        score: selection.score,
        score_trace: selection.score_trace,
        constraints_satisfied: report.satisfied,
        satisfaction: report.scores,
        metrics,
    }
}

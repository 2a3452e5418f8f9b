//! Parallel-Form Generator — N non-overlapping forms from one shared pool.
//!
//! Form generation is sequential: each form is assembled from the pool minus the
//! ids used by earlier forms. That exclusion state is an explicit `UsedIds`
//! accumulator threaded through `assemble_next_form`, never hidden mutable state.
//! Pairwise equivalence is diagnostic only; low equivalence never triggers a retry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assembly::assembler::assemble_with;
use crate::assembly::strategy::{GreedyStrategy, SelectionStrategy};
use crate::models::assembly::AssemblyResult;
use crate::models::constraint::Constraint;
use crate::models::item::{CognitiveLevel, Difficulty, Item};

/// Ids already placed on a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsedIds(BTreeSet<String>);

impl UsedIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy extended with every id selected on `form`.
    pub fn with_form(&self, form: &AssemblyResult) -> Self {
        let mut next = self.clone();
        next.0.extend(form.item_ids().map(str::to_string));
        next
    }
}

/// Sub-scores and combined equivalence for two forms, each in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquivalenceScore {
    pub difficulty_similarity: f64,
    pub cognitive_similarity: f64,
    pub time_similarity: f64,
    /// Unweighted mean of the three sub-scores.
    pub overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormEquivalence {
    pub form_a: usize,
    pub form_b: usize,
    #[serde(flatten)]
    pub score: EquivalenceScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelForms {
    pub requested_forms: usize,
    pub forms: Vec<AssemblyResult>,
    pub equivalence: Vec<FormEquivalence>,
    pub used_ids: UsedIds,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// Assembles the next form from the pool minus `used`.
///
/// Returns `None` when fewer than `target_size` unused items remain; an undersized
/// form is never produced here. On success, also returns the extended accumulator.
pub fn assemble_next_form(
    strategy: &dyn SelectionStrategy,
    pool: &[Item],
    constraints: &[Constraint],
    target_size: usize,
    used: &UsedIds,
) -> Option<(AssemblyResult, UsedIds)> {
    let remaining: Vec<Item> = pool
        .iter()
        .filter(|item| !used.contains(&item.id))
        .cloned()
        .collect();

    if remaining.len() < target_size {
        return None;
    }

    let form = assemble_with(strategy, &remaining, constraints, target_size);
    let next = used.with_form(&form);
    Some((form, next))
}

/// Generates up to `number_of_forms` disjoint forms with the greedy strategy.
pub fn generate_parallel_forms(
    pool: &[Item],
    constraints: &[Constraint],
    target_size: usize,
    number_of_forms: usize,
) -> ParallelForms {
    generate_parallel_forms_with(&GreedyStrategy, pool, constraints, target_size, number_of_forms)
}

/// Generates up to `number_of_forms` disjoint forms, then scores every pair.
///
/// Stops early when the unused pool can no longer fill a full form; callers compare
/// `forms.len()` against `requested_forms`.
pub fn generate_parallel_forms_with(
    strategy: &dyn SelectionStrategy,
    pool: &[Item],
    constraints: &[Constraint],
    target_size: usize,
    number_of_forms: usize,
) -> ParallelForms {
    let mut used = UsedIds::new();
    let mut forms = Vec::with_capacity(number_of_forms);

    for form_index in 0..number_of_forms {
        match assemble_next_form(strategy, pool, constraints, target_size, &used) {
            Some((form, next)) => {
                forms.push(form);
                used = next;
            }
            None => {
                warn!(
                    form_index,
                    requested = number_of_forms,
                    remaining = pool.len().saturating_sub(used.len()),
                    target_size,
                    "Insufficient pool for further parallel forms"
                );
                break;
            }
        }
    }

    let mut equivalence = Vec::new();
    for a in 0..forms.len() {
        for b in (a + 1)..forms.len() {
            let score = form_equivalence(&forms[a], &forms[b]);
            info!(
                form_a = a,
                form_b = b,
                equivalence = score.overall,
                "Parallel form equivalence"
            );
            equivalence.push(FormEquivalence {
                form_a: a,
                form_b: b,
                score,
            });
        }
    }

    ParallelForms {
        requested_forms: number_of_forms,
        forms,
        equivalence,
        used_ids: used,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Equivalence scoring
// ────────────────────────────────────────────────────────────────────────────

/// Scores how interchangeable two forms are across difficulty, cognitive level and time.
pub fn form_equivalence(a: &AssemblyResult, b: &AssemblyResult) -> EquivalenceScore {
    let max_total = a.selected_items.len().max(b.selected_items.len());

    let difficulty_similarity = count_similarity(
        Difficulty::ALL.iter().map(|d| {
            (a.metrics.difficulty_count(*d), b.metrics.difficulty_count(*d))
        }),
        max_total,
    );

    let cognitive_similarity = count_similarity(
        CognitiveLevel::ALL.iter().map(|l| {
            (a.metrics.cognitive_count(*l), b.metrics.cognitive_count(*l))
        }),
        max_total,
    );

    let time_similarity = ratio_similarity(a.metrics.total_time_minutes, b.metrics.total_time_minutes);

    EquivalenceScore {
        difficulty_similarity,
        cognitive_similarity,
        time_similarity,
        overall: (difficulty_similarity + cognitive_similarity + time_similarity) / 3.0,
    }
}

/// `1 − Σ|count_A − count_B| / (2 × max_total)`; identical when both forms are empty.
fn count_similarity(pairs: impl Iterator<Item = (usize, usize)>, max_total: usize) -> f64 {
    if max_total == 0 {
        return 1.0;
    }
    let distance: usize = pairs.map(|(x, y)| x.abs_diff(y)).sum();
    (1.0 - distance as f64 / (2.0 * max_total as f64)).clamp(0.0, 1.0)
}

/// `min / max`; two zero totals are identical.
fn ratio_similarity(x: f64, y: f64) -> f64 {
    let (lo, hi) = if x <= y { (x, y) } else { (y, x) };
    if hi <= 0.0 {
        1.0
    } else {
        (lo / hi).clamp(0.0, 1.0)
    }
}

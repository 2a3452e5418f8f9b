//! Selection strategies — pluggable, trait-based selection behind `assemble_with`.
//!
//! Default: `GreedyStrategy` (deterministic forward selection, no backtracking).
//! Alternative: `AnnealingStrategy` (seeded simulated annealing refining the greedy
//! seed; closer to the global optimum at higher latency).
//!
//! `AppState` holds an `Arc<dyn SelectionStrategy>`, chosen at startup via config.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::assembly::scoring::{order_by_priority, weighted_total};
use crate::models::constraint::Constraint;
use crate::models::item::Item;

/// Raw output of a strategy, before metrics and satisfaction are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub items: Vec<Item>,
    pub score: f64,
    pub score_trace: Vec<f64>,
}

/// The selection strategy trait. Implement this to change how a subset is chosen
/// without touching evaluators, metrics, or callers.
///
/// Contract: at most `target_size` items, each drawn from `pool` exactly once.
pub trait SelectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn select(&self, pool: &[Item], constraints: &[Constraint], target_size: usize) -> Selection;
}

// ────────────────────────────────────────────────────────────────────────────
// GreedyStrategy
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic greedy forward selection.
///
/// Each step adds the candidate with the strictly highest weighted total of
/// selection ∪ {candidate}; ties go to the earliest candidate in pool order.
/// Cost: O(target_size² × pool_size × constraint_count), as every candidate
/// re-evaluates the whole selection. Handlers bound the wall-clock time with
/// `REQUEST_TIMEOUT_SECS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyStrategy;

impl SelectionStrategy for GreedyStrategy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn select(&self, pool: &[Item], constraints: &[Constraint], target_size: usize) -> Selection {
        let (indices, score, score_trace) = greedy_indices(pool, constraints, target_size);
        Selection {
            items: indices.into_iter().map(|i| pool[i].clone()).collect(),
            score,
            score_trace,
        }
    }
}

/// Greedy core over pool indices. Returns `(chosen, final score, trace)`.
fn greedy_indices(
    pool: &[Item],
    constraints: &[Constraint],
    target_size: usize,
) -> (Vec<usize>, f64, Vec<f64>) {
    let ordered = order_by_priority(constraints);

    let mut remaining: Vec<usize> = (0..pool.len()).collect();
    let mut chosen: Vec<usize> = Vec::with_capacity(target_size.min(pool.len()));
    let mut chosen_refs: Vec<&Item> = Vec::with_capacity(target_size.min(pool.len()));
    let mut score = 0.0;
    let mut score_trace = Vec::new();

    while chosen.len() < target_size && !remaining.is_empty() {
        let mut best: Option<(usize, f64)> = None;

        for (slot, &pool_idx) in remaining.iter().enumerate() {
            chosen_refs.push(&pool[pool_idx]);
            let total = weighted_total(&chosen_refs, &ordered);
            chosen_refs.pop();

            if best.map_or(true, |(_, best_total)| total > best_total) {
                best = Some((slot, total));
            }
        }

        let Some((slot, total)) = best else {
            break;
        };
        if total == f64::NEG_INFINITY {
            break;
        }

        let pool_idx = remaining.remove(slot);
        chosen.push(pool_idx);
        chosen_refs.push(&pool[pool_idx]);
        score = total;
        score_trace.push(total);

        debug!(
            step = chosen.len(),
            item_id = %pool[pool_idx].id,
            score = total,
            "greedy step accepted"
        );
    }

    (chosen, score, score_trace)
}

// ────────────────────────────────────────────────────────────────────────────
// AnnealingStrategy
// ────────────────────────────────────────────────────────────────────────────

/// Seeded simulated annealing over swap moves, started from the greedy selection.
///
/// A move swaps one selected item with one unselected pool item. Improving moves are
/// always accepted; worsening moves with probability `exp(delta / temperature)`.
/// The best state seen is returned, so the result never scores below the greedy seed.
/// The score trace is the greedy trace plus one trailing entry when annealing improved it.
#[derive(Debug, Clone)]
pub struct AnnealingStrategy {
    pub iterations: u32,
    pub seed: u64,
    pub initial_temperature: f64,
    pub cooling_rate: f64,
}

impl AnnealingStrategy {
    pub fn new(iterations: u32, seed: u64) -> Self {
        Self {
            iterations,
            seed,
            initial_temperature: 1.0,
            cooling_rate: 0.995,
        }
    }
}

impl SelectionStrategy for AnnealingStrategy {
    fn name(&self) -> &'static str {
        "annealing"
    }

    fn select(&self, pool: &[Item], constraints: &[Constraint], target_size: usize) -> Selection {
        let (mut selected, seed_score, mut score_trace) =
            greedy_indices(pool, constraints, target_size);

        // Nothing to swap with: the greedy seed is final.
        if selected.is_empty() || selected.len() >= pool.len() {
            return Selection {
                items: selected.into_iter().map(|i| pool[i].clone()).collect(),
                score: seed_score,
                score_trace,
            };
        }

        let ordered = order_by_priority(constraints);
        let in_selection: HashSet<usize> = selected.iter().copied().collect();
        let mut unselected: Vec<usize> =
            (0..pool.len()).filter(|i| !in_selection.contains(i)).collect();

        let score_of = |indices: &[usize]| {
            let refs: Vec<&Item> = indices.iter().map(|&i| &pool[i]).collect();
            weighted_total(&refs, &ordered)
        };

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut current_score = seed_score;
        let mut best = selected.clone();
        let mut best_score = seed_score;
        let mut temperature = self.initial_temperature.max(f64::MIN_POSITIVE);

        for _ in 0..self.iterations {
            let i = rng.random_range(0..selected.len());
            let j = rng.random_range(0..unselected.len());
            std::mem::swap(&mut selected[i], &mut unselected[j]);

            let candidate_score = score_of(&selected);
            let delta = candidate_score - current_score;

            if delta >= 0.0 || rng.random::<f64>() < (delta / temperature).exp() {
                current_score = candidate_score;
                if candidate_score > best_score {
                    best_score = candidate_score;
                    best.clone_from(&selected);
                }
            } else {
                std::mem::swap(&mut selected[i], &mut unselected[j]);
            }

            temperature = (temperature * self.cooling_rate).max(f64::MIN_POSITIVE);
        }

        if best_score > seed_score {
            debug!(seed_score, best_score, "annealing improved greedy seed");
            score_trace.push(best_score);
        }

        Selection {
            items: best.into_iter().map(|i| pool[i].clone()).collect(),
            score: best_score,
            score_trace,
        }
    }
}

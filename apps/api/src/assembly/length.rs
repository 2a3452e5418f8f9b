//! Length Optimizer — recommends an assessment length before assembly.
//!
//! Independent of the assembler. Starts at the midpoint of the bounds, applies the
//! time cap, the per-topic floor and a Spearman–Brown reliability check, then clamps.
//! Every adjustment leaves a human-readable entry in `reasoning`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::constraint::{Constraint, ConstraintRule, TimeLimitConfig, TopicCoverageConfig};
use crate::models::item::Item;

/// Reference point for reliability prediction: 0.7 at 20 items.
const BASELINE_RELIABILITY: f64 = 0.7;
const BASELINE_LENGTH: f64 = 20.0;

const DEFAULT_MINUTES_PER_ITEM: f64 = 2.0;
const DEFAULT_ITEMS_PER_TOPIC: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthRecommendation {
    pub recommended_length: usize,
    /// Spearman–Brown prediction at `recommended_length`.
    pub predicted_reliability: f64,
    pub reasoning: Vec<String>,
}

/// Spearman–Brown prediction relative to the 0.7-at-20-items baseline.
pub fn predict_reliability(length: usize) -> f64 {
    let ratio = length as f64 / BASELINE_LENGTH;
    (ratio * BASELINE_RELIABILITY) / (1.0 + (ratio - 1.0) * BASELINE_RELIABILITY)
}

/// Recommends a length within `[min_length, max_length]`.
///
/// Never fails. Inverted bounds are swapped and noted in the reasoning trail.
pub fn optimize_test_length(
    pool: &[Item],
    constraints: &[Constraint],
    min_length: usize,
    max_length: usize,
    target_reliability: f64,
) -> LengthRecommendation {
    let mut reasoning = Vec::new();

    let (min_length, max_length) = if min_length > max_length {
        warn!(min_length, max_length, "Inverted length bounds, swapping");
        reasoning.push(format!(
            "Bounds were inverted (min {min_length} > max {max_length}); swapped to [{max_length}, {min_length}]"
        ));
        (max_length, min_length)
    } else {
        (min_length, max_length)
    };

    let mut length = min_length + (max_length - min_length) / 2;
    reasoning.push(format!(
        "Starting from midpoint {length} of [{min_length}, {max_length}]"
    ));

    if let Some(cfg) = first_time_limit(constraints) {
        let per_item = cfg
            .average_minutes_per_item
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(DEFAULT_MINUTES_PER_ITEM);
        let cap = (cfg.max_minutes / per_item).floor().max(0.0) as usize;

        if length > cap {
            reasoning.push(format!(
                "Time limit of {} minutes at {} min/item allows at most {cap} items; reduced from {length}",
                cfg.max_minutes, per_item
            ));
            length = cap;
        } else {
            reasoning.push(format!(
                "Time limit of {} minutes at {} min/item fits {length} items",
                cfg.max_minutes, per_item
            ));
        }
    }

    if let Some(cfg) = first_topic_coverage(constraints) {
        let topic_count = if cfg.topics.is_empty() {
            pool.iter()
                .map(|i| i.topic.as_str())
                .collect::<BTreeSet<_>>()
                .len()
        } else {
            cfg.topics.len()
        };
        let per_topic = cfg.minimum_items_per_topic.unwrap_or(DEFAULT_ITEMS_PER_TOPIC) as usize;
        let floor = topic_count * per_topic;

        if length < floor {
            reasoning.push(format!(
                "Covering {topic_count} topics with at least {per_topic} items each needs {floor} items; raised from {length}"
            ));
            length = floor;
        }
    }

    let predicted = predict_reliability(length);
    if predicted < target_reliability {
        let scaled = if predicted > 0.0 {
            (length as f64 * target_reliability / predicted).ceil() as usize
        } else {
            max_length
        };
        let adjusted = scaled.clamp(min_length, max_length);
        reasoning.push(format!(
            "Predicted reliability {predicted:.2} at {length} items is below target {target_reliability:.2}; scaled to {adjusted}"
        ));
        length = adjusted;
    }

    let recommended_length = length.clamp(min_length, max_length);
    if recommended_length != length {
        reasoning.push(format!(
            "Clamped {length} into bounds [{min_length}, {max_length}] → {recommended_length}"
        ));
    }

    if pool.len() < recommended_length {
        reasoning.push(format!(
            "Pool holds only {} items; {recommended_length} recommended",
            pool.len()
        ));
    }

    LengthRecommendation {
        recommended_length,
        predicted_reliability: predict_reliability(recommended_length),
        reasoning,
    }
}

fn first_time_limit(constraints: &[Constraint]) -> Option<&TimeLimitConfig> {
    constraints.iter().find_map(|c| match &c.rule {
        ConstraintRule::TimeLimit(cfg) => Some(cfg),
        _ => None,
    })
}

fn first_topic_coverage(constraints: &[Constraint]) -> Option<&TopicCoverageConfig> {
    constraints.iter().find_map(|c| match &c.rule {
        ConstraintRule::TopicCoverage(cfg) => Some(cfg),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::item::{CognitiveLevel, Difficulty};

    fn time_limit(max_minutes: f64) -> Constraint {
        Constraint::new(
            ConstraintRule::TimeLimit(TimeLimitConfig {
                max_minutes,
                average_minutes_per_item: None,
            }),
            1.0,
        )
    }

    fn topic_coverage(topics: &[&str]) -> Constraint {
        Constraint::new(
            ConstraintRule::TopicCoverage(TopicCoverageConfig {
                topics: topics.iter().map(|t| (t.to_string(), 2)).collect::<BTreeMap<_, _>>(),
                minimum_items_per_topic: None,
            }),
            1.0,
        )
    }

    fn make_pool(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| {
                Item::new(
                    format!("q{i}"),
                    format!("topic-{}", i % 5),
                    CognitiveLevel::Applying,
                    Difficulty::Average,
                )
            })
            .collect()
    }

    #[test]
    fn test_baseline_reliability() {
        assert!((predict_reliability(20) - 0.7).abs() < 1e-9);
        // doubling: 1.4 / 1.7
        assert!((predict_reliability(40) - 1.4 / 1.7).abs() < 1e-9);
        assert_eq!(predict_reliability(0), 0.0);
    }

    #[test]
    fn test_time_limit_caps_length() {
        let rec = optimize_test_length(&make_pool(100), &[time_limit(20.0)], 10, 100, 0.4);
        assert_eq!(rec.recommended_length, 10);
        assert!(rec.reasoning.iter().any(|r| r.contains("Time limit")));
    }

    #[test]
    fn test_reliability_raises_time_capped_length() {
        // 10 items predicts ≈ 0.41 < 0.8 → ceil(10 × 0.8 / 0.41) = 20
        let rec = optimize_test_length(&make_pool(100), &[time_limit(20.0)], 10, 100, 0.8);
        assert_eq!(rec.recommended_length, 20);
        assert!(rec.reasoning.iter().any(|r| r.contains("Predicted reliability")));
    }

    #[test]
    fn test_topic_floor_raises_length() {
        let constraints = vec![time_limit(20.0), topic_coverage(&["a", "b", "c", "d"])];
        let rec = optimize_test_length(&make_pool(100), &constraints, 5, 100, 0.3);
        // time cap 10, floor 4 × 3 = 12
        assert_eq!(rec.recommended_length, 12);
        assert!(rec.reasoning.iter().any(|r| r.contains("4 topics")));
    }

    #[test]
    fn test_topic_count_falls_back_to_pool_topics() {
        let constraints = vec![time_limit(2.0), topic_coverage(&[])];
        let rec = optimize_test_length(&make_pool(50), &constraints, 1, 100, 0.0);
        // 5 distinct pool topics × 3
        assert_eq!(rec.recommended_length, 15);
    }

    #[test]
    fn test_no_constraints_uses_midpoint() {
        let rec = optimize_test_length(&make_pool(100), &[], 20, 60, 0.5);
        assert_eq!(rec.recommended_length, 40);
        assert_eq!(rec.reasoning.len(), 1);
    }

    #[test]
    fn test_result_always_within_bounds() {
        let pool = make_pool(30);
        let constraint_sets = vec![
            vec![],
            vec![time_limit(1.0)],
            vec![time_limit(500.0), topic_coverage(&["a", "b", "c", "d", "e", "f", "g"])],
        ];
        for constraints in &constraint_sets {
            for (min, max) in [(1, 5), (10, 100), (30, 30), (0, 3)] {
                for target in [0.0, 0.5, 0.9, 0.99] {
                    let rec = optimize_test_length(&pool, constraints, min, max, target);
                    assert!(
                        (min..=max).contains(&rec.recommended_length),
                        "{} outside [{min}, {max}]",
                        rec.recommended_length
                    );
                }
            }
        }
    }

    #[test]
    fn test_inverted_bounds_are_swapped() {
        let rec = optimize_test_length(&make_pool(100), &[], 60, 20, 0.5);
        assert!((20..=60).contains(&rec.recommended_length));
        assert!(rec.reasoning[0].contains("inverted"));
    }

    #[test]
    fn test_small_pool_is_noted() {
        let rec = optimize_test_length(&make_pool(5), &[], 20, 40, 0.5);
        assert_eq!(rec.recommended_length, 30);
        assert!(rec.reasoning.iter().any(|r| r.contains("Pool holds only 5")));
    }
}

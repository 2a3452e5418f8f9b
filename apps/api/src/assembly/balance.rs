//! Content balance check — diagnostic comparison of a finished selection against
//! the target distributions. Produces free-text guidance; never mutates the selection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::assembly::evaluator::evaluate;
use crate::assembly::scoring::SATISFACTION_THRESHOLD;
use crate::models::assembly::AssemblyMetrics;
use crate::models::constraint::{Constraint, ConstraintRule};
use crate::models::item::{Difficulty, Item};

/// Proportion gap below which a difficulty band is not worth a recommendation.
const PROPORTION_TOLERANCE: f64 = 0.10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub is_balanced: bool,
    pub recommendations: Vec<String>,
}

/// Checks every constraint against `selection`. Balanced iff all reach 0.8.
pub fn check_content_balance(selection: &[Item], constraints: &[Constraint]) -> BalanceReport {
    let refs: Vec<&Item> = selection.iter().collect();
    let metrics = AssemblyMetrics::from_items(selection);

    let mut is_balanced = true;
    let mut recommendations = Vec::new();

    for constraint in constraints {
        let satisfaction = evaluate(&refs, &constraint.rule);
        if satisfaction >= SATISFACTION_THRESHOLD {
            continue;
        }
        is_balanced = false;

        let mut specific = recommend_for(&constraint.rule, selection, &metrics);
        if specific.is_empty() {
            specific.push(format!(
                "{} satisfaction {:.2} is below {:.2}",
                constraint.kind().as_str(),
                satisfaction,
                SATISFACTION_THRESHOLD
            ));
        }
        recommendations.extend(specific);
    }

    BalanceReport {
        is_balanced,
        recommendations,
    }
}

fn recommend_for(rule: &ConstraintRule, selection: &[Item], metrics: &AssemblyMetrics) -> Vec<String> {
    match rule {
        ConstraintRule::TopicCoverage(cfg) => cfg
            .topics
            .iter()
            .filter_map(|(topic, target)| {
                let actual = metrics.topic_counts.get(topic).copied().unwrap_or(0);
                count_advice(&format!("topic '{topic}'"), actual, *target as usize)
            })
            .collect(),

        ConstraintRule::DifficultyBalance(cfg) => {
            if selection.is_empty() {
                return vec!["Selection is empty; add items across difficulty levels".to_string()];
            }
            let total = selection.len() as f64;
            Difficulty::ALL
                .iter()
                .zip(cfg.proportions())
                .filter_map(|(difficulty, target)| {
                    let actual = metrics.difficulty_count(*difficulty) as f64 / total;
                    if (actual - target).abs() <= PROPORTION_TOLERANCE {
                        return None;
                    }
                    let verb = if actual < target { "Increase" } else { "Reduce" };
                    Some(format!(
                        "{verb} {} items: {:.0}% of selection vs {:.0}% target",
                        difficulty.as_str(),
                        actual * 100.0,
                        target * 100.0
                    ))
                })
                .collect()
        }

        ConstraintRule::CognitiveDistribution(cfg) => cfg
            .levels
            .iter()
            .filter_map(|(level, target)| {
                count_advice(
                    &format!("{} level", level.as_str()),
                    metrics.cognitive_count(*level),
                    *target as usize,
                )
            })
            .collect(),

        ConstraintRule::TimeLimit(cfg) => {
            let over = metrics.total_time_minutes - cfg.max_minutes;
            if over > 0.0 {
                vec![format!(
                    "Total time {:.1} min exceeds the {:.1} min limit by {:.1} min; remove items or swap in shorter ones",
                    metrics.total_time_minutes, cfg.max_minutes, over
                )]
            } else {
                vec![]
            }
        }

        ConstraintRule::PointDistribution(cfg) => {
            if selection.is_empty() {
                return vec!["Selection is empty; add items to reach the point target".to_string()];
            }
            let target = cfg.target_points.unwrap_or(selection.len() as f64);
            let verb = if metrics.total_points < target { "Raise" } else { "Lower" };
            vec![format!(
                "{verb} total points: {:.1} vs {:.1} target",
                metrics.total_points, target
            )]
        }

        ConstraintRule::StandardsAlignment(cfg) => {
            let Some(standards) = &cfg.standards else {
                return vec![];
            };
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for item in selection {
                for tag in &item.standards_tags {
                    *counts.entry(tag.as_str()).or_insert(0) += 1;
                }
            }
            standards
                .iter()
                .filter_map(|(standard, target)| {
                    let actual = counts.get(standard.as_str()).copied().unwrap_or(0);
                    count_advice(&format!("standard '{standard}'"), actual, *target as usize)
                })
                .collect()
        }
    }
}

/// "Add N" / "Remove N" advice for a count target, or `None` when already exact.
fn count_advice(label: &str, actual: usize, target: usize) -> Option<String> {
    if actual < target {
        let n = target - actual;
        Some(format!(
            "Add {n} item{} for {label} (have {actual}, target {target})",
            if n == 1 { "" } else { "s" }
        ))
    } else if actual > target {
        let n = actual - target;
        Some(format!(
            "Remove {n} item{} for {label} (have {actual}, target {target})",
            if n == 1 { "" } else { "s" }
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::constraint::{
        DifficultyBalanceConfig, PointDistributionConfig, TimeLimitConfig, TopicCoverageConfig,
    };
    use crate::models::item::CognitiveLevel;

    fn make_item(id: &str, topic: &str, difficulty: Difficulty) -> Item {
        Item::new(id, topic, CognitiveLevel::Applying, difficulty)
    }

    fn topic_constraint(targets: &[(&str, u32)]) -> Constraint {
        Constraint::new(
            ConstraintRule::TopicCoverage(TopicCoverageConfig {
                topics: targets.iter().map(|(t, n)| (t.to_string(), *n)).collect::<BTreeMap<_, _>>(),
                minimum_items_per_topic: None,
            }),
            1.0,
        )
    }

    #[test]
    fn test_balanced_selection_has_no_recommendations() {
        let selection = vec![
            make_item("a", "algebra", Difficulty::Easy),
            make_item("b", "geometry", Difficulty::Average),
        ];
        let report = check_content_balance(&selection, &[topic_constraint(&[("algebra", 1), ("geometry", 1)])]);
        assert!(report.is_balanced);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_missing_topic_recommends_additions() {
        let selection = vec![make_item("a", "algebra", Difficulty::Easy)];
        let report = check_content_balance(&selection, &[topic_constraint(&[("algebra", 1), ("geometry", 3)])]);
        assert!(!report.is_balanced);
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].contains("Add 3 items for topic 'geometry'"));
    }

    #[test]
    fn test_difficulty_skew_names_the_band() {
        let selection: Vec<_> = (0..5)
            .map(|i| make_item(&format!("q{i}"), "t", Difficulty::Difficult))
            .collect();
        let report = check_content_balance(
            &selection,
            &[Constraint::new(ConstraintRule::DifficultyBalance(DifficultyBalanceConfig::default()), 1.0)],
        );
        assert!(!report.is_balanced);
        assert!(report.recommendations.iter().any(|r| r.starts_with("Reduce difficult")));
        assert!(report.recommendations.iter().any(|r| r.starts_with("Increase easy")));
    }

    #[test]
    fn test_time_overage_reports_minutes() {
        let selection: Vec<_> = (0..10)
            .map(|i| make_item(&format!("q{i}"), "t", Difficulty::Easy))
            .collect();
        let report = check_content_balance(
            &selection,
            &[Constraint::new(
                ConstraintRule::TimeLimit(TimeLimitConfig {
                    max_minutes: 10.0,
                    average_minutes_per_item: None,
                }),
                1.0,
            )],
        );
        assert!(!report.is_balanced);
        assert!(report.recommendations[0].contains("exceeds the 10.0 min limit by 10.0 min"));
    }

    #[test]
    fn test_points_shortfall() {
        let selection = vec![make_item("a", "t", Difficulty::Easy)];
        let report = check_content_balance(
            &selection,
            &[Constraint::new(
                ConstraintRule::PointDistribution(PointDistributionConfig {
                    target_points: Some(10.0),
                }),
                1.0,
            )],
        );
        assert!(report.recommendations[0].starts_with("Raise total points"));
    }

    #[test]
    fn test_empty_selection_points_advice_is_not_a_zero_comparison() {
        let report = check_content_balance(
            &[],
            &[Constraint::new(
                ConstraintRule::PointDistribution(PointDistributionConfig { target_points: None }),
                1.0,
            )],
        );
        assert!(!report.is_balanced);
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].starts_with("Selection is empty"));
        assert!(!report.recommendations[0].contains("0.0 vs 0.0"));
    }

    #[test]
    fn test_balance_check_does_not_touch_selection() {
        let selection = vec![make_item("a", "algebra", Difficulty::Easy)];
        let before = selection.clone();
        let _ = check_content_balance(&selection, &[topic_constraint(&[("geometry", 2)])]);
        assert_eq!(selection, before);
    }
}

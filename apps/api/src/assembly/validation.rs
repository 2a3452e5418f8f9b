//! Boundary validation — rejects malformed requests before the engine runs.
//!
//! The engine itself is total and never validates; these checks run at the HTTP
//! boundary and fail with `AppError::InvalidInput` on the first problem found.

use std::collections::{BTreeMap, HashSet};

use crate::assembly::blueprint::Blueprint;
use crate::errors::AppError;
use crate::models::constraint::{Constraint, ConstraintRule};
use crate::models::item::{CognitiveLevel, Item};

pub fn validate_pool(pool: &[Item], max_pool_size: usize) -> Result<(), AppError> {
    if pool.len() > max_pool_size {
        return Err(AppError::InvalidInput(format!(
            "pool has {} items; the limit is {max_pool_size}",
            pool.len()
        )));
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(pool.len());
    for item in pool {
        if item.id.trim().is_empty() {
            return Err(AppError::InvalidInput("item id cannot be empty".to_string()));
        }
        if !seen.insert(item.id.as_str()) {
            return Err(AppError::InvalidInput(format!("duplicate item id '{}'", item.id)));
        }
        if item.topic.trim().is_empty() {
            return Err(AppError::InvalidInput(format!("item '{}' has an empty topic", item.id)));
        }
        if !is_positive(item.estimated_time_minutes) {
            return Err(AppError::InvalidInput(format!(
                "item '{}' must have a positive, finite estimatedTimeMinutes",
                item.id
            )));
        }
        if !is_positive(item.points) {
            return Err(AppError::InvalidInput(format!(
                "item '{}' must have positive, finite points",
                item.id
            )));
        }
    }

    Ok(())
}

pub fn validate_constraints(constraints: &[Constraint]) -> Result<(), AppError> {
    for (index, constraint) in constraints.iter().enumerate() {
        let kind = constraint.kind().as_str();

        if !is_positive(constraint.priority) {
            return Err(AppError::InvalidInput(format!(
                "constraint {index} ({kind}) must have a positive, finite priority"
            )));
        }

        match &constraint.rule {
            ConstraintRule::TimeLimit(cfg) => {
                if !is_positive(cfg.max_minutes) {
                    return Err(AppError::InvalidInput(format!(
                        "constraint {index} ({kind}) needs a positive, finite maxMinutes"
                    )));
                }
                if let Some(per_item) = cfg.average_minutes_per_item {
                    if !is_positive(per_item) {
                        return Err(AppError::InvalidInput(format!(
                            "constraint {index} ({kind}) averageMinutesPerItem must be positive"
                        )));
                    }
                }
            }
            ConstraintRule::PointDistribution(cfg) => {
                if let Some(target) = cfg.target_points {
                    if !is_positive(target) {
                        return Err(AppError::InvalidInput(format!(
                            "constraint {index} ({kind}) targetPoints must be positive"
                        )));
                    }
                }
            }
            ConstraintRule::DifficultyBalance(cfg) => {
                if cfg
                    .proportions()
                    .iter()
                    .any(|p| !p.is_finite() || !(0.0..=1.0).contains(p))
                {
                    return Err(AppError::InvalidInput(format!(
                        "constraint {index} ({kind}) proportions must lie in [0, 1] (or [0, 100] as percentages)"
                    )));
                }
            }
            ConstraintRule::TopicCoverage(cfg) => {
                if cfg.topics.keys().any(|t| t.trim().is_empty()) {
                    return Err(AppError::InvalidInput(format!(
                        "constraint {index} ({kind}) has an empty topic name"
                    )));
                }
            }
            ConstraintRule::CognitiveDistribution(_) | ConstraintRule::StandardsAlignment(_) => {}
        }
    }

    Ok(())
}

/// Rejects blueprints whose row, column or grand totals do not fit a `u32` count,
/// along with empty topics, bad priorities and all-zero matrices.
pub fn validate_blueprint(blueprint: &Blueprint) -> Result<(), AppError> {
    if !is_positive(blueprint.topic_priority) || !is_positive(blueprint.cognitive_priority) {
        return Err(AppError::InvalidInput(
            "blueprint priorities must be positive and finite".to_string(),
        ));
    }

    let overflow = |what: String| {
        AppError::InvalidInput(format!("blueprint total for {what} exceeds {}", u32::MAX))
    };

    let mut topics: BTreeMap<&str, u32> = BTreeMap::new();
    let mut levels: BTreeMap<CognitiveLevel, u32> = BTreeMap::new();
    let mut total: u32 = 0;

    for cell in &blueprint.cells {
        if cell.topic.trim().is_empty() {
            return Err(AppError::InvalidInput("blueprint cell has an empty topic".to_string()));
        }

        let row = topics.entry(cell.topic.as_str()).or_insert(0);
        *row = row
            .checked_add(cell.count)
            .ok_or_else(|| overflow(format!("topic '{}'", cell.topic)))?;

        let column = levels.entry(cell.cognitive_level).or_insert(0);
        *column = column
            .checked_add(cell.count)
            .ok_or_else(|| overflow(format!("level '{}'", cell.cognitive_level.as_str())))?;

        total = total
            .checked_add(cell.count)
            .ok_or_else(|| overflow("all cells".to_string()))?;
    }

    validate_count("blueprint total", total as usize)
}

pub fn validate_count(name: &str, value: usize) -> Result<(), AppError> {
    if value == 0 {
        return Err(AppError::InvalidInput(format!("{name} must be at least 1")));
    }
    Ok(())
}

pub fn validate_reliability(target: f64) -> Result<(), AppError> {
    if !target.is_finite() || target <= 0.0 || target >= 1.0 {
        return Err(AppError::InvalidInput(
            "targetReliability must lie strictly between 0 and 1".to_string(),
        ));
    }
    Ok(())
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::blueprint::BlueprintCell;
    use crate::models::constraint::{
        DifficultyBalanceConfig, TimeLimitConfig, TopicCoverageConfig,
    };
    use crate::models::item::Difficulty;

    fn make_item(id: &str) -> Item {
        Item::new(id, "algebra", CognitiveLevel::Applying, Difficulty::Easy)
    }

    fn assert_invalid(result: Result<(), AppError>, needle: &str) {
        match result {
            Err(AppError::InvalidInput(msg)) => assert!(msg.contains(needle), "message: {msg}"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_pool_passes() {
        assert!(validate_pool(&[make_item("a"), make_item("b")], 10).is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        assert_invalid(validate_pool(&[make_item("a"), make_item("a")], 10), "duplicate item id 'a'");
    }

    #[test]
    fn test_oversized_pool_rejected() {
        let pool: Vec<_> = (0..3).map(|i| make_item(&format!("q{i}"))).collect();
        assert_invalid(validate_pool(&pool, 2), "limit is 2");
    }

    #[test]
    fn test_non_positive_time_rejected() {
        let mut item = make_item("a");
        item.estimated_time_minutes = 0.0;
        assert_invalid(validate_pool(&[item], 10), "estimatedTimeMinutes");
    }

    #[test]
    fn test_nan_points_rejected() {
        let mut item = make_item("a");
        item.points = f64::NAN;
        assert_invalid(validate_pool(&[item], 10), "points");
    }

    #[test]
    fn test_non_finite_priority_rejected() {
        let c = Constraint::new(
            ConstraintRule::DifficultyBalance(DifficultyBalanceConfig::default()),
            f64::INFINITY,
        );
        assert_invalid(validate_constraints(&[c]), "priority");
    }

    #[test]
    fn test_zero_time_limit_rejected() {
        let c = Constraint::new(
            ConstraintRule::TimeLimit(TimeLimitConfig {
                max_minutes: 0.0,
                average_minutes_per_item: None,
            }),
            1.0,
        );
        assert_invalid(validate_constraints(&[c]), "maxMinutes");
    }

    #[test]
    fn test_negative_proportion_rejected() {
        let c = Constraint::new(
            ConstraintRule::DifficultyBalance(DifficultyBalanceConfig {
                easy: -0.1,
                average: 0.6,
                difficult: 0.5,
            }),
            1.0,
        );
        assert_invalid(validate_constraints(&[c]), "proportions");
    }

    #[test]
    fn test_empty_topic_name_rejected() {
        let c = Constraint::new(
            ConstraintRule::TopicCoverage(TopicCoverageConfig {
                topics: BTreeMap::from([(" ".to_string(), 2)]),
                minimum_items_per_topic: None,
            }),
            1.0,
        );
        assert_invalid(validate_constraints(&[c]), "empty topic");
    }

    fn blueprint(cells: &[(&str, CognitiveLevel, u32)]) -> Blueprint {
        Blueprint {
            cells: cells
                .iter()
                .map(|(topic, level, count)| BlueprintCell {
                    topic: topic.to_string(),
                    cognitive_level: *level,
                    count: *count,
                })
                .collect(),
            topic_priority: 1.0,
            cognitive_priority: 1.0,
        }
    }

    #[test]
    fn test_blueprint_topic_overflow_rejected() {
        let bp = blueprint(&[
            ("a", CognitiveLevel::Applying, 3_000_000_000),
            ("a", CognitiveLevel::Remembering, 3_000_000_000),
        ]);
        assert_invalid(validate_blueprint(&bp), "topic 'a'");
    }

    #[test]
    fn test_blueprint_level_overflow_rejected() {
        let bp = blueprint(&[
            ("a", CognitiveLevel::Applying, 3_000_000_000),
            ("b", CognitiveLevel::Applying, 3_000_000_000),
        ]);
        assert_invalid(validate_blueprint(&bp), "level 'applying'");
    }

    #[test]
    fn test_blueprint_grand_total_overflow_rejected() {
        let bp = blueprint(&[
            ("a", CognitiveLevel::Applying, 3_000_000_000),
            ("b", CognitiveLevel::Remembering, 3_000_000_000),
        ]);
        assert_invalid(validate_blueprint(&bp), "all cells");
    }

    #[test]
    fn test_blueprint_zero_total_and_bad_priority_rejected() {
        assert_invalid(
            validate_blueprint(&blueprint(&[("a", CognitiveLevel::Applying, 0)])),
            "blueprint total",
        );
        let mut bp = blueprint(&[("a", CognitiveLevel::Applying, 2)]);
        assert!(validate_blueprint(&bp).is_ok());
        bp.topic_priority = 0.0;
        assert_invalid(validate_blueprint(&bp), "priorities");
    }

    #[test]
    fn test_counts_and_reliability() {
        assert_invalid(validate_count("targetSize", 0), "targetSize");
        assert!(validate_count("numberOfForms", 2).is_ok());
        assert_invalid(validate_reliability(1.0), "targetReliability");
        assert!(validate_reliability(0.85).is_ok());
    }
}

//! Constraint Evaluator — one pure scoring function per constraint kind.
//!
//! Every evaluator is total: it returns a finite value in [0, 1] for any selection,
//! including the empty one. "Nothing to satisfy" scores 1.0; a proportion whose
//! denominator is the (empty) selection size scores 0.0.

use std::collections::HashMap;

use crate::models::constraint::{
    CognitiveDistributionConfig, ConstraintRule, DifficultyBalanceConfig, PointDistributionConfig,
    StandardsAlignmentConfig, TimeLimitConfig, TopicCoverageConfig,
};
use crate::models::item::{CognitiveLevel, Difficulty, Item};

/// Dispatches on the rule kind and returns the clamped satisfaction score.
pub fn evaluate(selection: &[&Item], rule: &ConstraintRule) -> f64 {
    let raw = match rule {
        ConstraintRule::TopicCoverage(cfg) => topic_coverage(selection, cfg),
        ConstraintRule::DifficultyBalance(cfg) => difficulty_balance(selection, cfg),
        ConstraintRule::CognitiveDistribution(cfg) => cognitive_distribution(selection, cfg),
        ConstraintRule::TimeLimit(cfg) => time_limit(selection, cfg),
        ConstraintRule::PointDistribution(cfg) => point_distribution(selection, cfg),
        ConstraintRule::StandardsAlignment(cfg) => standards_alignment(selection, cfg),
    };

    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Mean of `max(0, 1 − |actual − target| / target)` over the configured topics.
pub fn topic_coverage(selection: &[&Item], cfg: &TopicCoverageConfig) -> f64 {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for item in selection {
        *counts.entry(item.topic.as_str()).or_insert(0) += 1;
    }

    mean_count_fit(
        cfg.topics
            .iter()
            .map(|(topic, target)| (counts.get(topic.as_str()).copied().unwrap_or(0), *target)),
    )
}

/// `1 − Σ|actual_i − target_i| / 3` over the easy/average/difficult proportions.
pub fn difficulty_balance(selection: &[&Item], cfg: &DifficultyBalanceConfig) -> f64 {
    if selection.is_empty() {
        return 0.0;
    }

    let total = selection.len() as f64;
    let targets = cfg.proportions();

    let deviation: f64 = Difficulty::ALL
        .iter()
        .zip(targets)
        .map(|(difficulty, target)| {
            let actual = selection.iter().filter(|i| i.difficulty == *difficulty).count() as f64;
            (actual / total - target).abs()
        })
        .sum();

    1.0 - deviation / 3.0
}

/// `1 − Σ|actual − target| / (selection size × 6)` over the configured levels.
pub fn cognitive_distribution(selection: &[&Item], cfg: &CognitiveDistributionConfig) -> f64 {
    if cfg.levels.is_empty() {
        return 1.0;
    }
    if selection.is_empty() {
        return 0.0;
    }

    let deviation: f64 = cfg
        .levels
        .iter()
        .map(|(level, target)| {
            let actual = selection.iter().filter(|i| i.cognitive_level == *level).count() as f64;
            (actual - f64::from(*target)).abs()
        })
        .sum();

    let denominator = selection.len() as f64 * CognitiveLevel::ALL.len() as f64;
    (1.0 - deviation / denominator).max(0.0)
}

/// 1.0 within budget, otherwise `max / total`.
pub fn time_limit(selection: &[&Item], cfg: &TimeLimitConfig) -> f64 {
    let total: f64 = selection.iter().map(|i| i.estimated_time_minutes).sum();
    if total <= cfg.max_minutes {
        1.0
    } else {
        (cfg.max_minutes / total).max(0.0)
    }
}

/// `1 − |total − target| / target`; target defaults to the selection size.
pub fn point_distribution(selection: &[&Item], cfg: &PointDistributionConfig) -> f64 {
    let target = cfg.target_points.unwrap_or(selection.len() as f64);
    if target <= 0.0 {
        return 0.0;
    }

    let total: f64 = selection.iter().map(|i| i.points).sum();
    (1.0 - (total - target).abs() / target).max(0.0)
}

/// Coverage of standards tags, scored like topic coverage. Neutral without a mapping.
pub fn standards_alignment(selection: &[&Item], cfg: &StandardsAlignmentConfig) -> f64 {
    let Some(standards) = &cfg.standards else {
        return 1.0;
    };

    mean_count_fit(standards.iter().map(|(standard, target)| {
        let actual = selection
            .iter()
            .filter(|i| i.standards_tags.contains(standard))
            .count() as u32;
        (actual, *target)
    }))
}

/// Averages the per-target fit of `(actual, target)` count pairs. Empty → 1.0.
fn mean_count_fit(pairs: impl Iterator<Item = (u32, u32)>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;

    for (actual, target) in pairs {
        n += 1;
        sum += if target == 0 {
            if actual == 0 {
                1.0
            } else {
                0.0
            }
        } else {
            let target = f64::from(target);
            (1.0 - (f64::from(actual) - target).abs() / target).max(0.0)
        };
    }

    if n == 0 {
        1.0
    } else {
        sum / n as f64
    }
}

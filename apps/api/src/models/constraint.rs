use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::item::CognitiveLevel;

/// Discriminant of a constraint rule, used as the key of per-kind reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintKind {
    TopicCoverage,
    DifficultyBalance,
    CognitiveDistribution,
    TimeLimit,
    PointDistribution,
    StandardsAlignment,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::TopicCoverage => "topicCoverage",
            ConstraintKind::DifficultyBalance => "difficultyBalance",
            ConstraintKind::CognitiveDistribution => "cognitiveDistribution",
            ConstraintKind::TimeLimit => "timeLimit",
            ConstraintKind::PointDistribution => "pointDistribution",
            ConstraintKind::StandardsAlignment => "standardsAlignment",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Kind-specific configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCoverageConfig {
    /// topic → target item count. Topics not listed are ignored.
    #[serde(default)]
    pub topics: BTreeMap<String, u32>,
    /// Floor used by the length optimizer (default 3 per topic).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_items_per_topic: Option<u32>,
}

fn default_easy() -> f64 {
    0.30
}

fn default_average() -> f64 {
    0.50
}

fn default_difficult() -> f64 {
    0.20
}

/// Target difficulty proportions. Fractions (0.3) or percentages (30) are both accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyBalanceConfig {
    #[serde(default = "default_easy")]
    pub easy: f64,
    #[serde(default = "default_average")]
    pub average: f64,
    #[serde(default = "default_difficult")]
    pub difficult: f64,
}

impl Default for DifficultyBalanceConfig {
    fn default() -> Self {
        Self {
            easy: default_easy(),
            average: default_average(),
            difficult: default_difficult(),
        }
    }
}

impl DifficultyBalanceConfig {
    /// Returns `[easy, average, difficult]` as fractions.
    pub fn proportions(&self) -> [f64; 3] {
        let raw = [self.easy, self.average, self.difficult];
        if raw.iter().any(|p| *p > 1.0) {
            raw.map(|p| p / 100.0)
        } else {
            raw
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveDistributionConfig {
    /// level → target item count.
    #[serde(default)]
    pub levels: BTreeMap<CognitiveLevel, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLimitConfig {
    pub max_minutes: f64,
    /// Used by the length optimizer only (default 2 min/item).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_minutes_per_item: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDistributionConfig {
    /// Defaults to the selection size when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_points: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardsAlignmentConfig {
    /// standard tag → target item count. `None` scores neutrally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standards: Option<BTreeMap<String, u32>>,
}

/// A constraint rule: the kind tag plus its kind-specific config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "config", rename_all = "camelCase")]
pub enum ConstraintRule {
    TopicCoverage(TopicCoverageConfig),
    DifficultyBalance(DifficultyBalanceConfig),
    CognitiveDistribution(CognitiveDistributionConfig),
    TimeLimit(TimeLimitConfig),
    PointDistribution(PointDistributionConfig),
    StandardsAlignment(StandardsAlignmentConfig),
}

impl ConstraintRule {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            ConstraintRule::TopicCoverage(_) => ConstraintKind::TopicCoverage,
            ConstraintRule::DifficultyBalance(_) => ConstraintKind::DifficultyBalance,
            ConstraintRule::CognitiveDistribution(_) => ConstraintKind::CognitiveDistribution,
            ConstraintRule::TimeLimit(_) => ConstraintKind::TimeLimit,
            ConstraintRule::PointDistribution(_) => ConstraintKind::PointDistribution,
            ConstraintRule::StandardsAlignment(_) => ConstraintKind::StandardsAlignment,
        }
    }
}

/// A single weighted requirement against a selection.
///
/// `is_required` is informational: the engine reports shortfalls through
/// `constraints_satisfied` and never hard-rejects on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    #[serde(flatten)]
    pub rule: ConstraintRule,
    pub priority: f64,
    #[serde(default)]
    pub is_required: bool,
}

impl Constraint {
    pub fn new(rule: ConstraintRule, priority: f64) -> Self {
        Self {
            rule,
            priority,
            is_required: false,
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        self.rule.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constraint_deserializes_kind_and_config() {
        let c: Constraint = serde_json::from_value(json!({
            "kind": "topicCoverage",
            "config": { "topics": { "algebra": 4, "geometry": 2 } },
            "priority": 2.0,
            "isRequired": true
        }))
        .unwrap();
        assert_eq!(c.kind(), ConstraintKind::TopicCoverage);
        assert!(c.is_required);
        match c.rule {
            ConstraintRule::TopicCoverage(cfg) => assert_eq!(cfg.topics["algebra"], 4),
            other => panic!("unexpected rule {other:?}"),
        }
    }

    #[test]
    fn test_time_limit_accepts_integer_minutes() {
        let c: Constraint = serde_json::from_value(json!({
            "kind": "timeLimit",
            "config": { "maxMinutes": 20 },
            "priority": 1
        }))
        .unwrap();
        assert!(!c.is_required);
        assert_eq!(
            c.rule,
            ConstraintRule::TimeLimit(TimeLimitConfig {
                max_minutes: 20.0,
                average_minutes_per_item: None,
            })
        );
    }

    #[test]
    fn test_difficulty_defaults_to_30_50_20() {
        let c: Constraint = serde_json::from_value(json!({
            "kind": "difficultyBalance",
            "config": {},
            "priority": 1
        }))
        .unwrap();
        match c.rule {
            ConstraintRule::DifficultyBalance(cfg) => {
                assert_eq!(cfg.proportions(), [0.30, 0.50, 0.20]);
            }
            other => panic!("unexpected rule {other:?}"),
        }
    }

    #[test]
    fn test_difficulty_percentages_are_normalized() {
        let cfg = DifficultyBalanceConfig {
            easy: 50.0,
            average: 0.0,
            difficult: 50.0,
        };
        assert_eq!(cfg.proportions(), [0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_cognitive_levels_key_by_name() {
        let c: Constraint = serde_json::from_value(json!({
            "kind": "cognitiveDistribution",
            "config": { "levels": { "remembering": 3, "analyzing": 2 } },
            "priority": 1
        }))
        .unwrap();
        match c.rule {
            ConstraintRule::CognitiveDistribution(cfg) => {
                assert_eq!(cfg.levels[&CognitiveLevel::Analyzing], 2);
            }
            other => panic!("unexpected rule {other:?}"),
        }
    }
}

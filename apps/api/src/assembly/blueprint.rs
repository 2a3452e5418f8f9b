//! Blueprint — derives a constraint list from a topic × cognitive-level target matrix
//! (a table of specifications). Row sums become topic coverage targets, column sums
//! become cognitive distribution targets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::constraint::{
    CognitiveDistributionConfig, Constraint, ConstraintRule, TopicCoverageConfig,
};
use crate::models::item::CognitiveLevel;

fn default_priority() -> f64 {
    1.0
}

/// One cell of the matrix: how many items of `topic` at `cognitive_level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintCell {
    pub topic: String,
    pub cognitive_level: CognitiveLevel,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub cells: Vec<BlueprintCell>,
    #[serde(default = "default_priority")]
    pub topic_priority: f64,
    #[serde(default = "default_priority")]
    pub cognitive_priority: f64,
}

impl Blueprint {
    /// Sum of all cells; the natural target size for the blueprint.
    pub fn total_items(&self) -> usize {
        self.cells
            .iter()
            .fold(0usize, |acc, c| acc.saturating_add(c.count as usize))
    }

    /// Row sums. Saturate at `u32::MAX`; `validate_blueprint` rejects such matrices first.
    pub fn topic_totals(&self) -> BTreeMap<String, u32> {
        let mut totals = BTreeMap::new();
        for cell in self.cells.iter().filter(|c| c.count > 0) {
            let total = totals.entry(cell.topic.clone()).or_insert(0u32);
            *total = total.saturating_add(cell.count);
        }
        totals
    }

    pub fn level_totals(&self) -> BTreeMap<CognitiveLevel, u32> {
        let mut totals = BTreeMap::new();
        for cell in self.cells.iter().filter(|c| c.count > 0) {
            let total = totals.entry(cell.cognitive_level).or_insert(0u32);
            *total = total.saturating_add(cell.count);
        }
        totals
    }
}

/// Returns the topic coverage and cognitive distribution constraints for `blueprint`.
/// An all-zero matrix yields no constraints.
pub fn constraints_from_blueprint(blueprint: &Blueprint) -> Vec<Constraint> {
    let topics = blueprint.topic_totals();
    let levels = blueprint.level_totals();
    let mut constraints = Vec::new();

    if !topics.is_empty() {
        constraints.push(Constraint::new(
            ConstraintRule::TopicCoverage(TopicCoverageConfig {
                topics,
                minimum_items_per_topic: None,
            }),
            blueprint.topic_priority,
        ));
    }

    if !levels.is_empty() {
        constraints.push(Constraint::new(
            ConstraintRule::CognitiveDistribution(CognitiveDistributionConfig { levels }),
            blueprint.cognitive_priority,
        ));
    }

    constraints
}

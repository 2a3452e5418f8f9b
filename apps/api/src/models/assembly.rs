use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::constraint::ConstraintKind;
use crate::models::item::{CognitiveLevel, Difficulty, Item};

/// Aggregates derived from a finished selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyMetrics {
    pub topic_counts: BTreeMap<String, usize>,
    pub difficulty_counts: BTreeMap<Difficulty, usize>,
    pub cognitive_level_counts: BTreeMap<CognitiveLevel, usize>,
    pub total_time_minutes: f64,
    pub total_points: f64,
}

impl AssemblyMetrics {
    pub fn from_items(items: &[Item]) -> Self {
        let mut metrics = AssemblyMetrics::default();
        for item in items {
            *metrics.topic_counts.entry(item.topic.clone()).or_insert(0) += 1;
            *metrics.difficulty_counts.entry(item.difficulty).or_insert(0) += 1;
            *metrics
                .cognitive_level_counts
                .entry(item.cognitive_level)
                .or_insert(0) += 1;
            metrics.total_time_minutes += item.estimated_time_minutes;
            metrics.total_points += item.points;
        }
        metrics
    }

    pub fn difficulty_count(&self, difficulty: Difficulty) -> usize {
        self.difficulty_counts.get(&difficulty).copied().unwrap_or(0)
    }

    pub fn cognitive_count(&self, level: CognitiveLevel) -> usize {
        self.cognitive_level_counts.get(&level).copied().unwrap_or(0)
    }
}

/// One assembled form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyResult {
    pub selected_items: Vec<Item>,
    /// Weighted total recorded for the last accepted item.
    pub score: f64,
    /// Running score after each accepted item, in selection order.
    pub score_trace: Vec<f64>,
    /// kind → final satisfaction ≥ 0.8 (all constraints of that kind).
    pub constraints_satisfied: BTreeMap<ConstraintKind, bool>,
    /// kind → final satisfaction (minimum across constraints of that kind).
    pub satisfaction: BTreeMap<ConstraintKind, f64>,
    pub metrics: AssemblyMetrics,
}

impl AssemblyResult {
    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.selected_items.iter().map(|i| i.id.as_str())
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Ordered cognitive-process taxonomy, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CognitiveLevel {
    Remembering,
    Understanding,
    Applying,
    Analyzing,
    Evaluating,
    Creating,
}

impl CognitiveLevel {
    pub const ALL: [CognitiveLevel; 6] = [
        CognitiveLevel::Remembering,
        CognitiveLevel::Understanding,
        CognitiveLevel::Applying,
        CognitiveLevel::Analyzing,
        CognitiveLevel::Evaluating,
        CognitiveLevel::Creating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CognitiveLevel::Remembering => "remembering",
            CognitiveLevel::Understanding => "understanding",
            CognitiveLevel::Applying => "applying",
            CognitiveLevel::Analyzing => "analyzing",
            CognitiveLevel::Evaluating => "evaluating",
            CognitiveLevel::Creating => "creating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Average,
    Difficult,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Average, Difficulty::Difficult];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Average => "average",
            Difficulty::Difficult => "difficult",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeDimension {
    Factual,
    Conceptual,
    Procedural,
    Metacognitive,
}

fn default_time_minutes() -> f64 {
    2.0
}

fn default_points() -> f64 {
    1.0
}

/// A candidate item, already classified upstream. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub topic: String,
    pub cognitive_level: CognitiveLevel,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_dimension: Option<KnowledgeDimension>,
    #[serde(default = "default_time_minutes")]
    pub estimated_time_minutes: f64,
    #[serde(default = "default_points")]
    pub points: f64,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub standards_tags: BTreeSet<String>,
}

impl Item {
    /// Builds an item with the default time (2 min) and point value (1).
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        cognitive_level: CognitiveLevel,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            cognitive_level,
            difficulty,
            knowledge_dimension: None,
            estimated_time_minutes: default_time_minutes(),
            points: default_points(),
            standards_tags: BTreeSet::new(),
        }
    }
}

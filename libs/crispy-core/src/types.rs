//! Core types for level scoring and quest progression.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Win conditions for a level.
///
/// Any category may be absent, in which case it is trivially satisfied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelTargets {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub collect: HashMap<String, u32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub combos: HashMap<String, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<i64>,
}

/// Client-reported achievement snapshot for a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetsMet {
    #[serde(default)]
    pub collect: HashMap<String, u32>,
    #[serde(default)]
    pub combos: HashMap<String, u32>,
}

/// Per-category completion percentages for a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionBreakdown {
    pub collection_percent: f64,
    pub score_percent: f64,
    pub overall_percent: f64,
    pub collection_complete: bool,
    pub score_complete: bool,
}

/// Outcome of evaluating a completed session.
#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub is_won: bool,
    pub stars: u8,
    pub final_score: i64,
    pub moves_bonus: i64,
    pub completion: CompletionBreakdown,
}

/// Minimal view of a quest page as seen by the progression tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestStep {
    pub id: i64,
    pub order: i32,
    pub slug: String,
}

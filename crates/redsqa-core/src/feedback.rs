//! Reviewer feedback types, shared between the engine and the store.

use serde::{Deserialize, Serialize};

/// Binary reviewer judgment on a computed analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerJudgment {
    Correct,
    Incorrect,
}

/// One reviewer submission for a record. Immutable after creation; the store
/// enforces at most one entry per `record_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub record_id: String,
    /// Narrative exactly as analyzed.
    pub narrative: String,
    pub declared_code: String,
    /// Snapshot of the computed verdict the reviewer judged.
    pub verdict: String,
    pub judgment: ReviewerJudgment,
    /// ISO 8601 timestamp string.
    pub submitted_at: String,
}

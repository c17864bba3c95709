//! Pending review candidates.
//!
//! A `QueueEntry` records one obligation to re-test a concept. Entries are
//! append-only: they are created when a mistake, curveball, or follow-up is
//! queued and later marked completed, never physically deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EntryOrigin, QuestionType};

/// One pending review candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    /// Entry id (UUID).
    pub id: String,
    pub concept_id: String,
    pub book_id: String,
    pub question_type: QuestionType,
    /// Coarse dedup bucket (category + difficulty), coarser than the
    /// concept id: several keys can exist per concept.
    pub concept_key: String,
    pub origin: EntryOrigin,
    pub added_at: DateTime<Utc>,
    pub completed: bool,
}

impl QueueEntry {
    pub fn new(
        concept_id: impl Into<String>,
        book_id: impl Into<String>,
        question_type: QuestionType,
        concept_key: impl Into<String>,
        origin: EntryOrigin,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            concept_id: concept_id.into(),
            book_id: book_id.into(),
            question_type,
            concept_key: concept_key.into(),
            origin,
            added_at,
            completed: false,
        }
    }

    /// Dedup bucket within a selection pool.
    pub fn pool_key(&self) -> (&str, &str) {
        (self.concept_id.as_str(), self.concept_key.as_str())
    }
}

/// True when an active (non-completed) entry already exists for
/// `(concept_id, concept_key, question_type)`.
///
/// Among all active entries at most one may exist per such triple; the
/// check runs against a snapshot so it is testable without a store.
pub fn has_active_duplicate(
    pending: &[QueueEntry],
    concept_id: &str,
    concept_key: &str,
    question_type: QuestionType,
) -> bool {
    pending.iter().any(|entry| {
        !entry.completed
            && entry.concept_id == concept_id
            && entry.concept_key == concept_key
            && entry.question_type == question_type
    })
}

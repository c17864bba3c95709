//! Mistake capture and injected review candidates.
//!
//! Turns a graded attempt's wrong answers into queue entries, enforcing
//! dedup at insertion time, and queues the two injected origins: novelty
//! curveballs and time-delayed follow-ups.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use recap_algo::{EntryOrigin, QueueEntry, QuestionType};

use crate::services::ConceptRegistry;
use crate::storage::{ReviewQueueRepository, StorageResult};

/// Concept key used for injected curveball entries; they have no originating
/// question to take a category/difficulty bucket from.
const CURVEBALL_CONCEPT_KEY: &str = "curveball";

/// One graded response, as reported by the grading collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedResponse {
    pub concept_id: String,
    pub concept_key: String,
    pub question_type: QuestionType,
    pub is_correct: bool,
}

/// A graded test attempt for one book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAttempt {
    pub book_id: String,
    pub responses: Vec<GradedResponse>,
}

/// Queues a `Mistake` entry for every incorrect response that has no active
/// duplicate. Returns the entries actually created.
///
/// Idempotent: re-ingesting the same attempt is a no-op because duplicate
/// inserts are swallowed by the store's active-dedup index.
pub fn ingest_attempt(
    queue: &ReviewQueueRepository,
    registry: &dyn ConceptRegistry,
    attempt: &GradedAttempt,
    now: DateTime<Utc>,
) -> StorageResult<Vec<QueueEntry>> {
    let mut created = Vec::new();

    for response in attempt.responses.iter().filter(|r| !r.is_correct) {
        if registry.importance_tier(&response.concept_id).is_none() {
            tracing::debug!(
                concept_id = %response.concept_id,
                "skipping mistake for unresolved concept"
            );
            continue;
        }

        let entry = QueueEntry::new(
            &response.concept_id,
            &attempt.book_id,
            response.question_type,
            &response.concept_key,
            EntryOrigin::Mistake,
            now,
        );
        if queue.insert(&entry)? {
            created.push(entry);
        }
    }

    if !created.is_empty() {
        tracing::info!(
            book_id = %attempt.book_id,
            count = created.len(),
            "queued mistakes for review"
        );
    }

    Ok(created)
}

/// Queues one open-ended curveball for a book, picking a random concept
/// that has no pending entry yet.
///
/// At most one curveball is active per book; returns `None` when one is
/// already queued or no candidate concept is free.
pub fn inject_curveball<R: Rng>(
    queue: &ReviewQueueRepository,
    book_id: &str,
    concept_ids: &[String],
    rng: &mut R,
    now: DateTime<Utc>,
) -> StorageResult<Option<QueueEntry>> {
    let pending = queue.pending_for_book(book_id)?;
    if pending.iter().any(|e| e.origin == EntryOrigin::Curveball) {
        return Ok(None);
    }

    let candidates: Vec<&String> = concept_ids
        .iter()
        .filter(|id| !pending.iter().any(|e| &e.concept_id == *id))
        .collect();
    if candidates.is_empty() {
        return Ok(None);
    }

    let concept_id = candidates[rng.gen_range(0..candidates.len())];
    let entry = QueueEntry::new(
        concept_id,
        book_id,
        QuestionType::OpenEnded,
        CURVEBALL_CONCEPT_KEY,
        EntryOrigin::Curveball,
        now,
    );

    if queue.insert(&entry)? {
        tracing::debug!(book_id, concept_id = %entry.concept_id, "injected curveball");
        Ok(Some(entry))
    } else {
        Ok(None)
    }
}

/// Queues a time-delayed follow-up for a concept, dedup-checked like any
/// other candidate. Returns `None` when an active duplicate exists.
pub fn schedule_follow_up(
    queue: &ReviewQueueRepository,
    concept_id: &str,
    book_id: &str,
    concept_key: &str,
    question_type: QuestionType,
    now: DateTime<Utc>,
) -> StorageResult<Option<QueueEntry>> {
    if queue.has_active_entry(concept_id, concept_key, question_type)? {
        return Ok(None);
    }

    let entry = QueueEntry::new(
        concept_id,
        book_id,
        question_type,
        concept_key,
        EntryOrigin::SpacedFollowUp,
        now,
    );

    if queue.insert(&entry)? {
        Ok(Some(entry))
    } else {
        Ok(None)
    }
}

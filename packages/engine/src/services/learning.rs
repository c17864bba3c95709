//! Review recording: advances a concept's memory state after each graded
//! attempt and exposes the read side other parts of the product consume.

use chrono::{DateTime, Utc};

use recap_algo::{MemoryState, Performance};

use crate::services::ConceptRegistry;
use crate::storage::{MemoryStateRepository, StorageResult};

/// Applies one graded attempt to a concept's memory state.
///
/// Seeds the state from the concept's importance tier on first contact
/// (falling back to `Unset` when the registry no longer knows the concept),
/// classifies the correctness ratio, advances, and persists.
pub fn record_review(
    states: &MemoryStateRepository,
    registry: &dyn ConceptRegistry,
    concept_id: &str,
    correct: u32,
    total: u32,
    now: DateTime<Utc>,
) -> StorageResult<MemoryState> {
    let tier = registry.importance_tier(concept_id).unwrap_or_default();
    let current = states.get_or_create(concept_id, tier, now)?;

    let performance = Performance::classify(correct, total);
    let next = current.advance(performance, now);
    states.upsert(concept_id, &next, now)?;

    tracing::debug!(
        concept_id,
        performance = performance.as_str(),
        interval_days = next.interval_days,
        "advanced memory state"
    );

    Ok(next)
}

/// Concepts due for re-testing at `now`, most overdue first.
pub fn due_concepts(
    states: &MemoryStateRepository,
    now: DateTime<Utc>,
    limit: i64,
) -> StorageResult<Vec<(String, MemoryState)>> {
    states.due_before(now, limit)
}

/// Current recall-probability estimate, `None` for untracked concepts.
pub fn retention(
    states: &MemoryStateRepository,
    concept_id: &str,
    now: DateTime<Utc>,
) -> StorageResult<Option<f64>> {
    Ok(states.get(concept_id)?.map(|state| state.retention(now)))
}

//! Daily review assembly over the queue store.
//!
//! Selection is a pure function over one pending snapshot; completion is a
//! separate all-or-nothing batch once the session actually resolved.

use chrono::{DateTime, Utc};

use recap_algo::{select_daily, DailySelection};

use crate::storage::{PendingCounts, ReviewQueueRepository, StorageResult};

/// Assembles the day's bounded selection for one book, deduplicated and
/// ordered by origin priority.
pub fn build_daily_selection(
    queue: &ReviewQueueRepository,
    book_id: &str,
    choice_cap: usize,
    open_ended_cap: usize,
) -> StorageResult<DailySelection> {
    let pending = queue.pending_for_book(book_id)?;
    let selection = select_daily(&pending, choice_cap, open_ended_cap);

    tracing::debug!(
        book_id,
        pending = pending.len(),
        selected = selection.len(),
        "assembled daily selection"
    );

    Ok(selection)
}

/// Marks a delivered selection completed; either every entry is marked or
/// none are.
pub fn complete_selection(
    queue: &ReviewQueueRepository,
    selection: &DailySelection,
    now: DateTime<Utc>,
) -> StorageResult<()> {
    queue.mark_completed(&selection.entry_ids(), now)
}

/// Active entry counts for UI badges.
pub fn pending_counts(
    queue: &ReviewQueueRepository,
    book_id: &str,
) -> StorageResult<PendingCounts> {
    queue.count_pending(book_id)
}

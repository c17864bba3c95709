//! Daily review-queue assembly.
//!
//! Produces the bounded subset of pending entries surfaced in one practice
//! session, deduplicated per concept key and split by question shape.
//! Selection never mutates entries; marking them completed is a separate,
//! caller-invoked batch operation once the session resolves.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::queue::QueueEntry;
use crate::types::EntryOrigin;

pub const DEFAULT_CHOICE_CAP: usize = 3;
pub const DEFAULT_OPEN_ENDED_CAP: usize = 1;

/// The day's selection for one book, split by question shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySelection {
    pub choice_items: Vec<QueueEntry>,
    pub open_ended_items: Vec<QueueEntry>,
}

impl DailySelection {
    pub fn len(&self) -> usize {
        self.choice_items.len() + self.open_ended_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choice_items.is_empty() && self.open_ended_items.is_empty()
    }

    pub fn entry_ids(&self) -> Vec<String> {
        self.choice_items
            .iter()
            .chain(self.open_ended_items.iter())
            .map(|entry| entry.id.clone())
            .collect()
    }
}

/// Assembles the daily selection from all pending entries of one book.
///
/// The caller filters `pending` to a single book beforehand. Deterministic
/// for a fixed snapshot and fixed caps; total output size is bounded by
/// `choice_cap + open_ended_cap`.
///
/// Order of operations:
/// 1. One priority pick jumps the pools: the first curveball in the
///    snapshot, else the first spaced follow-up. Its shape consumes one
///    slot of the matching cap.
/// 2. The rest is bucketed into a choice pool and an open-ended pool in
///    ascending `added_at`, keeping the first entry per
///    `(concept_id, concept_key)` within each pool.
/// 3. Pools fill up to the remaining caps, skipping the key claimed by the
///    pick; the open-ended pool is re-sorted so follow-ups precede plain
///    mistakes.
pub fn select_daily(
    pending: &[QueueEntry],
    choice_cap: usize,
    open_ended_cap: usize,
) -> DailySelection {
    let active: Vec<&QueueEntry> = pending.iter().filter(|entry| !entry.completed).collect();

    // min_by_key keeps the first of equally ranked entries, so this is the
    // first curveball if any, else the first follow-up. A pick whose shape
    // has no cap left is not admitted and competes in the pools instead.
    let priority_pick = active
        .iter()
        .copied()
        .filter(|entry| entry.origin != EntryOrigin::Mistake)
        .filter(|entry| {
            if entry.question_type.is_choice() {
                choice_cap > 0
            } else {
                open_ended_cap > 0
            }
        })
        .min_by_key(|entry| entry.origin.priority_rank());

    let mut remaining_choice = choice_cap;
    let mut remaining_open = open_ended_cap;
    if let Some(pick) = priority_pick {
        if pick.question_type.is_choice() {
            remaining_choice = remaining_choice.saturating_sub(1);
        } else {
            remaining_open = remaining_open.saturating_sub(1);
        }
    }

    let mut working: Vec<&QueueEntry> = active
        .iter()
        .copied()
        .filter(|entry| priority_pick.map_or(true, |pick| pick.id != entry.id))
        .collect();
    working.sort_by_key(|entry| entry.added_at);

    let mut seen_choice: HashSet<(&str, &str)> = HashSet::new();
    let mut seen_open: HashSet<(&str, &str)> = HashSet::new();
    let mut choice_pool: Vec<&QueueEntry> = Vec::new();
    let mut open_pool: Vec<&QueueEntry> = Vec::new();
    for entry in working {
        if entry.question_type.is_choice() {
            if seen_choice.insert(entry.pool_key()) {
                choice_pool.push(entry);
            }
        } else if seen_open.insert(entry.pool_key()) {
            open_pool.push(entry);
        }
    }

    // Follow-ups outrank plain mistakes in the open-ended pool; curveballs
    // cannot appear here, the priority pick already consumed them.
    open_pool.sort_by_key(|entry| entry.origin.priority_rank());

    let claimed_key = priority_pick.map(|pick| pick.pool_key());

    let mut selection = DailySelection::default();
    if let Some(pick) = priority_pick {
        if pick.question_type.is_choice() {
            selection.choice_items.push(pick.clone());
        } else {
            selection.open_ended_items.push(pick.clone());
        }
    }

    for entry in choice_pool {
        if remaining_choice == 0 {
            break;
        }
        if claimed_key == Some(entry.pool_key()) {
            continue;
        }
        selection.choice_items.push(entry.clone());
        remaining_choice -= 1;
    }

    for entry in open_pool {
        if remaining_open == 0 {
            break;
        }
        if claimed_key == Some(entry.pool_key()) {
            continue;
        }
        selection.open_ended_items.push(entry.clone());
        remaining_open -= 1;
    }

    selection
}

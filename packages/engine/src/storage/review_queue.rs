//! Review-queue repository.
//!
//! Insert-if-absent, active-entry probes, per-book pending snapshots, and
//! transactional batch completion over `review_queue_entry`.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use recap_algo::{EntryOrigin, QueueEntry, QuestionType};

use crate::storage::{format_timestamp, lock_connection, parse_timestamp, StorageError, StorageResult};

/// Active entry counts for one book, split by question shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCounts {
    pub choice: i64,
    pub open_ended: i64,
}

pub struct ReviewQueueRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReviewQueueRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Inserts an entry unless an active duplicate exists for its
    /// `(concept_id, concept_key, question_type)`.
    ///
    /// Returns `true` when the row was inserted; `false` means the partial
    /// unique index swallowed the insert, so re-ingestion is a no-op.
    pub fn insert(&self, entry: &QueueEntry) -> StorageResult<bool> {
        let conn = lock_connection(&self.conn)?;

        let affected = conn.execute(
            r#"
            INSERT OR IGNORE INTO review_queue_entry (
                id, concept_id, book_id, question_type, concept_key,
                origin, added_at, completed, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)
            "#,
            params![
                entry.id,
                entry.concept_id,
                entry.book_id,
                entry.question_type.as_str(),
                entry.concept_key,
                entry.origin.as_str(),
                format_timestamp(entry.added_at),
                entry.completed as i32,
            ],
        )?;

        Ok(affected > 0)
    }

    /// True when an active entry exists for the triple.
    pub fn has_active_entry(
        &self,
        concept_id: &str,
        concept_key: &str,
        question_type: QuestionType,
    ) -> StorageResult<bool> {
        let conn = lock_connection(&self.conn)?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM review_queue_entry
             WHERE concept_id = ?1 AND concept_key = ?2 AND question_type = ?3 AND completed = 0",
            params![concept_id, concept_key, question_type.as_str()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// All active entries for a book, oldest first. One consistent snapshot:
    /// the whole read happens under the connection lock.
    pub fn pending_for_book(&self, book_id: &str) -> StorageResult<Vec<QueueEntry>> {
        let conn = lock_connection(&self.conn)?;

        let mut stmt = conn.prepare(
            "SELECT id, concept_id, book_id, question_type, concept_key, origin, added_at, completed
             FROM review_queue_entry
             WHERE book_id = ?1 AND completed = 0
             ORDER BY added_at ASC",
        )?;

        let entries: Vec<QueueEntry> = stmt
            .query_map(params![book_id], entry_from_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    /// Marks every listed entry completed, all-or-nothing.
    ///
    /// If any id is missing or already completed the whole batch rolls back,
    /// so a partial failure can never silently drop a review obligation.
    pub fn mark_completed(&self, ids: &[String], now: DateTime<Utc>) -> StorageResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut conn = lock_connection(&self.conn)?;
        let tx = conn.transaction()?;
        let now_str = format_timestamp(now);

        {
            let mut stmt = tx.prepare(
                "UPDATE review_queue_entry SET completed = 1, completed_at = ?1
                 WHERE id = ?2 AND completed = 0",
            )?;
            for id in ids {
                let affected = stmt.execute(params![now_str, id])?;
                if affected != 1 {
                    // Dropping the transaction rolls the batch back.
                    return Err(StorageError::NotFound(format!(
                        "queue entry {id} is missing or already completed"
                    )));
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Active entry counts for a book, split by question shape.
    pub fn count_pending(&self, book_id: &str) -> StorageResult<PendingCounts> {
        let conn = lock_connection(&self.conn)?;

        let row = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN question_type != 'openEnded' THEN 1 ELSE 0 END), 0) as choice_count,
                COALESCE(SUM(CASE WHEN question_type = 'openEnded' THEN 1 ELSE 0 END), 0) as open_count
            FROM review_queue_entry
            WHERE book_id = ?1 AND completed = 0
            "#,
            params![book_id],
            |row| {
                Ok(PendingCounts {
                    choice: row.get("choice_count")?,
                    open_ended: row.get("open_count")?,
                })
            },
        )?;

        Ok(row)
    }
}

fn entry_from_row(row: &Row) -> rusqlite::Result<QueueEntry> {
    let question_type: String = row.get("question_type")?;
    let origin: String = row.get("origin")?;
    let added_at: String = row.get("added_at")?;

    Ok(QueueEntry {
        id: row.get("id")?,
        concept_id: row.get("concept_id")?,
        book_id: row.get("book_id")?,
        question_type: QuestionType::from_str(&question_type).unwrap_or(QuestionType::SingleSelect),
        concept_key: row.get("concept_key")?,
        origin: EntryOrigin::from_str(&origin).unwrap_or(EntryOrigin::Mistake),
        added_at: parse_timestamp(&added_at),
        completed: row.get::<_, i32>("completed")? != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn entry(concept_id: &str, key: &str, minute: i64) -> QueueEntry {
        QueueEntry::new(
            concept_id,
            "book-1",
            QuestionType::SingleSelect,
            key,
            EntryOrigin::Mistake,
            fixed_now() + Duration::minutes(minute),
        )
    }

    #[test]
    fn test_insert_and_fetch_round_trip() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.review_queue();

        let e = entry("c1", "recall-easy", 0);
        assert!(repo.insert(&e).unwrap());

        let pending = repo.pending_for_book("book-1").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0], e);
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.review_queue();

        assert!(repo.insert(&entry("c1", "recall-easy", 0)).unwrap());
        assert!(!repo.insert(&entry("c1", "recall-easy", 5)).unwrap());

        let pending = repo.pending_for_book("book-1").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].added_at, fixed_now());
    }

    #[test]
    fn test_has_active_entry() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.review_queue();

        repo.insert(&entry("c1", "recall-easy", 0)).unwrap();
        assert!(repo
            .has_active_entry("c1", "recall-easy", QuestionType::SingleSelect)
            .unwrap());
        assert!(!repo
            .has_active_entry("c1", "recall-easy", QuestionType::OpenEnded)
            .unwrap());
    }

    #[test]
    fn test_pending_ordered_by_added_at() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.review_queue();

        repo.insert(&entry("c2", "k2", 10)).unwrap();
        repo.insert(&entry("c1", "k1", 0)).unwrap();
        repo.insert(&entry("c3", "k3", 5)).unwrap();

        let pending = repo.pending_for_book("book-1").unwrap();
        let order: Vec<&str> = pending.iter().map(|e| e.concept_id.as_str()).collect();
        assert_eq!(order, vec!["c1", "c3", "c2"]);
    }

    #[test]
    fn test_mark_completed_batch() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.review_queue();

        let e1 = entry("c1", "k1", 0);
        let e2 = entry("c2", "k2", 1);
        repo.insert(&e1).unwrap();
        repo.insert(&e2).unwrap();

        repo.mark_completed(&[e1.id.clone(), e2.id.clone()], fixed_now())
            .unwrap();
        assert!(repo.pending_for_book("book-1").unwrap().is_empty());
    }

    #[test]
    fn test_mark_completed_is_all_or_nothing() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.review_queue();

        let e1 = entry("c1", "k1", 0);
        repo.insert(&e1).unwrap();

        let result = repo.mark_completed(&[e1.id.clone(), "bogus".to_string()], fixed_now());
        assert!(matches!(result, Err(StorageError::NotFound(_))));

        // The known entry must still be pending after the rollback.
        let pending = repo.pending_for_book("book-1").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, e1.id);
    }

    #[test]
    fn test_completed_entry_allows_requeue() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.review_queue();

        let e1 = entry("c1", "k1", 0);
        repo.insert(&e1).unwrap();
        repo.mark_completed(&[e1.id.clone()], fixed_now()).unwrap();

        // Same triple again: the old row is completed, so this is active.
        assert!(repo.insert(&entry("c1", "k1", 60)).unwrap());
        assert_eq!(repo.pending_for_book("book-1").unwrap().len(), 1);
    }

    #[test]
    fn test_count_pending_split_by_shape() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.review_queue();

        repo.insert(&entry("c1", "k1", 0)).unwrap();
        repo.insert(&QueueEntry::new(
            "c2",
            "book-1",
            QuestionType::MultiSelect,
            "k2",
            EntryOrigin::Mistake,
            fixed_now(),
        ))
        .unwrap();
        repo.insert(&QueueEntry::new(
            "c3",
            "book-1",
            QuestionType::OpenEnded,
            "k3",
            EntryOrigin::Mistake,
            fixed_now(),
        ))
        .unwrap();

        let counts = repo.count_pending("book-1").unwrap();
        assert_eq!(counts, PendingCounts { choice: 2, open_ended: 1 });

        assert_eq!(repo.count_pending("book-2").unwrap(), PendingCounts::default());
    }

    #[test]
    fn test_books_are_isolated() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.review_queue();

        repo.insert(&entry("c1", "k1", 0)).unwrap();
        repo.insert(&QueueEntry::new(
            "c9",
            "book-2",
            QuestionType::SingleSelect,
            "k9",
            EntryOrigin::Mistake,
            fixed_now(),
        ))
        .unwrap();

        assert_eq!(repo.pending_for_book("book-1").unwrap().len(), 1);
        assert_eq!(repo.pending_for_book("book-2").unwrap().len(), 1);
    }
}

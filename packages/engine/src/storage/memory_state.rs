//! Memory-state repository.
//!
//! One row per tracked concept, created lazily on the first grading event
//! and never deleted by this crate.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use recap_algo::{ImportanceTier, MemoryState};

use crate::storage::{format_timestamp, lock_connection, parse_timestamp, StorageResult};

pub struct MemoryStateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MemoryStateRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn get(&self, concept_id: &str) -> StorageResult<Option<MemoryState>> {
        let conn = lock_connection(&self.conn)?;

        let state = conn
            .query_row(
                "SELECT stability, difficulty, interval_days, repetitions, lapses,
                        last_review_at, next_review_at
                 FROM concept_memory_state WHERE concept_id = ?1",
                params![concept_id],
                state_from_row,
            )
            .optional()?;

        Ok(state)
    }

    /// Returns the stored state, seeding and persisting a fresh one from the
    /// concept's tier when none exists yet.
    pub fn get_or_create(
        &self,
        concept_id: &str,
        tier: ImportanceTier,
        now: DateTime<Utc>,
    ) -> StorageResult<MemoryState> {
        if let Some(state) = self.get(concept_id)? {
            return Ok(state);
        }

        let state = MemoryState::initialize(tier, now);
        self.upsert(concept_id, &state, now)?;
        Ok(state)
    }

    pub fn upsert(
        &self,
        concept_id: &str,
        state: &MemoryState,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        let conn = lock_connection(&self.conn)?;
        let now_str = format_timestamp(now);

        conn.execute(
            r#"
            INSERT INTO concept_memory_state (
                concept_id, stability, difficulty, interval_days,
                repetitions, lapses, last_review_at, next_review_at,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(concept_id) DO UPDATE SET
                stability = excluded.stability,
                difficulty = excluded.difficulty,
                interval_days = excluded.interval_days,
                repetitions = excluded.repetitions,
                lapses = excluded.lapses,
                last_review_at = excluded.last_review_at,
                next_review_at = excluded.next_review_at,
                updated_at = excluded.updated_at
            "#,
            params![
                concept_id,
                state.stability,
                state.difficulty,
                state.interval_days,
                state.repetitions as i64,
                state.lapses as i64,
                format_timestamp(state.last_review_at),
                format_timestamp(state.next_review_at),
                now_str,
                now_str,
            ],
        )?;

        Ok(())
    }

    /// Concepts due at or before `now`, most overdue first.
    pub fn due_before(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> StorageResult<Vec<(String, MemoryState)>> {
        let conn = lock_connection(&self.conn)?;

        let mut stmt = conn.prepare(
            "SELECT concept_id, stability, difficulty, interval_days, repetitions, lapses,
                    last_review_at, next_review_at
             FROM concept_memory_state
             WHERE next_review_at <= ?1
             ORDER BY next_review_at ASC
             LIMIT ?2",
        )?;

        let due: Vec<(String, MemoryState)> = stmt
            .query_map(params![format_timestamp(now), limit], |row| {
                Ok((row.get("concept_id")?, state_from_row(row)?))
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(due)
    }
}

fn state_from_row(row: &Row) -> rusqlite::Result<MemoryState> {
    let last_review_at: String = row.get("last_review_at")?;
    let next_review_at: String = row.get("next_review_at")?;

    Ok(MemoryState {
        stability: row.get("stability")?,
        difficulty: row.get("difficulty")?,
        interval_days: row.get("interval_days")?,
        repetitions: row.get::<_, i64>("repetitions")?.max(0) as u32,
        lapses: row.get::<_, i64>("lapses")?.max(0) as u32,
        last_review_at: parse_timestamp(&last_review_at),
        next_review_at: parse_timestamp(&next_review_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use chrono::{Duration, TimeZone};
    use recap_algo::Performance;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_get_missing_concept() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.memory_states();
        assert!(repo.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_get_or_create_seeds_from_tier() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.memory_states();
        let now = fixed_now();

        let state = repo
            .get_or_create("c1", ImportanceTier::Foundation, now)
            .unwrap();
        assert!((state.difficulty - 0.2).abs() < 1e-9);
        assert!((state.stability - 1.5).abs() < 1e-9);

        // Second call reads the stored row instead of reseeding.
        let again = repo
            .get_or_create("c1", ImportanceTier::Enhancement, now)
            .unwrap();
        assert_eq!(again, state);
    }

    #[test]
    fn test_upsert_round_trip() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.memory_states();
        let now = fixed_now();

        let state = MemoryState::initialize(ImportanceTier::Unset, now)
            .advance(Performance::Good, now + Duration::days(1));
        repo.upsert("c1", &state, now).unwrap();

        let loaded = repo.get("c1").unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_due_before_orders_by_due_date() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.memory_states();
        let now = fixed_now();

        repo.get_or_create("late", ImportanceTier::Unset, now - Duration::days(5))
            .unwrap();
        repo.get_or_create("soon", ImportanceTier::Unset, now - Duration::days(2))
            .unwrap();
        repo.get_or_create("future", ImportanceTier::Unset, now)
            .unwrap();

        let due = repo.due_before(now, 10).unwrap();
        let ids: Vec<&str> = due.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["late", "soon"]);
        assert!(due.iter().all(|(_, state)| state.is_due(now)));
    }
}

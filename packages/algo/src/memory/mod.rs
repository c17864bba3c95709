//! Per-concept memory-state scheduler.
//!
//! Models how quickly a learner forgets a concept and computes when it
//! should resurface. One `MemoryState` exists per concept, created lazily
//! on the first grading event and mutated only through [`MemoryState::advance`].
//!
//! Invariant: `next_review_at == last_review_at + interval_days`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ImportanceTier, Performance};

pub const INITIAL_STABILITY: f64 = 1.0;
pub const MIN_INTERVAL_DAYS: f64 = 1.0;
pub const MAX_INTERVAL_DAYS: f64 = 365.0;
pub const MIN_DIFFICULTY: f64 = 0.1;
pub const MAX_DIFFICULTY: f64 = 1.0;

const HARD_INTERVAL_FACTOR: f64 = 0.6;
const GOOD_INTERVAL_FACTOR: f64 = 2.5;
const EASY_INTERVAL_FACTOR: f64 = 3.0;
const EASY_BONUS: f64 = 1.3;
const GOOD_SUCCESS_STEP: f64 = 0.1;
const EASY_SUCCESS_STEP: f64 = 0.15;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Forgetting-curve parameters for a single concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
    /// Resistance to forgetting, in days.
    pub stability: f64,
    /// Perceived difficulty, 0.1..=1.0.
    pub difficulty: f64,
    /// Days until the concept resurfaces, 1.0..=365.0.
    pub interval_days: f64,
    /// Consecutive successful reviews; reset on a lapse.
    pub repetitions: u32,
    /// Total lapses; never reset.
    pub lapses: u32,
    pub last_review_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
}

impl MemoryState {
    /// Seeds a new state from the concept's declared importance tier.
    pub fn initialize(tier: ImportanceTier, now: DateTime<Utc>) -> Self {
        let (difficulty, stability) = tier.seed();
        Self {
            stability,
            difficulty,
            interval_days: MIN_INTERVAL_DAYS,
            repetitions: 0,
            lapses: 0,
            last_review_at: now,
            next_review_at: now + interval_duration(MIN_INTERVAL_DAYS),
        }
    }

    /// Applies one graded performance outcome and reschedules.
    ///
    /// Pure and total: no branch can fail for any grade or finite input,
    /// and the counters saturate instead of overflowing.
    pub fn advance(&self, performance: Performance, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        match performance {
            Performance::Again => {
                next.interval_days = MIN_INTERVAL_DAYS;
                next.stability = INITIAL_STABILITY;
                next.lapses = self.lapses.saturating_add(1);
                next.repetitions = 0;
                next.difficulty = (self.difficulty + 0.2).min(MAX_DIFFICULTY);
            }
            Performance::Hard => {
                next.interval_days =
                    (self.interval_days * HARD_INTERVAL_FACTOR).max(MIN_INTERVAL_DAYS);
                next.stability = self.stability * 0.9;
                next.repetitions = self.repetitions.saturating_add(1);
                next.difficulty = (self.difficulty + 0.1).min(MAX_DIFFICULTY);
            }
            Performance::Good => {
                let success_factor = 1.0 + self.repetitions as f64 * GOOD_SUCCESS_STEP;
                next.interval_days = (self.interval_days * GOOD_INTERVAL_FACTOR * success_factor)
                    .min(MAX_INTERVAL_DAYS);
                next.stability = self.stability * 1.2;
                next.repetitions = self.repetitions.saturating_add(1);
            }
            Performance::Easy => {
                let success_factor = 1.0 + self.repetitions as f64 * EASY_SUCCESS_STEP;
                next.interval_days =
                    (self.interval_days * EASY_INTERVAL_FACTOR * success_factor * EASY_BONUS)
                        .min(MAX_INTERVAL_DAYS);
                next.stability = self.stability * 1.5;
                next.repetitions = self.repetitions.saturating_add(1);
                next.difficulty = (self.difficulty - 0.1).max(MIN_DIFFICULTY);
            }
        }
        next.last_review_at = now;
        next.next_review_at = now + interval_duration(next.interval_days);
        next
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review_at
    }

    /// Estimated recall probability at `now`.
    ///
    /// Exponential decay over days elapsed since the last review, scaled by
    /// stability. Non-positive stability yields 0.0 rather than dividing by
    /// zero.
    pub fn retention(&self, now: DateTime<Utc>) -> f64 {
        if self.stability <= 0.0 {
            return 0.0;
        }
        let elapsed_days = (now - self.last_review_at).num_milliseconds() as f64 / MILLIS_PER_DAY;
        let safe_elapsed = elapsed_days.max(0.0);
        (-safe_elapsed / self.stability).exp().clamp(0.0, 1.0)
    }
}

fn interval_duration(days: f64) -> Duration {
    Duration::milliseconds((days * MILLIS_PER_DAY) as i64)
}

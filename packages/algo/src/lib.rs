//! # recap-algo - Concept retention core algorithms
//!
//! Pure Rust decision logic for re-testing previously studied concepts:
//!
//! - **Memory scheduler** - per-concept forgetting-curve state and interval
//!   transitions driven by graded performance
//! - **Review queue** - pending review candidates with insertion-time dedup
//! - **Daily selector** - the small capped subset of pending entries
//!   surfaced in one practice session, deduplicated and priority-ordered
//!
//! The crate performs no I/O and never reads the clock; callers pass `now`
//! explicitly. All scheduling functions are total: every branch is defined
//! for every performance grade and all finite numeric inputs, so the
//! learning loop can never be halted by the model.
//!
//! ## Module structure
//!
//! - [`memory`] - `MemoryState`, interval transitions, retention estimate
//! - [`queue`] - `QueueEntry` and the active-duplicate predicate
//! - [`selector`] - daily selection assembly
//! - [`types`] - shared enums (tier, performance, question shape, origin)

pub mod memory;
pub mod queue;
pub mod selector;
pub mod types;

pub use memory::MemoryState;
pub use queue::{has_active_duplicate, QueueEntry};
pub use selector::{select_daily, DailySelection, DEFAULT_CHOICE_CAP, DEFAULT_OPEN_ENDED_CAP};
pub use types::{EntryOrigin, ImportanceTier, Performance, QuestionType};

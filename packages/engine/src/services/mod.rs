//! Decision services over the store: mistake ingestion, curveball and
//! follow-up injection, review recording, and daily selection assembly.

pub mod ingest;
pub mod learning;
pub mod review;

pub use ingest::{ingest_attempt, inject_curveball, schedule_follow_up, GradedAttempt, GradedResponse};
pub use learning::{due_concepts, record_review, retention};
pub use review::{build_daily_selection, complete_selection, pending_counts};

use recap_algo::ImportanceTier;

/// Resolves a concept's declared importance tier.
///
/// Implemented by the host's concept registry. `None` means the concept no
/// longer exists upstream; candidates referencing it are silently skipped.
pub trait ConceptRegistry {
    fn importance_tier(&self, concept_id: &str) -> Option<ImportanceTier>;
}

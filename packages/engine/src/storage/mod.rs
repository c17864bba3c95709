//! SQLite-backed store for review-queue entries and concept memory states.
//!
//! The only shared mutable resource in the core. Every mutation goes through
//! one `Mutex<Connection>`, which serializes concurrent ingestion and
//! selection/completion on the same book; selection reads take a single
//! snapshot under the lock.

pub mod memory_state;
pub mod migrations;
pub mod review_queue;

pub use memory_state::MemoryStateRepository;
pub use migrations::run_migrations;
pub use review_queue::{PendingCounts, ReviewQueueRepository};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Store error type.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("data not found: {0}")]
    NotFound(String),

    #[error("lock acquisition failed: {0}")]
    Lock(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Connection manager plus repository access.
///
/// Suitable for sharing across the host's threads; clone the inner
/// connection handle via [`Storage::connection`] or hand out repositories.
pub struct Storage {
    conn: Arc<Mutex<Connection>>,
    db_path: String,
}

impl Storage {
    /// Opens (or creates) the database at `db_path`, enables WAL mode, and
    /// runs pending migrations.
    pub fn new<P: AsRef<Path>>(db_path: P) -> StorageResult<Self> {
        let path_str = db_path.as_ref().to_string_lossy().to_string();
        let connection = Connection::open(&db_path)?;

        connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;

        Self::from_connection(connection, path_str)
    }

    /// In-memory database for tests.
    pub fn in_memory() -> StorageResult<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::from_connection(connection, ":memory:".to_string())
    }

    fn from_connection(connection: Connection, db_path: String) -> StorageResult<Self> {
        let conn = Arc::new(Mutex::new(connection));
        {
            let guard = conn
                .lock()
                .map_err(|e| StorageError::Lock(e.to_string()))?;
            migrations::run_migrations(&guard)?;
        }
        Ok(Self { conn, db_path })
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    pub fn review_queue(&self) -> ReviewQueueRepository {
        ReviewQueueRepository::new(Arc::clone(&self.conn))
    }

    pub fn memory_states(&self) -> MemoryStateRepository {
        MemoryStateRepository::new(Arc::clone(&self.conn))
    }

    /// Runs `f` inside a transaction, committing on success.
    pub fn transaction<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;

        Ok(result)
    }
}

pub(crate) fn lock_connection(
    conn: &Arc<Mutex<Connection>>,
) -> StorageResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|e| StorageError::Lock(e.to_string()))
}

/// Fixed-precision RFC 3339, so stored timestamps order lexicographically.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

//! Database migrations.
//!
//! Each migration runs in its own transaction and is recorded in
//! `schema_migrations`; re-running is idempotent.

use rusqlite::Connection;

use crate::storage::{StorageError, StorageResult};

/// Current database schema version.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

const INIT_SCHEMA: &str = include_str!("schema.sql");

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i32,
    pub name: String,
    pub sql: String,
}

impl Migration {
    pub fn new(version: i32, name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// All migrations, ordered by version.
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration::new(1, "initial schema", INIT_SCHEMA),
        Migration::new(
            2,
            "query indexes",
            r#"
            CREATE INDEX IF NOT EXISTS idx_rqe_book_pending
                ON review_queue_entry(book_id, completed, added_at);

            CREATE INDEX IF NOT EXISTS idx_cms_next_review
                ON concept_memory_state(next_review_at);
            "#,
        ),
    ]
}

fn ensure_migrations_table(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        );
        "#,
    )
    .map_err(|e| StorageError::Migration(format!("failed to create migrations table: {e}")))?;

    Ok(())
}

/// Highest applied version, 0 when none.
pub fn get_current_version(conn: &Connection) -> i32 {
    if ensure_migrations_table(conn).is_err() {
        return 0;
    }

    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

fn get_applied_versions(conn: &Connection) -> StorageResult<Vec<i32>> {
    ensure_migrations_table(conn)?;

    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(versions)
}

fn record_migration(conn: &Connection, migration: &Migration) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs() as i64
        ],
    )?;

    Ok(())
}

/// Applies every migration not yet recorded; returns the final version.
pub fn run_migrations(conn: &Connection) -> Result<i32, StorageError> {
    ensure_migrations_table(conn)?;

    let applied_versions = get_applied_versions(conn)?;
    let migrations = get_migrations();
    let mut final_version = get_current_version(conn);

    for migration in migrations {
        if applied_versions.contains(&migration.version) {
            continue;
        }

        tracing::info!(version = migration.version, name = %migration.name, "running migration");

        match execute_migration_in_transaction(conn, &migration) {
            Ok(()) => {
                final_version = migration.version;
            }
            Err(e) => {
                tracing::error!(version = migration.version, error = %e, "migration failed");
                return Err(e);
            }
        }
    }

    Ok(final_version)
}

fn execute_migration_in_transaction(conn: &Connection, migration: &Migration) -> StorageResult<()> {
    conn.execute("BEGIN IMMEDIATE", [])?;

    match conn.execute_batch(&migration.sql) {
        Ok(()) => {
            if let Err(e) = record_migration(conn, migration) {
                conn.execute("ROLLBACK", []).ok();
                return Err(e);
            }

            conn.execute("COMMIT", [])?;
            Ok(())
        }
        Err(e) => {
            conn.execute("ROLLBACK", []).ok();
            Err(StorageError::Migration(format!(
                "migration v{} failed: {e}",
                migration.version
            )))
        }
    }
}

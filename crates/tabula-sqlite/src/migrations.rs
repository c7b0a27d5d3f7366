//! Schema migrations
//!
//! The application hands the backend an ordered list of migrations; each one
//! runs once, in its own transaction, and the applied version is tracked in
//! `schema_version`.

use rusqlite::{Connection, OptionalExtension};

use crate::error::SqliteError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub sql: &'static str,
}

impl Migration {
    pub const fn new(version: i32, description: &'static str, sql: &'static str) -> Self {
        Self {
            version,
            description,
            sql,
        }
    }
}

/// Apply every migration newer than the stored version.
/// Returns the schema version after the run.
pub fn run_migrations(conn: &mut Connection, migrations: &[Migration]) -> Result<i32> {
    let mut ordered: Vec<&Migration> = migrations.iter().collect();
    ordered.sort_by_key(|m| m.version);

    if let Some(pair) = ordered.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(SqliteError::DuplicateMigration(pair[0].version));
    }

    let start_version = get_schema_version(conn)?;
    let mut current_version = start_version;

    for migration in ordered.into_iter().filter(|m| m.version > start_version) {
        tracing::info!(
            version = migration.version,
            description = migration.description,
            "Running migration"
        );

        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)
            .map_err(|source| SqliteError::Migration {
                version: migration.version,
                source,
            })?;
        set_schema_version(&tx, migration.version)?;
        tx.commit()?;

        current_version = migration.version;
    }

    Ok(current_version)
}

pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;

    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

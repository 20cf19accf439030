//! Registry schema steps and the runner that applies them.
//!
//! # Responsibility
//! - List schema steps in the order their tables depend on each other.
//! - Bring an opened database up to the newest step in one transaction.
//!
//! # Invariants
//! - Step versions start at 1 and grow by exactly 1.
//! - `PRAGMA user_version` always equals the last applied step.
//! - Steps only use `CREATE ... IF NOT EXISTS`.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, Transaction};

/// One versioned schema step.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "lookups",
        sql: include_str!("0001_lookups.sql"),
    },
    SchemaStep {
        version: 2,
        name: "parents",
        sql: include_str!("0002_parents.sql"),
    },
    SchemaStep {
        version: 3,
        name: "children",
        sql: include_str!("0003_children.sql"),
    },
];

/// Newest schema version this build can create.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Applies every step newer than the database's `user_version`.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a newer
///   build. Nothing is touched in that case.
/// - Any SQLite failure; the transaction is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = read_user_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = pending_steps(found).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        run_step(&tx, step)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        found, latest
    );
    Ok(())
}

fn pending_steps(found: u32) -> impl Iterator<Item = &'static SchemaStep> {
    SCHEMA_STEPS.iter().filter(move |step| step.version > found)
}

fn run_step(tx: &Transaction<'_>, step: &SchemaStep) -> DbResult<()> {
    tx.execute_batch(step.sql)?;
    // PRAGMA does not accept bound parameters.
    tx.execute_batch(&format!("PRAGMA user_version = {};", step.version))?;
    debug!(
        "event=db_migrate_step module=db status=ok version={} name={}",
        step.version, step.name
    );
    Ok(())
}

fn read_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

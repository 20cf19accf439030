//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define entity store contracts for lookups, companies and contacts.
//! - Own child-row reconciliation and aggregated list view assembly.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Id `0` is the absent sentinel: reads return `None`, deletes and
//!   reconciles are no-op successes.
//! - Every multi-statement write runs in one `BEGIN IMMEDIATE` transaction.
//! - Repository writes validate input before any SQL mutation.

use crate::db::DbError;
use crate::model::owner::{RecordId, NO_ID};
use crate::model::validation::ValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod child_repo;
pub mod company_repo;
pub mod contact_repo;
pub mod list_view;
pub mod lookup_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for registry persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Caller input rejected before any write.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error, propagated verbatim.
    Db(DbError),
    /// Non-zero id that does not exist.
    NotFound { entity: &'static str, id: RecordId },
    /// Connection schema lacks a table the repository needs.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl RepoError {
    /// Stable short code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Db(_) => "db_error",
            Self::NotFound { .. } => "not_found",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "registry repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted registry data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps the `0` sentinel to SQL `NULL` for nullable reference columns.
pub(crate) fn ref_to_db(id: RecordId) -> Option<RecordId> {
    if id == NO_ID {
        None
    } else {
        Some(id)
    }
}

/// Maps SQL `NULL` back to the `0` sentinel.
pub(crate) fn ref_from_db(id: Option<RecordId>) -> RecordId {
    id.unwrap_or(NO_ID)
}

pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{ensure_tables, ref_from_db, ref_to_db, RepoError};
    use rusqlite::Connection;

    #[test]
    fn sentinel_maps_to_null_and_back() {
        assert_eq!(ref_to_db(0), None);
        assert_eq!(ref_to_db(9), Some(9));
        assert_eq!(ref_from_db(None), 0);
        assert_eq!(ref_from_db(Some(9)), 9);
    }

    #[test]
    fn ensure_tables_reports_first_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE phones (id INTEGER);").unwrap();

        let err = ensure_tables(&conn, &["phones", "emails"]).unwrap_err();
        assert!(matches!(err, RepoError::MissingRequiredTable("emails")));
    }
}

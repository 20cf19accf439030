//! Lookup table repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide one CRUD surface for every `{id, name, note}` reference table.
//! - Provide `{id, name}` select items for dropdowns.
//!
//! # Invariants
//! - Table names come only from `LookupTable`, never from caller strings.
//! - `create` ignores the incoming id; SQLite assigns it.
//! - Lists are ordered by `name ASC, id ASC`.

use crate::db::now_epoch_ms;
use crate::model::lookup::{LookupRecord, LookupTable, SelectItem};
use crate::model::owner::{RecordId, NO_ID};
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for lookup tables.
pub trait LookupRepository {
    fn get(&self, table: LookupTable, id: RecordId) -> RepoResult<Option<LookupRecord>>;
    fn get_select(&self, table: LookupTable, id: RecordId) -> RepoResult<Option<SelectItem>>;
    fn create(&self, table: LookupTable, record: &LookupRecord) -> RepoResult<RecordId>;
    fn update(&self, table: LookupTable, record: &LookupRecord) -> RepoResult<()>;
    fn delete(&self, table: LookupTable, id: RecordId) -> RepoResult<()>;
    fn list(&self, table: LookupTable) -> RepoResult<Vec<LookupRecord>>;
    fn list_select(&self, table: LookupTable) -> RepoResult<Vec<SelectItem>>;
}

/// SQLite-backed lookup repository.
pub struct SqliteLookupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLookupRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let tables = LookupTable::ALL.map(LookupTable::table_name);
        ensure_tables(conn, &tables)?;
        Ok(Self { conn })
    }
}

impl LookupRepository for SqliteLookupRepository<'_> {
    fn get(&self, table: LookupTable, id: RecordId) -> RepoResult<Option<LookupRecord>> {
        if id == NO_ID {
            return Ok(None);
        }

        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT id, name, note FROM {} WHERE id = ?1;",
                    table.table_name()
                ),
                [id],
                |row| {
                    Ok(LookupRecord {
                        id: row.get("id")?,
                        name: row.get("name")?,
                        note: row.get("note")?,
                    })
                },
            )
            .optional()?;

        match record {
            Some(record) => Ok(Some(record)),
            None => Err(not_found(table, id)),
        }
    }

    fn get_select(&self, table: LookupTable, id: RecordId) -> RepoResult<Option<SelectItem>> {
        if id == NO_ID {
            return Ok(None);
        }
        match load_select_item(self.conn, table.table_name(), id)? {
            Some(item) => Ok(Some(item)),
            None => Err(not_found(table, id)),
        }
    }

    fn create(&self, table: LookupTable, record: &LookupRecord) -> RepoResult<RecordId> {
        record.validate(table)?;

        let now = now_epoch_ms();
        self.conn.execute(
            &format!(
                "INSERT INTO {} (name, note, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3);",
                table.table_name()
            ),
            params![record.name.trim(), record.note.as_deref(), now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, table: LookupTable, record: &LookupRecord) -> RepoResult<()> {
        if record.id == NO_ID {
            return Ok(());
        }
        record.validate(table)?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET
                    name = ?1,
                    note = ?2,
                    updated_at = ?3
                 WHERE id = ?4;",
                table.table_name()
            ),
            params![
                record.name.trim(),
                record.note.as_deref(),
                now_epoch_ms(),
                record.id
            ],
        )?;

        if changed == 0 {
            return Err(not_found(table, record.id));
        }
        Ok(())
    }

    fn delete(&self, table: LookupTable, id: RecordId) -> RepoResult<()> {
        if id == NO_ID {
            return Ok(());
        }

        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", table.table_name()),
            [id],
        )?;
        if changed == 0 {
            return Err(not_found(table, id));
        }
        Ok(())
    }

    fn list(&self, table: LookupTable) -> RepoResult<Vec<LookupRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name, note FROM {} ORDER BY name ASC, id ASC;",
            table.table_name()
        ))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(LookupRecord {
                id: row.get("id")?,
                name: row.get("name")?,
                note: row.get("note")?,
            });
        }
        Ok(records)
    }

    fn list_select(&self, table: LookupTable) -> RepoResult<Vec<SelectItem>> {
        list_select_items(self.conn, table.table_name())
    }
}

fn not_found(table: LookupTable, id: RecordId) -> RepoError {
    RepoError::NotFound {
        entity: table.entity_name(),
        id,
    }
}

/// Loads `{id, name}` for one row of any named table.
///
/// Returns `None` both for the `0` sentinel and for dangling references,
/// since references are not constrained by the schema.
pub(crate) fn load_select_item(
    conn: &Connection,
    table: &'static str,
    id: RecordId,
) -> RepoResult<Option<SelectItem>> {
    if id == NO_ID {
        return Ok(None);
    }

    let item = conn
        .query_row(
            &format!("SELECT id, name FROM {table} WHERE id = ?1;"),
            [id],
            |row| {
                Ok(SelectItem {
                    id: row.get("id")?,
                    name: row.get("name")?,
                })
            },
        )
        .optional()?;
    Ok(item)
}

/// Lists `{id, name}` for every row of a named table ordered by name.
pub(crate) fn list_select_items(
    conn: &Connection,
    table: &'static str,
) -> RepoResult<Vec<SelectItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name FROM {table} ORDER BY name ASC, id ASC;"
    ))?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(SelectItem {
            id: row.get("id")?,
            name: row.get("name")?,
        });
    }
    Ok(items)
}

//! Child row (phone/fax/email) reconciliation.
//!
//! # Responsibility
//! - Make the persisted children of one `(owner, kind)` pair equal to a
//!   caller-supplied desired set with minimal deletes and inserts.
//! - Wipe every child of an owner before the owner row is deleted.
//!
//! # Invariants
//! - Diffing is by value, never by row id. Rows whose value survives keep
//!   their id and `created_at`.
//! - After reconciliation each value appears at most once per
//!   `(owner, kind)`; pre-existing duplicate rows are removed.
//! - `Phone` and `Fax` subsets never touch each other's rows.
//! - One reconcile call is all-or-nothing.

use crate::db::now_epoch_ms;
use crate::model::child::{ChildKind, ChildRecord, ChildValue};
use crate::model::owner::Owner;
use crate::repo::{ensure_tables, RepoError, RepoResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Applied diff of one reconcile call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Rows inserted for values missing from storage.
    pub inserted: usize,
    /// Rows deleted because their value left the desired set (or duplicated
    /// a kept value).
    pub deleted: usize,
    /// Rows left untouched.
    pub kept: usize,
}

impl ReconcileReport {
    /// Returns whether the call wrote anything.
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.deleted == 0
    }

    pub fn merge(self, other: ReconcileReport) -> ReconcileReport {
        ReconcileReport {
            inserted: self.inserted + other.inserted,
            deleted: self.deleted + other.deleted,
            kept: self.kept + other.kept,
        }
    }
}

/// Repository interface for owned child rows.
pub trait ChildRepository {
    /// Reconciles the complete desired set for one `(owner, kind)` pair.
    fn reconcile(
        &mut self,
        owner: Owner,
        kind: ChildKind,
        desired: &[String],
    ) -> RepoResult<ReconcileReport>;
    /// Deletes every phone, fax and email row of `owner`. Returns row count.
    fn delete_all(&mut self, owner: Owner) -> RepoResult<usize>;
    /// Lists children of one `(owner, kind)` pair ordered by value.
    fn list_children(&self, owner: Owner, kind: ChildKind) -> RepoResult<Vec<ChildRecord>>;
}

/// SQLite-backed child repository.
pub struct SqliteChildRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteChildRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["phones", "emails"])?;
        Ok(Self { conn })
    }
}

impl ChildRepository for SqliteChildRepository<'_> {
    fn reconcile(
        &mut self,
        owner: Owner,
        kind: ChildKind,
        desired: &[String],
    ) -> RepoResult<ReconcileReport> {
        if owner.is_absent() {
            return Ok(ReconcileReport::default());
        }
        let desired = kind.normalize_all(desired)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let report = reconcile_values(&tx, owner, kind, &desired)?;
        tx.commit()?;
        Ok(report)
    }

    fn delete_all(&mut self, owner: Owner) -> RepoResult<usize> {
        if owner.is_absent() {
            return Ok(0);
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let deleted = delete_all_children(&tx, owner)?;
        tx.commit()?;
        Ok(deleted)
    }

    fn list_children(&self, owner: Owner, kind: ChildKind) -> RepoResult<Vec<ChildRecord>> {
        load_children(self.conn, owner, kind)
    }
}

/// Normalizes every desired set of a parent write up front, so malformed
/// input fails before the parent row is touched.
pub(crate) fn normalize_desired<'a>(
    sets: impl IntoIterator<Item = (ChildKind, &'a [String])>,
) -> RepoResult<Vec<(ChildKind, BTreeSet<ChildValue>)>> {
    let mut normalized = Vec::new();
    for (kind, values) in sets {
        normalized.push((kind, kind.normalize_all(values)?));
    }
    Ok(normalized)
}

/// Reconciles one `(owner, kind)` pair on a connection that is already
/// inside a transaction.
pub(crate) fn reconcile_values(
    conn: &Connection,
    owner: Owner,
    kind: ChildKind,
    desired: &BTreeSet<ChildValue>,
) -> RepoResult<ReconcileReport> {
    if owner.is_absent() {
        return Ok(ReconcileReport::default());
    }

    let existing = load_rows(conn, owner, kind)?;

    // First row per value survives; later rows with the same value are
    // duplicates and go away together with values outside `desired`.
    let mut kept: BTreeMap<&ChildValue, i64> = BTreeMap::new();
    let mut to_delete = Vec::new();
    for (row_id, value) in &existing {
        if desired.contains(value) && !kept.contains_key(value) {
            kept.insert(value, *row_id);
        } else {
            to_delete.push(*row_id);
        }
    }

    let delete_sql = format!("DELETE FROM {} WHERE id = ?1;", kind.table());
    for row_id in &to_delete {
        conn.execute(&delete_sql, [row_id])?;
    }

    let now = now_epoch_ms();
    let mut inserted = 0;
    for value in desired {
        if kept.contains_key(value) {
            continue;
        }
        insert_child(conn, owner, kind, value, now)?;
        inserted += 1;
    }

    let report = ReconcileReport {
        inserted,
        deleted: to_delete.len(),
        kept: kept.len(),
    };
    debug!(
        "event=children_reconcile module=repo status=ok owner_kind={} owner_id={} child_kind={} inserted={} deleted={} kept={}",
        owner.parent_kind().entity_name(),
        owner.id(),
        kind.plural(),
        report.inserted,
        report.deleted,
        report.kept
    );
    Ok(report)
}

/// Deletes every child row of `owner` on a connection that is already
/// inside a transaction.
pub(crate) fn delete_all_children(conn: &Connection, owner: Owner) -> RepoResult<usize> {
    if owner.is_absent() {
        return Ok(0);
    }

    let owner_column = owner.parent_kind().owner_column();
    let mut deleted = 0;
    for table in ["phones", "emails"] {
        deleted += conn.execute(
            &format!("DELETE FROM {table} WHERE {owner_column} = ?1;"),
            [owner.id()],
        )?;
    }
    debug!(
        "event=children_delete_all module=repo status=ok owner_kind={} owner_id={} deleted={}",
        owner.parent_kind().entity_name(),
        owner.id(),
        deleted
    );
    Ok(deleted)
}

/// Loads full child records of one `(owner, kind)` pair ordered by value.
pub(crate) fn load_children(
    conn: &Connection,
    owner: Owner,
    kind: ChildKind,
) -> RepoResult<Vec<ChildRecord>> {
    if owner.is_absent() {
        return Ok(Vec::new());
    }

    let (where_sql, bind_values) = scope_filter(owner, kind);
    let sql = format!(
        "SELECT id, {value} AS value, created_at, updated_at
         FROM {table}
         WHERE {where_sql}
         ORDER BY {value} ASC, id ASC;",
        value = kind.value_column(),
        table = kind.table(),
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(ChildRecord {
            id: row.get("id")?,
            owner,
            kind,
            value: read_value(row, kind)?.to_string(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        });
    }
    Ok(records)
}

fn load_rows(conn: &Connection, owner: Owner, kind: ChildKind) -> RepoResult<Vec<(i64, ChildValue)>> {
    let (where_sql, bind_values) = scope_filter(owner, kind);
    let sql = format!(
        "SELECT id, {value} AS value
         FROM {table}
         WHERE {where_sql}
         ORDER BY id ASC;",
        value = kind.value_column(),
        table = kind.table(),
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut existing = Vec::new();
    while let Some(row) = rows.next()? {
        existing.push((row.get("id")?, read_value(row, kind)?));
    }
    Ok(existing)
}

fn insert_child(
    conn: &Connection,
    owner: Owner,
    kind: ChildKind,
    value: &ChildValue,
    now: i64,
) -> RepoResult<()> {
    let owner_column = owner.parent_kind().owner_column();
    match kind.fax_flag() {
        Some(fax) => conn.execute(
            &format!(
                "INSERT INTO phones ({owner_column}, phone, fax, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4);"
            ),
            rusqlite::params![owner.id(), value, fax, now],
        )?,
        None => conn.execute(
            &format!(
                "INSERT INTO emails ({owner_column}, email, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3);"
            ),
            rusqlite::params![owner.id(), value, now],
        )?,
    };
    Ok(())
}

/// `WHERE` clause selecting one `(owner, kind)` scope.
fn scope_filter(owner: Owner, kind: ChildKind) -> (String, Vec<Value>) {
    let owner_column = owner.parent_kind().owner_column();
    let mut where_sql = format!("{owner_column} = ?");
    let mut bind_values = vec![Value::Integer(owner.id())];
    if let Some(fax) = kind.fax_flag() {
        where_sql.push_str(" AND fax = ?");
        bind_values.push(Value::Integer(i64::from(fax)));
    }
    (where_sql, bind_values)
}

fn read_value(row: &Row<'_>, kind: ChildKind) -> RepoResult<ChildValue> {
    match kind {
        ChildKind::Phone | ChildKind::Fax => match row.get::<_, Option<i64>>("value")? {
            Some(number) => Ok(ChildValue::Number(number)),
            None => Err(RepoError::InvalidData("null value in phones.phone".to_string())),
        },
        ChildKind::Email => match row.get::<_, Option<String>>("value")? {
            Some(text) => Ok(ChildValue::Text(text)),
            None => Err(RepoError::InvalidData("null value in emails.email".to_string())),
        },
    }
}

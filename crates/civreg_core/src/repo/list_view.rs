//! Aggregated (denormalized) list views.
//!
//! # Responsibility
//! - Describe each parent's list view declaratively (`ListViewSpec`).
//! - Assemble one grouped `LEFT JOIN` query per view and map its rows into
//!   `FlatRow`s and typed projections.
//!
//! # Invariants
//! - Every join is `LEFT JOIN`; parents without lookups or children still
//!   appear with `None` lookup values and empty arrays.
//! - Child arrays are distinct. Their order carries no meaning; they are
//!   sorted after decoding so output is stable.
//! - `GROUP BY` lists the parent id and the id of every joined lookup, so two
//!   lookups that share a name are never merged.
//! - Rows are ordered by parent `name ASC, id ASC`.
//! - Read-only. A query failure returns the storage error and no rows.

use crate::model::child::ChildKind;
use crate::model::company::CompanyListRow;
use crate::model::contact::ContactListRow;
use crate::model::owner::{ParentKind, RecordId};
use crate::repo::{ensure_tables, ref_from_db, RepoError, RepoResult};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};
use serde::Serialize;
use std::collections::BTreeMap;

const PARENT_ALIAS: &str = "p";

/// One-to-one join from a parent reference column to a named table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupJoin {
    pub alias: &'static str,
    pub table: &'static str,
    /// Reference column on the parent table.
    pub fk_column: &'static str,
    /// Output name for the joined row's `name`.
    pub output: &'static str,
}

/// One-to-many aggregate of one child kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildAggregate {
    pub alias: &'static str,
    pub kind: ChildKind,
    pub output: &'static str,
}

/// Declarative list view definition for one parent kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListViewSpec {
    pub parent: ParentKind,
    /// Extra parent columns copied as-is (besides `id` and `name`).
    pub columns: &'static [&'static str],
    pub lookups: &'static [LookupJoin],
    pub children: &'static [ChildAggregate],
}

pub const COMPANY_LIST_VIEW: ListViewSpec = ListViewSpec {
    parent: ParentKind::Company,
    columns: &["address"],
    lookups: &[LookupJoin {
        alias: "s",
        table: "scopes",
        fk_column: "scope_id",
        output: "scope_name",
    }],
    children: &[
        ChildAggregate {
            alias: "e",
            kind: ChildKind::Email,
            output: "emails",
        },
        ChildAggregate {
            alias: "ph",
            kind: ChildKind::Phone,
            output: "phones",
        },
        ChildAggregate {
            alias: "fx",
            kind: ChildKind::Fax,
            output: "faxes",
        },
    ],
};

pub const CONTACT_LIST_VIEW: ListViewSpec = ListViewSpec {
    parent: ParentKind::Contact,
    columns: &["company_id"],
    lookups: &[
        LookupJoin {
            alias: "co",
            table: "companies",
            fk_column: "company_id",
            output: "company_name",
        },
        LookupJoin {
            alias: "po",
            table: "posts",
            fk_column: "post_id",
            output: "post_name",
        },
    ],
    children: &[
        ChildAggregate {
            alias: "ph",
            kind: ChildKind::Phone,
            output: "phones",
        },
        ChildAggregate {
            alias: "fx",
            kind: ChildKind::Fax,
            output: "faxes",
        },
    ],
};

impl ListViewSpec {
    pub fn for_parent(parent: ParentKind) -> &'static ListViewSpec {
        match parent {
            ParentKind::Company => &COMPANY_LIST_VIEW,
            ParentKind::Contact => &CONTACT_LIST_VIEW,
        }
    }

    /// Tables the view reads.
    pub fn tables(&self) -> Vec<&'static str> {
        let mut tables = vec![self.parent.table()];
        tables.extend(self.lookups.iter().map(|lookup| lookup.table));
        tables.extend(self.children.iter().map(|child| child.kind.table()));
        tables.dedup();
        tables
    }

    /// Builds the grouped aggregate query for this view.
    pub fn to_sql(&self) -> String {
        let p = PARENT_ALIAS;
        let mut select = vec![format!("{p}.id AS id"), format!("{p}.name AS name")];
        select.extend(
            self.columns
                .iter()
                .map(|column| format!("{p}.{column} AS {column}")),
        );
        select.extend(
            self.lookups
                .iter()
                .map(|lookup| format!("{}.name AS {}", lookup.alias, lookup.output)),
        );
        // FILTER keeps LEFT JOIN misses out of the array, so a parent
        // without children aggregates to `[]` rather than `[null]`.
        select.extend(self.children.iter().map(|child| {
            let value = format!("{}.{}", child.alias, child.kind.value_column());
            format!(
                "json_group_array(DISTINCT {value}) FILTER (WHERE {value} IS NOT NULL) AS {}",
                child.output
            )
        }));

        let mut sql = format!(
            "SELECT\n    {}\nFROM {} AS {p}",
            select.join(",\n    "),
            self.parent.table()
        );
        for lookup in self.lookups {
            sql.push_str(&format!(
                "\nLEFT JOIN {table} AS {alias} ON {p}.{fk} = {alias}.id",
                table = lookup.table,
                alias = lookup.alias,
                fk = lookup.fk_column,
            ));
        }
        for child in self.children {
            sql.push_str(&format!(
                "\nLEFT JOIN {table} AS {alias} ON {alias}.{owner} = {p}.id",
                table = child.kind.table(),
                alias = child.alias,
                owner = self.parent.owner_column(),
            ));
            if let Some(fax) = child.kind.fax_flag() {
                sql.push_str(&format!(" AND {}.fax = {}", child.alias, i64::from(fax)));
            }
        }

        let mut group_by = vec![format!("{p}.id")];
        group_by.extend(
            self.lookups
                .iter()
                .map(|lookup| format!("{}.id", lookup.alias)),
        );
        sql.push_str(&format!("\nGROUP BY {}", group_by.join(", ")));
        sql.push_str(&format!("\nORDER BY {p}.name ASC, {p}.id ASC;"));
        sql
    }
}

/// Scalar parent column value in a flat row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlatValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Generic denormalized list row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
    pub id: RecordId,
    pub name: String,
    /// Extra parent columns keyed by column name.
    pub columns: BTreeMap<&'static str, FlatValue>,
    /// Joined lookup names keyed by output name; `None` on a join miss.
    pub lookups: BTreeMap<&'static str, Option<String>>,
    /// Distinct child values keyed by output name.
    pub children: BTreeMap<&'static str, Vec<String>>,
}

impl FlatRow {
    fn take_text(&mut self, column: &str) -> RepoResult<Option<String>> {
        match self.columns.remove(column) {
            None | Some(FlatValue::Null) => Ok(None),
            Some(FlatValue::Text(value)) => Ok(Some(value)),
            Some(other) => Err(RepoError::InvalidData(format!(
                "expected text in list column `{column}`, got {other:?}"
            ))),
        }
    }

    fn take_id(&mut self, column: &str) -> RepoResult<RecordId> {
        match self.columns.remove(column) {
            None | Some(FlatValue::Null) => Ok(ref_from_db(None)),
            Some(FlatValue::Integer(value)) => Ok(value),
            Some(other) => Err(RepoError::InvalidData(format!(
                "expected integer in list column `{column}`, got {other:?}"
            ))),
        }
    }

    fn take_lookup(&mut self, output: &str) -> Option<String> {
        self.lookups.remove(output).flatten()
    }

    fn take_children(&mut self, output: &str) -> Vec<String> {
        self.children.remove(output).unwrap_or_default()
    }
}

impl TryFrom<FlatRow> for CompanyListRow {
    type Error = RepoError;

    fn try_from(mut row: FlatRow) -> Result<Self, Self::Error> {
        Ok(CompanyListRow {
            address: row.take_text("address")?,
            scope_name: row.take_lookup("scope_name"),
            emails: row.take_children("emails"),
            phones: row.take_children("phones"),
            faxes: row.take_children("faxes"),
            id: row.id,
            name: row.name,
        })
    }
}

impl TryFrom<FlatRow> for ContactListRow {
    type Error = RepoError;

    fn try_from(mut row: FlatRow) -> Result<Self, Self::Error> {
        Ok(ContactListRow {
            company_id: row.take_id("company_id")?,
            company_name: row.take_lookup("company_name"),
            post_name: row.take_lookup("post_name"),
            phones: row.take_children("phones"),
            faxes: row.take_children("faxes"),
            id: row.id,
            name: row.name,
        })
    }
}

/// Read-side interface producing aggregated list views.
pub trait ListViewRepository {
    fn list_view(&self, parent: ParentKind) -> RepoResult<Vec<FlatRow>>;
    fn list_companies(&self) -> RepoResult<Vec<CompanyListRow>>;
    fn list_contacts(&self) -> RepoResult<Vec<ContactListRow>>;
}

/// SQLite-backed list view builder.
pub struct SqliteListViewRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteListViewRepository<'conn> {
    /// Constructs a builder from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for spec in [&COMPANY_LIST_VIEW, &CONTACT_LIST_VIEW] {
            ensure_tables(conn, &spec.tables())?;
        }
        Ok(Self { conn })
    }
}

impl ListViewRepository for SqliteListViewRepository<'_> {
    fn list_view(&self, parent: ParentKind) -> RepoResult<Vec<FlatRow>> {
        query_list_view(self.conn, ListViewSpec::for_parent(parent))
    }

    fn list_companies(&self) -> RepoResult<Vec<CompanyListRow>> {
        list_companies(self.conn)
    }

    fn list_contacts(&self) -> RepoResult<Vec<ContactListRow>> {
        list_contacts(self.conn)
    }
}

pub(crate) fn list_companies(conn: &Connection) -> RepoResult<Vec<CompanyListRow>> {
    query_list_view(conn, &COMPANY_LIST_VIEW)?
        .into_iter()
        .map(CompanyListRow::try_from)
        .collect()
}

pub(crate) fn list_contacts(conn: &Connection) -> RepoResult<Vec<ContactListRow>> {
    query_list_view(conn, &CONTACT_LIST_VIEW)?
        .into_iter()
        .map(ContactListRow::try_from)
        .collect()
}

/// Runs one list view query and maps every row.
pub fn query_list_view(conn: &Connection, spec: &ListViewSpec) -> RepoResult<Vec<FlatRow>> {
    let mut stmt = conn.prepare(&spec.to_sql())?;
    let mut rows = stmt.query([])?;
    let mut flat_rows = Vec::new();
    while let Some(row) = rows.next()? {
        flat_rows.push(map_flat_row(row, spec)?);
    }
    Ok(flat_rows)
}

fn map_flat_row(row: &Row<'_>, spec: &ListViewSpec) -> RepoResult<FlatRow> {
    let mut columns = BTreeMap::new();
    for column in spec.columns {
        columns.insert(*column, read_flat_value(row, column)?);
    }

    let mut lookups = BTreeMap::new();
    for lookup in spec.lookups {
        lookups.insert(lookup.output, row.get::<_, Option<String>>(lookup.output)?);
    }

    let mut children = BTreeMap::new();
    for child in spec.children {
        let encoded: String = row.get(child.output)?;
        children.insert(child.output, decode_child_array(child.output, &encoded)?);
    }

    Ok(FlatRow {
        id: row.get("id")?,
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        columns,
        lookups,
        children,
    })
}

fn read_flat_value(row: &Row<'_>, column: &str) -> RepoResult<FlatValue> {
    match row.get_ref(column)? {
        ValueRef::Null => Ok(FlatValue::Null),
        ValueRef::Integer(value) => Ok(FlatValue::Integer(value)),
        ValueRef::Real(value) => Ok(FlatValue::Real(value)),
        ValueRef::Text(bytes) => Ok(FlatValue::Text(
            String::from_utf8_lossy(bytes).into_owned(),
        )),
        ValueRef::Blob(_) => Err(RepoError::InvalidData(format!(
            "unexpected blob in list column `{column}`"
        ))),
    }
}

/// Decodes a `json_group_array` result into display strings.
///
/// Numbers are rendered in decimal; `null` entries are dropped.
fn decode_child_array(output: &str, encoded: &str) -> RepoResult<Vec<String>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(encoded).map_err(|err| {
        RepoError::InvalidData(format!("invalid aggregate in list column `{output}`: {err}"))
    })?;

    let mut decoded = Vec::with_capacity(values.len());
    for value in values {
        match value {
            serde_json::Value::Null => {}
            serde_json::Value::String(text) => decoded.push(text),
            serde_json::Value::Number(number) => decoded.push(number.to_string()),
            other => {
                return Err(RepoError::InvalidData(format!(
                    "unexpected element {other} in list column `{output}`"
                )));
            }
        }
    }
    decoded.sort();
    decoded.dedup();
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::{decode_child_array, COMPANY_LIST_VIEW, CONTACT_LIST_VIEW};
    use crate::repo::RepoError;

    #[test]
    fn company_view_groups_by_parent_and_lookup_ids() {
        let sql = COMPANY_LIST_VIEW.to_sql();
        assert!(sql.contains("LEFT JOIN scopes AS s ON p.scope_id = s.id"));
        assert!(sql.contains("LEFT JOIN phones AS ph ON ph.company_id = p.id AND ph.fax = 0"));
        assert!(sql.contains("LEFT JOIN phones AS fx ON fx.company_id = p.id AND fx.fax = 1"));
        assert!(sql.contains("GROUP BY p.id, s.id"));
        assert!(sql.contains("ORDER BY p.name ASC, p.id ASC"));
    }

    #[test]
    fn contact_view_groups_by_every_joined_lookup() {
        let sql = CONTACT_LIST_VIEW.to_sql();
        assert!(sql.contains("GROUP BY p.id, co.id, po.id"));
        assert!(sql.contains("ph.contact_id = p.id"));
        assert!(!sql.contains("INNER JOIN"));
    }

    #[test]
    fn view_tables_list_each_table_once() {
        assert_eq!(
            COMPANY_LIST_VIEW.tables(),
            vec!["companies", "scopes", "emails", "phones"]
        );
    }

    #[test]
    fn decode_child_array_renders_numbers_and_drops_nulls() {
        let decoded = decode_child_array("phones", "[5555678,null,5551234]").unwrap();
        assert_eq!(decoded, vec!["5551234".to_string(), "5555678".to_string()]);
        assert!(decode_child_array("emails", "[]").unwrap().is_empty());
    }

    #[test]
    fn decode_child_array_rejects_malformed_payload() {
        let err = decode_child_array("emails", "not json").unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }
}

//! Company repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist company rows together with their phone/fax/email sets.
//! - Assemble the company detail read model (scope, children, contacts).
//!
//! # Invariants
//! - Create/update write the parent row and reconcile all three child sets
//!   in one immediate transaction.
//! - Delete wipes every child row before the company row, in one
//!   transaction. Contacts referencing the company are left as they are.

use crate::db::now_epoch_ms;
use crate::model::child::ChildKind;
use crate::model::company::{Company, CompanyListRow, CompanyRecord};
use crate::model::lookup::SelectItem;
use crate::model::owner::{Owner, RecordId, NO_ID};
use crate::repo::child_repo::{
    delete_all_children, load_children, normalize_desired, reconcile_values, ReconcileReport,
};
use crate::repo::contact_repo::load_company_contacts;
use crate::repo::list_view::list_companies;
use crate::repo::lookup_repo::{list_select_items, load_select_item};
use crate::repo::{ensure_tables, ref_from_db, ref_to_db, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

const COMPANY_TABLES: &[&str] = &[
    "companies",
    "contacts",
    "scopes",
    "departments",
    "posts",
    "phones",
    "emails",
];

/// Repository interface for companies.
pub trait CompanyRepository {
    /// Inserts the company and its child sets. Returns the new id.
    fn create_company(&mut self, company: &Company) -> RepoResult<RecordId>;
    /// Replaces company columns and reconciles its child sets. `0` is a
    /// no-op and the payload is not validated.
    fn update_company(&mut self, company: &Company) -> RepoResult<ReconcileReport>;
    /// Gets one company detail. `0` yields `None`.
    fn get_company(&self, id: RecordId) -> RepoResult<Option<CompanyRecord>>;
    /// Deletes one company and all of its phones, faxes and emails.
    fn delete_company(&mut self, id: RecordId) -> RepoResult<()>;
    fn get_company_select(&self, id: RecordId) -> RepoResult<Option<SelectItem>>;
    fn list_company_select(&self) -> RepoResult<Vec<SelectItem>>;
    /// Aggregated company list view.
    fn list_companies(&self) -> RepoResult<Vec<CompanyListRow>>;
}

/// SQLite-backed company repository.
pub struct SqliteCompanyRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteCompanyRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, COMPANY_TABLES)?;
        Ok(Self { conn })
    }

    fn begin(&mut self) -> RepoResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

impl CompanyRepository for SqliteCompanyRepository<'_> {
    fn create_company(&mut self, company: &Company) -> RepoResult<RecordId> {
        company.validate()?;
        let desired = normalize_desired(company.desired_children())?;

        let tx = self.begin()?;
        let now = now_epoch_ms();
        tx.execute(
            "INSERT INTO companies (
                name,
                address,
                scope_id,
                note,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![
                company.name.trim(),
                company.address.as_deref(),
                ref_to_db(company.scope_id),
                company.note.as_deref(),
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();

        for (kind, values) in &desired {
            reconcile_values(&tx, Owner::Company(id), *kind, values)?;
        }
        tx.commit()?;
        Ok(id)
    }

    fn update_company(&mut self, company: &Company) -> RepoResult<ReconcileReport> {
        if company.id == NO_ID {
            return Ok(ReconcileReport::default());
        }
        company.validate()?;
        let desired = normalize_desired(company.desired_children())?;

        let tx = self.begin()?;
        let changed = tx.execute(
            "UPDATE companies
             SET
                name = ?1,
                address = ?2,
                scope_id = ?3,
                note = ?4,
                updated_at = ?5
             WHERE id = ?6;",
            params![
                company.name.trim(),
                company.address.as_deref(),
                ref_to_db(company.scope_id),
                company.note.as_deref(),
                now_epoch_ms(),
                company.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "company",
                id: company.id,
            });
        }

        let mut report = ReconcileReport::default();
        for (kind, values) in &desired {
            report = report.merge(reconcile_values(&tx, company.owner(), *kind, values)?);
        }
        tx.commit()?;
        Ok(report)
    }

    fn get_company(&self, id: RecordId) -> RepoResult<Option<CompanyRecord>> {
        if id == NO_ID {
            return Ok(None);
        }

        let conn: &Connection = &*self.conn;
        let row = conn
            .query_row(
                "SELECT
                    id,
                    name,
                    address,
                    scope_id,
                    note,
                    created_at,
                    updated_at
                 FROM companies
                 WHERE id = ?1;",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>("name")?,
                        row.get::<_, Option<String>>("address")?,
                        row.get::<_, Option<RecordId>>("scope_id")?,
                        row.get::<_, Option<String>>("note")?,
                        row.get::<_, i64>("created_at")?,
                        row.get::<_, i64>("updated_at")?,
                    ))
                },
            )
            .optional()?;
        let Some((name, address, scope_id, note, created_at, updated_at)) = row else {
            return Err(RepoError::NotFound {
                entity: "company",
                id,
            });
        };

        let scope_id = ref_from_db(scope_id);
        let owner = Owner::Company(id);
        Ok(Some(CompanyRecord {
            id,
            name,
            address,
            scope_id,
            note,
            scope: load_select_item(conn, "scopes", scope_id)?,
            emails: load_children(conn, owner, ChildKind::Email)?,
            phones: load_children(conn, owner, ChildKind::Phone)?,
            faxes: load_children(conn, owner, ChildKind::Fax)?,
            contacts: load_company_contacts(conn, id)?,
            created_at,
            updated_at,
        }))
    }

    fn delete_company(&mut self, id: RecordId) -> RepoResult<()> {
        if id == NO_ID {
            return Ok(());
        }

        let tx = self.begin()?;
        delete_all_children(&tx, Owner::Company(id))?;
        let changed = tx.execute("DELETE FROM companies WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "company",
                id,
            });
        }
        tx.commit()?;
        Ok(())
    }

    fn get_company_select(&self, id: RecordId) -> RepoResult<Option<SelectItem>> {
        if id == NO_ID {
            return Ok(None);
        }
        match load_select_item(self.conn, "companies", id)? {
            Some(item) => Ok(Some(item)),
            None => Err(RepoError::NotFound {
                entity: "company",
                id,
            }),
        }
    }

    fn list_company_select(&self) -> RepoResult<Vec<SelectItem>> {
        list_select_items(self.conn, "companies")
    }

    fn list_companies(&self) -> RepoResult<Vec<CompanyListRow>> {
        list_companies(self.conn)
    }
}

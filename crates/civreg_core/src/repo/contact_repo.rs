//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist contact rows together with their phone/fax/email sets.
//! - Resolve contact references (company, department, posts, rank) for the
//!   detail read model.
//!
//! # Invariants
//! - Create/update write the parent row and reconcile all three child sets
//!   in one immediate transaction.
//! - Delete wipes every child row before the contact row, in one transaction.
//! - Dangling references resolve to `None` instead of failing the read.

use crate::db::now_epoch_ms;
use crate::model::child::ChildKind;
use crate::model::company::CompanyContact;
use crate::model::contact::{Contact, ContactListRow, ContactRecord};
use crate::model::lookup::SelectItem;
use crate::model::owner::{Owner, RecordId, NO_ID};
use crate::repo::child_repo::{
    delete_all_children, load_children, normalize_desired, reconcile_values, ReconcileReport,
};
use crate::repo::list_view::list_contacts;
use crate::repo::lookup_repo::{list_select_items, load_select_item};
use crate::repo::{ensure_tables, ref_from_db, ref_to_db, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const CONTACT_TABLES: &[&str] = &[
    "contacts",
    "companies",
    "departments",
    "posts",
    "ranks",
    "phones",
    "emails",
];

/// Repository interface for contacts.
pub trait ContactRepository {
    /// Inserts the contact and its child sets. Returns the new id.
    fn create_contact(&mut self, contact: &Contact) -> RepoResult<RecordId>;
    /// Replaces contact columns and reconciles its child sets. `0` is a
    /// no-op and the payload is not validated.
    fn update_contact(&mut self, contact: &Contact) -> RepoResult<ReconcileReport>;
    /// Gets one contact detail. `0` yields `None`.
    fn get_contact(&self, id: RecordId) -> RepoResult<Option<ContactRecord>>;
    /// Deletes one contact and all of its phones, faxes and emails.
    fn delete_contact(&mut self, id: RecordId) -> RepoResult<()>;
    fn list_contact_select(&self) -> RepoResult<Vec<SelectItem>>;
    /// Contacts employed by one company, ordered by name.
    fn list_company_contacts(&self, company_id: RecordId) -> RepoResult<Vec<CompanyContact>>;
    /// Aggregated contact list view.
    fn list_contacts(&self) -> RepoResult<Vec<ContactListRow>>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, CONTACT_TABLES)?;
        Ok(Self { conn })
    }

    fn begin(&mut self) -> RepoResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn create_contact(&mut self, contact: &Contact) -> RepoResult<RecordId> {
        contact.validate()?;
        let desired = normalize_desired(contact.desired_children())?;

        let tx = self.begin()?;
        let now = now_epoch_ms();
        tx.execute(
            "INSERT INTO contacts (
                name,
                company_id,
                department_id,
                post_id,
                post_go_id,
                rank_id,
                birthday,
                note,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9);",
            params![
                contact.name.trim(),
                ref_to_db(contact.company_id),
                ref_to_db(contact.department_id),
                ref_to_db(contact.post_id),
                ref_to_db(contact.post_go_id),
                ref_to_db(contact.rank_id),
                contact.stored_birthday(),
                contact.note.as_deref(),
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();

        for (kind, values) in &desired {
            reconcile_values(&tx, Owner::Contact(id), *kind, values)?;
        }
        tx.commit()?;
        Ok(id)
    }

    fn update_contact(&mut self, contact: &Contact) -> RepoResult<ReconcileReport> {
        if contact.id == NO_ID {
            return Ok(ReconcileReport::default());
        }
        contact.validate()?;
        let desired = normalize_desired(contact.desired_children())?;

        let tx = self.begin()?;
        let changed = tx.execute(
            "UPDATE contacts
             SET
                name = ?1,
                company_id = ?2,
                department_id = ?3,
                post_id = ?4,
                post_go_id = ?5,
                rank_id = ?6,
                birthday = ?7,
                note = ?8,
                updated_at = ?9
             WHERE id = ?10;",
            params![
                contact.name.trim(),
                ref_to_db(contact.company_id),
                ref_to_db(contact.department_id),
                ref_to_db(contact.post_id),
                ref_to_db(contact.post_go_id),
                ref_to_db(contact.rank_id),
                contact.stored_birthday(),
                contact.note.as_deref(),
                now_epoch_ms(),
                contact.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "contact",
                id: contact.id,
            });
        }

        let mut report = ReconcileReport::default();
        for (kind, values) in &desired {
            report = report.merge(reconcile_values(&tx, contact.owner(), *kind, values)?);
        }
        tx.commit()?;
        Ok(report)
    }

    fn get_contact(&self, id: RecordId) -> RepoResult<Option<ContactRecord>> {
        if id == NO_ID {
            return Ok(None);
        }

        let conn: &Connection = &*self.conn;
        let row = conn
            .query_row(
                "SELECT
                    id,
                    name,
                    company_id,
                    department_id,
                    post_id,
                    post_go_id,
                    rank_id,
                    birthday,
                    note,
                    created_at,
                    updated_at
                 FROM contacts
                 WHERE id = ?1;",
                [id],
                parse_contact_columns,
            )
            .optional()?;
        let Some(columns) = row else {
            return Err(RepoError::NotFound {
                entity: "contact",
                id,
            });
        };

        let owner = Owner::Contact(id);
        Ok(Some(ContactRecord {
            company: load_select_item(conn, "companies", columns.company_id)?,
            department: load_select_item(conn, "departments", columns.department_id)?,
            post: load_select_item(conn, "posts", columns.post_id)?,
            post_go: load_select_item(conn, "posts", columns.post_go_id)?,
            rank: load_select_item(conn, "ranks", columns.rank_id)?,
            emails: load_children(conn, owner, ChildKind::Email)?,
            phones: load_children(conn, owner, ChildKind::Phone)?,
            faxes: load_children(conn, owner, ChildKind::Fax)?,
            id,
            name: columns.name,
            company_id: columns.company_id,
            department_id: columns.department_id,
            post_id: columns.post_id,
            post_go_id: columns.post_go_id,
            rank_id: columns.rank_id,
            birthday: columns.birthday,
            note: columns.note,
            created_at: columns.created_at,
            updated_at: columns.updated_at,
        }))
    }

    fn delete_contact(&mut self, id: RecordId) -> RepoResult<()> {
        if id == NO_ID {
            return Ok(());
        }

        let tx = self.begin()?;
        delete_all_children(&tx, Owner::Contact(id))?;
        let changed = tx.execute("DELETE FROM contacts WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "contact",
                id,
            });
        }
        tx.commit()?;
        Ok(())
    }

    fn list_contact_select(&self) -> RepoResult<Vec<SelectItem>> {
        list_select_items(self.conn, "contacts")
    }

    fn list_company_contacts(&self, company_id: RecordId) -> RepoResult<Vec<CompanyContact>> {
        load_company_contacts(self.conn, company_id)
    }

    fn list_contacts(&self) -> RepoResult<Vec<ContactListRow>> {
        list_contacts(self.conn)
    }
}

struct ContactColumns {
    name: String,
    company_id: RecordId,
    department_id: RecordId,
    post_id: RecordId,
    post_go_id: RecordId,
    rank_id: RecordId,
    birthday: Option<String>,
    note: Option<String>,
    created_at: i64,
    updated_at: i64,
}

fn parse_contact_columns(row: &Row<'_>) -> rusqlite::Result<ContactColumns> {
    Ok(ContactColumns {
        name: row.get("name")?,
        company_id: ref_from_db(row.get("company_id")?),
        department_id: ref_from_db(row.get("department_id")?),
        post_id: ref_from_db(row.get("post_id")?),
        post_go_id: ref_from_db(row.get("post_go_id")?),
        rank_id: ref_from_db(row.get("rank_id")?),
        birthday: row.get("birthday")?,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Loads contact summaries for one company, ordered by name.
pub(crate) fn load_company_contacts(
    conn: &Connection,
    company_id: RecordId,
) -> RepoResult<Vec<CompanyContact>> {
    if company_id == NO_ID {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT
            c.id AS id,
            c.name AS name,
            d.name AS department_name,
            po.name AS post_name,
            pog.name AS post_go_name
         FROM contacts AS c
         LEFT JOIN departments AS d ON c.department_id = d.id
         LEFT JOIN posts AS po ON c.post_id = po.id
         LEFT JOIN posts AS pog ON c.post_go_id = pog.id
         WHERE c.company_id = ?1
         ORDER BY c.name ASC, c.id ASC;",
    )?;
    let mut rows = stmt.query([company_id])?;
    let mut contacts = Vec::new();
    while let Some(row) = rows.next()? {
        contacts.push(CompanyContact {
            id: row.get("id")?,
            name: row.get("name")?,
            department_name: row.get("department_name")?,
            post_name: row.get("post_name")?,
            post_go_name: row.get("post_go_name")?,
        });
    }
    Ok(contacts)
}

//! Contact use-case service.

use crate::model::company::CompanyContact;
use crate::model::contact::{Contact, ContactListRow, ContactRecord};
use crate::model::lookup::SelectItem;
use crate::model::owner::RecordId;
use crate::repo::child_repo::ReconcileReport;
use crate::repo::contact_repo::ContactRepository;
use crate::repo::RepoResult;
use crate::service::{observe, ServiceOptions};

const MODULE: &str = "contact_service";

/// Use-case service wrapper for contact operations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
    options: ServiceOptions,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_options(repo, ServiceOptions::default())
    }

    pub fn with_options(repo: R, options: ServiceOptions) -> Self {
        Self { repo, options }
    }

    pub fn create_contact(&mut self, contact: &Contact) -> RepoResult<RecordId> {
        let repo = &mut self.repo;
        observe(self.options, "contact_create", MODULE, contact.id, || {
            repo.create_contact(contact)
        })
    }

    pub fn update_contact(&mut self, contact: &Contact) -> RepoResult<ReconcileReport> {
        let repo = &mut self.repo;
        observe(self.options, "contact_update", MODULE, contact.id, || {
            repo.update_contact(contact)
        })
    }

    pub fn get_contact(&self, id: RecordId) -> RepoResult<Option<ContactRecord>> {
        observe(self.options, "contact_get", MODULE, id, || {
            self.repo.get_contact(id)
        })
    }

    pub fn delete_contact(&mut self, id: RecordId) -> RepoResult<()> {
        let repo = &mut self.repo;
        observe(self.options, "contact_delete", MODULE, id, || {
            repo.delete_contact(id)
        })
    }

    pub fn list_contact_select(&self) -> RepoResult<Vec<SelectItem>> {
        observe(self.options, "contact_list_select", MODULE, 0, || {
            self.repo.list_contact_select()
        })
    }

    pub fn list_company_contacts(&self, company_id: RecordId) -> RepoResult<Vec<CompanyContact>> {
        observe(self.options, "contact_list_company", MODULE, company_id, || {
            self.repo.list_company_contacts(company_id)
        })
    }

    /// Aggregated contact rows ordered by name.
    pub fn list_contacts(&self) -> RepoResult<Vec<ContactListRow>> {
        observe(self.options, "contact_list", MODULE, 0, || {
            self.repo.list_contacts()
        })
    }
}

//! Company use-case service.
//!
//! # Responsibility
//! - Provide stable company entry points for core callers.
//! - Delegate persistence and reconciliation to repository implementations.

use crate::model::company::{Company, CompanyListRow, CompanyRecord};
use crate::model::lookup::SelectItem;
use crate::model::owner::RecordId;
use crate::repo::child_repo::ReconcileReport;
use crate::repo::company_repo::CompanyRepository;
use crate::repo::RepoResult;
use crate::service::{observe, ServiceOptions};

const MODULE: &str = "company_service";

/// Use-case service wrapper for company operations.
pub struct CompanyService<R: CompanyRepository> {
    repo: R,
    options: ServiceOptions,
}

impl<R: CompanyRepository> CompanyService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self::with_options(repo, ServiceOptions::default())
    }

    pub fn with_options(repo: R, options: ServiceOptions) -> Self {
        Self { repo, options }
    }

    /// Creates a company with its phones, faxes and emails.
    pub fn create_company(&mut self, company: &Company) -> RepoResult<RecordId> {
        let repo = &mut self.repo;
        observe(self.options, "company_create", MODULE, company.id, || {
            repo.create_company(company)
        })
    }

    /// Saves company changes and reconciles its child sets.
    ///
    /// Returns the combined child diff across phones, faxes and emails.
    pub fn update_company(&mut self, company: &Company) -> RepoResult<ReconcileReport> {
        let repo = &mut self.repo;
        observe(self.options, "company_update", MODULE, company.id, || {
            repo.update_company(company)
        })
    }

    pub fn get_company(&self, id: RecordId) -> RepoResult<Option<CompanyRecord>> {
        observe(self.options, "company_get", MODULE, id, || {
            self.repo.get_company(id)
        })
    }

    /// Deletes a company after wiping its child rows.
    pub fn delete_company(&mut self, id: RecordId) -> RepoResult<()> {
        let repo = &mut self.repo;
        observe(self.options, "company_delete", MODULE, id, || {
            repo.delete_company(id)
        })
    }

    pub fn get_company_select(&self, id: RecordId) -> RepoResult<Option<SelectItem>> {
        observe(self.options, "company_get_select", MODULE, id, || {
            self.repo.get_company_select(id)
        })
    }

    pub fn list_company_select(&self) -> RepoResult<Vec<SelectItem>> {
        observe(self.options, "company_list_select", MODULE, 0, || {
            self.repo.list_company_select()
        })
    }

    /// Aggregated company rows ordered by name.
    pub fn list_companies(&self) -> RepoResult<Vec<CompanyListRow>> {
        observe(self.options, "company_list", MODULE, 0, || {
            self.repo.list_companies()
        })
    }
}

//! Lookup table use-case service.

use crate::model::lookup::{LookupRecord, LookupTable, SelectItem};
use crate::model::owner::RecordId;
use crate::repo::lookup_repo::LookupRepository;
use crate::repo::RepoResult;
use crate::service::{observe, ServiceOptions};

const MODULE: &str = "lookup_service";

/// Use-case service wrapper for every lookup table.
pub struct LookupService<R: LookupRepository> {
    repo: R,
    options: ServiceOptions,
}

impl<R: LookupRepository> LookupService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_options(repo, ServiceOptions::default())
    }

    pub fn with_options(repo: R, options: ServiceOptions) -> Self {
        Self { repo, options }
    }

    pub fn get(&self, table: LookupTable, id: RecordId) -> RepoResult<Option<LookupRecord>> {
        observe(self.options, &event(table, "get"), MODULE, id, || {
            self.repo.get(table, id)
        })
    }

    pub fn get_select(&self, table: LookupTable, id: RecordId) -> RepoResult<Option<SelectItem>> {
        observe(self.options, &event(table, "get_select"), MODULE, id, || {
            self.repo.get_select(table, id)
        })
    }

    pub fn create(&self, table: LookupTable, record: &LookupRecord) -> RepoResult<RecordId> {
        observe(self.options, &event(table, "create"), MODULE, record.id, || {
            self.repo.create(table, record)
        })
    }

    pub fn update(&self, table: LookupTable, record: &LookupRecord) -> RepoResult<()> {
        observe(self.options, &event(table, "update"), MODULE, record.id, || {
            self.repo.update(table, record)
        })
    }

    pub fn delete(&self, table: LookupTable, id: RecordId) -> RepoResult<()> {
        observe(self.options, &event(table, "delete"), MODULE, id, || {
            self.repo.delete(table, id)
        })
    }

    pub fn list(&self, table: LookupTable) -> RepoResult<Vec<LookupRecord>> {
        observe(self.options, &event(table, "list"), MODULE, 0, || {
            self.repo.list(table)
        })
    }

    pub fn list_select(&self, table: LookupTable) -> RepoResult<Vec<SelectItem>> {
        observe(self.options, &event(table, "list_select"), MODULE, 0, || {
            self.repo.list_select(table)
        })
    }
}

/// `<entity>_<op>` event name, e.g. `scope_create`.
fn event(table: LookupTable, op: &str) -> String {
    format!("{}_{op}", table.entity_name())
}

//! Core data-access layer for the civil-defense registry.
//! Companies, contacts and their phone/fax/email sets live here together
//! with the reference tables they point at.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{open_registry, ConfigError, RegistryConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::child::{ChildKind, ChildRecord, ChildValue};
pub use model::company::{Company, CompanyContact, CompanyListRow, CompanyRecord};
pub use model::contact::{Contact, ContactListRow, ContactRecord};
pub use model::lookup::{LookupRecord, LookupTable, SelectItem};
pub use model::owner::{Owner, ParentKind, RecordId, NO_ID};
pub use model::validation::ValidationError;
pub use repo::child_repo::{ChildRepository, ReconcileReport, SqliteChildRepository};
pub use repo::company_repo::{CompanyRepository, SqliteCompanyRepository};
pub use repo::contact_repo::{ContactRepository, SqliteContactRepository};
pub use repo::list_view::{ListViewRepository, ListViewSpec, SqliteListViewRepository};
pub use repo::lookup_repo::{LookupRepository, SqliteLookupRepository};
pub use repo::{RepoError, RepoResult};
pub use service::company_service::CompanyService;
pub use service::contact_service::ContactService;
pub use service::lookup_service::LookupService;
pub use service::ServiceOptions;

/// Minimal health-check API for wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Emit start/ok/error diagnostics for every write and read.
//!
//! # Invariants
//! - Log lines carry ids, counts and durations only; names, phone numbers
//!   and email addresses never reach the log.
//! - Storage failures are returned unchanged; logging them is optional.

use crate::repo::RepoResult;
use log::{error, info};
use std::time::Instant;

pub mod company_service;
pub mod contact_service;
pub mod lookup_service;

/// Behavior switches shared by every service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Emit `status=error` events for failed calls.
    pub log_errors: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self { log_errors: true }
    }
}

/// Runs one service call and logs its outcome.
pub(crate) fn observe<T>(
    options: ServiceOptions,
    event: &str,
    module: &'static str,
    id: i64,
    call: impl FnOnce() -> RepoResult<T>,
) -> RepoResult<T> {
    let started_at = Instant::now();
    let result = call();
    match &result {
        Ok(_) => info!(
            "event={} module={} status=ok id={} duration_ms={}",
            event,
            module,
            id,
            started_at.elapsed().as_millis()
        ),
        Err(err) if options.log_errors => error!(
            "event={} module={} status=error id={} duration_ms={} error_code={}",
            event,
            module,
            id,
            started_at.elapsed().as_millis(),
            err.code()
        ),
        Err(_) => {}
    }
    result
}

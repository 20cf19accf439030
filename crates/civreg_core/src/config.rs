//! Registry runtime configuration.
//!
//! # Responsibility
//! - Parse JSON configuration with defaults for every field.
//! - Turn a configuration into a ready connection plus service options.
//!
//! # Invariants
//! - Missing `db_path` opens an isolated in-memory database.
//! - File logging starts only when `log_dir` is set.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::{default_log_level, init_logging};
use crate::service::ServiceOptions;
use rusqlite::Connection;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Runtime settings for one registry process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
    pub log_errors: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: None,
            log_dir: None,
            log_errors: true,
        }
    }
}

impl RegistryConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::Parse)
    }

    /// Configured level, falling back to the build default.
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            log_errors: self.log_errors,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Logging(String),
    Db(DbError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid registry config: {err}"),
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Logging(_) => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for ConfigError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Starts logging (when configured) and opens the registry database.
///
/// # Errors
/// - Logging settings are invalid or conflict with active logging.
/// - The database cannot be opened or migrated.
pub fn open_registry(config: &RegistryConfig) -> Result<Connection, ConfigError> {
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.effective_log_level(), log_dir).map_err(ConfigError::Logging)?;
    }

    let conn = match config.db_path.as_ref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    Ok(conn)
}

//! Child row kinds (phone/fax/email) and desired-value normalization.
//!
//! # Responsibility
//! - Describe where each child kind is stored and how it is partitioned.
//! - Turn caller-supplied raw strings into a canonical, deduplicated set.
//!
//! # Invariants
//! - `Phone` and `Fax` share the `phones` table and differ only by `fax`.
//! - Normalized values are the natural key within one `(owner, kind)` scope.
//! - Normalization fails on the first malformed value; nothing is written.

use super::owner::{Owner, RecordId};
use super::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::{ToSql, ToSqlOutput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

static PHONE_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-().]+").expect("valid phone separator regex"));
static PHONE_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,18}$").expect("valid phone digits regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("valid email regex"));

/// Reconcilable child subset of one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildKind {
    /// Voice number (`phones.fax = 0`).
    Phone,
    /// Fax number (`phones.fax = 1`).
    Fax,
    /// Email address.
    Email,
}

impl ChildKind {
    pub const ALL: [ChildKind; 3] = [ChildKind::Phone, ChildKind::Fax, ChildKind::Email];

    /// Child table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Phone | Self::Fax => "phones",
            Self::Email => "emails",
        }
    }

    /// Column holding the child value.
    pub fn value_column(self) -> &'static str {
        match self {
            Self::Phone | Self::Fax => "phone",
            Self::Email => "email",
        }
    }

    /// Discriminator value for the `fax` column, if the table has one.
    pub fn fax_flag(self) -> Option<bool> {
        match self {
            Self::Phone => Some(false),
            Self::Fax => Some(true),
            Self::Email => None,
        }
    }

    /// Name used in log events and list view column names.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Phone => "phones",
            Self::Fax => "faxes",
            Self::Email => "emails",
        }
    }

    /// Normalizes one raw value.
    ///
    /// Returns `Ok(None)` for values that mean "nothing" (blank text, phone
    /// `0`), which are skipped instead of persisted.
    pub fn normalize(self, raw: &str) -> Result<Option<ChildValue>, ValidationError> {
        match self {
            Self::Phone | Self::Fax => normalize_phone(raw).map(|v| v.map(ChildValue::Number)),
            Self::Email => normalize_email(raw).map(|v| v.map(ChildValue::Text)),
        }
    }

    /// Normalizes and deduplicates a full desired set.
    pub fn normalize_all(
        self,
        desired: &[String],
    ) -> Result<BTreeSet<ChildValue>, ValidationError> {
        let mut unique = BTreeSet::new();
        for raw in desired {
            if let Some(value) = self.normalize(raw)? {
                unique.insert(value);
            }
        }
        Ok(unique)
    }
}

/// Canonical child value as stored in SQLite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildValue {
    /// Phone/fax number stored as `INTEGER`.
    Number(i64),
    /// Email address stored as `TEXT`.
    Text(String),
}

impl Display for ChildValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl ToSql for ChildValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Number(value) => value.to_sql(),
            Self::Text(value) => value.to_sql(),
        }
    }
}

/// Persisted child row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub id: RecordId,
    pub owner: Owner,
    pub kind: ChildKind,
    /// Canonical value: digits for phones/faxes, trimmed address for emails.
    pub value: String,
    /// Insert time in epoch milliseconds.
    pub created_at: i64,
    /// Last write time in epoch milliseconds.
    pub updated_at: i64,
}

/// Normalizes a phone/fax number to its integer form.
///
/// Strips whitespace, `-`, `(`, `)`, `.` and one leading `+`.
pub fn normalize_phone(raw: &str) -> Result<Option<i64>, ValidationError> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits = PHONE_SEPARATOR_RE.replace_all(unsigned, "");
    if digits.is_empty() {
        if trimmed.is_empty() {
            return Ok(None);
        }
        return Err(ValidationError::InvalidPhone(trimmed.to_string()));
    }
    if !PHONE_DIGITS_RE.is_match(&digits) {
        return Err(ValidationError::InvalidPhone(trimmed.to_string()));
    }

    let number = digits
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidPhone(trimmed.to_string()))?;
    if number == 0 {
        return Ok(None);
    }
    Ok(Some(number))
}

/// Normalizes an email address (trim only; comparison stays exact).
pub fn normalize_email(raw: &str) -> Result<Option<String>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !EMAIL_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidEmail(trimmed.to_string()));
    }
    Ok(Some(trimmed.to_string()))
}

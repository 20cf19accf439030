//! Input validation errors for registry writes.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected caller input. Raised before any SQL mutation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Entity name is empty or whitespace.
    EmptyName { entity: &'static str },
    /// An id or reference id is negative.
    NegativeId {
        entity: &'static str,
        field: &'static str,
        value: i64,
    },
    /// Phone/fax value is not a number after stripping separators.
    InvalidPhone(String),
    /// Email value is not `local@domain`.
    InvalidEmail(String),
    /// Birthday is not `YYYY-MM-DD`.
    InvalidBirthday(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName { entity } => write!(f, "{entity} name must not be empty"),
            Self::NegativeId {
                entity,
                field,
                value,
            } => write!(f, "{entity}.{field} must not be negative, got {value}"),
            Self::InvalidPhone(value) => write!(f, "invalid phone number `{value}`"),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::InvalidBirthday(value) => {
                write!(f, "invalid birthday `{value}`; expected YYYY-MM-DD")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_name(entity: &'static str, name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName { entity });
    }
    Ok(())
}

pub(crate) fn require_non_negative(
    entity: &'static str,
    field: &'static str,
    value: i64,
) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeId {
            entity,
            field,
            value,
        });
    }
    Ok(())
}

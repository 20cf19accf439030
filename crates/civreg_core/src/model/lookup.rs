//! Lookup (reference) tables and the shared dropdown item shape.

use super::owner::{RecordId, NO_ID};
use super::validation::{require_name, require_non_negative, ValidationError};
use serde::{Deserialize, Serialize};

/// Flat `{id, name, note}` reference tables referenced by id from parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupTable {
    Department,
    Post,
    Rank,
    Scope,
    Kind,
    SirenType,
    HideoutType,
}

impl LookupTable {
    pub const ALL: [LookupTable; 7] = [
        LookupTable::Department,
        LookupTable::Post,
        LookupTable::Rank,
        LookupTable::Scope,
        LookupTable::Kind,
        LookupTable::SirenType,
        LookupTable::HideoutType,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            Self::Department => "departments",
            Self::Post => "posts",
            Self::Rank => "ranks",
            Self::Scope => "scopes",
            Self::Kind => "kinds",
            Self::SirenType => "siren_types",
            Self::HideoutType => "hideout_types",
        }
    }

    pub fn entity_name(self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::Post => "post",
            Self::Rank => "rank",
            Self::Scope => "scope",
            Self::Kind => "kind",
            Self::SirenType => "siren_type",
            Self::HideoutType => "hideout_type",
        }
    }
}

/// One lookup row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LookupRecord {
    pub id: RecordId,
    pub name: String,
    pub note: Option<String>,
}

impl LookupRecord {
    /// Creates an unsaved record (`id = 0`).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NO_ID,
            name: name.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn validate(&self, table: LookupTable) -> Result<(), ValidationError> {
        require_non_negative(table.entity_name(), "id", self.id)?;
        require_name(table.entity_name(), &self.name)
    }
}

/// `{id, name}` pair used by UI dropdowns for every entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectItem {
    pub id: RecordId,
    pub name: String,
}

//! Identity and ownership types shared by parents and their child rows.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Database row id. `0` is the "absent" sentinel.
pub type RecordId = i64;

/// Sentinel id meaning "no entity".
pub const NO_ID: RecordId = 0;

/// Parent entity kinds that own child rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    Company,
    Contact,
}

impl ParentKind {
    /// Parent table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Company => "companies",
            Self::Contact => "contacts",
        }
    }

    /// Column on child tables that references this parent kind.
    pub fn owner_column(self) -> &'static str {
        match self {
            Self::Company => "company_id",
            Self::Contact => "contact_id",
        }
    }

    /// Entity name used in errors and log events.
    pub fn entity_name(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Contact => "contact",
        }
    }

    /// Builds the owner handle for one parent id of this kind.
    pub fn owner(self, id: RecordId) -> Owner {
        match self {
            Self::Company => Owner::Company(id),
            Self::Contact => Owner::Contact(id),
        }
    }
}

/// Owner of a child row.
///
/// Persisted as the `company_id`/`contact_id` column pair with exactly one
/// column set; the pair is never exposed outside the repository layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Owner {
    Company(RecordId),
    Contact(RecordId),
}

impl Owner {
    pub fn id(self) -> RecordId {
        match self {
            Self::Company(id) | Self::Contact(id) => id,
        }
    }

    pub fn parent_kind(self) -> ParentKind {
        match self {
            Self::Company(_) => ParentKind::Company,
            Self::Contact(_) => ParentKind::Contact,
        }
    }

    /// Returns whether this owner carries the sentinel id.
    pub fn is_absent(self) -> bool {
        self.id() == NO_ID
    }
}

impl Display for Owner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.parent_kind().entity_name(), self.id())
    }
}

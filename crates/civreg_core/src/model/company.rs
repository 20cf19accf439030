//! Company parent entity and its read models.

use super::child::{ChildKind, ChildRecord};
use super::lookup::SelectItem;
use super::owner::{Owner, RecordId, NO_ID};
use super::validation::{require_name, require_non_negative, ValidationError};
use serde::{Deserialize, Serialize};

/// Company write model: parent columns plus the complete desired child sets.
///
/// `scope_id = 0` means "no scope" and is stored as `NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Company {
    pub id: RecordId,
    pub name: String,
    pub address: Option<String>,
    pub scope_id: RecordId,
    pub note: Option<String>,
    /// Desired email addresses.
    #[serde(default)]
    pub emails: Vec<String>,
    /// Desired voice numbers.
    #[serde(default)]
    pub phones: Vec<String>,
    /// Desired fax numbers.
    #[serde(default)]
    pub faxes: Vec<String>,
}

impl Company {
    /// Creates an unsaved company (`id = 0`) with no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NO_ID,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn owner(&self) -> Owner {
        Owner::Company(self.id)
    }

    /// Desired child sets keyed by kind, in reconcile order.
    pub fn desired_children(&self) -> [(ChildKind, &[String]); 3] {
        [
            (ChildKind::Email, self.emails.as_slice()),
            (ChildKind::Phone, self.phones.as_slice()),
            (ChildKind::Fax, self.faxes.as_slice()),
        ]
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_negative("company", "id", self.id)?;
        require_non_negative("company", "scope_id", self.scope_id)?;
        require_name("company", &self.name)?;
        for (kind, values) in self.desired_children() {
            kind.normalize_all(values)?;
        }
        Ok(())
    }
}

/// Company detail read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: RecordId,
    pub name: String,
    pub address: Option<String>,
    pub scope_id: RecordId,
    pub note: Option<String>,
    pub scope: Option<SelectItem>,
    pub emails: Vec<ChildRecord>,
    pub phones: Vec<ChildRecord>,
    pub faxes: Vec<ChildRecord>,
    pub contacts: Vec<CompanyContact>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CompanyRecord {
    /// Converts the read model back into a write model with the current
    /// child values as the desired sets.
    pub fn to_company(&self) -> Company {
        let values = |records: &[ChildRecord]| {
            records
                .iter()
                .map(|record| record.value.clone())
                .collect::<Vec<_>>()
        };
        Company {
            id: self.id,
            name: self.name.clone(),
            address: self.address.clone(),
            scope_id: self.scope_id,
            note: self.note.clone(),
            emails: values(&self.emails),
            phones: values(&self.phones),
            faxes: values(&self.faxes),
        }
    }
}

/// Contact summary shown on a company detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyContact {
    pub id: RecordId,
    pub name: String,
    pub department_name: Option<String>,
    pub post_name: Option<String>,
    pub post_go_name: Option<String>,
}

/// Flattened company row for list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyListRow {
    pub id: RecordId,
    pub name: String,
    pub address: Option<String>,
    pub scope_name: Option<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub faxes: Vec<String>,
}

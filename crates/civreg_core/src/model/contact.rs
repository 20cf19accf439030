//! Contact parent entity and its read models.

use super::child::{ChildKind, ChildRecord};
use super::lookup::SelectItem;
use super::owner::{Owner, RecordId, NO_ID};
use super::validation::{require_name, require_non_negative, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static BIRTHDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$")
        .expect("valid birthday regex")
});

/// Contact write model: parent columns plus the complete desired child sets.
///
/// Reference ids use `0` for "not set"; they are stored as `NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub id: RecordId,
    pub name: String,
    pub company_id: RecordId,
    pub department_id: RecordId,
    pub post_id: RecordId,
    /// Civil-defense ("GO") post, a second reference into `posts`.
    pub post_go_id: RecordId,
    pub rank_id: RecordId,
    /// `YYYY-MM-DD`.
    pub birthday: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub faxes: Vec<String>,
}

impl Contact {
    /// Creates an unsaved contact (`id = 0`) with no references or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NO_ID,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn owner(&self) -> Owner {
        Owner::Contact(self.id)
    }

    /// Desired child sets keyed by kind, in reconcile order.
    pub fn desired_children(&self) -> [(ChildKind, &[String]); 3] {
        [
            (ChildKind::Email, self.emails.as_slice()),
            (ChildKind::Phone, self.phones.as_slice()),
            (ChildKind::Fax, self.faxes.as_slice()),
        ]
    }

    /// Birthday as persisted: trimmed, with blank text stored as `NULL`.
    pub fn stored_birthday(&self) -> Option<&str> {
        self.birthday
            .as_deref()
            .map(str::trim)
            .filter(|birthday| !birthday.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_negative("contact", "id", self.id)?;
        for (field, value) in [
            ("company_id", self.company_id),
            ("department_id", self.department_id),
            ("post_id", self.post_id),
            ("post_go_id", self.post_go_id),
            ("rank_id", self.rank_id),
        ] {
            require_non_negative("contact", field, value)?;
        }
        require_name("contact", &self.name)?;
        if let Some(birthday) = self.stored_birthday() {
            if !BIRTHDAY_RE.is_match(birthday) {
                return Err(ValidationError::InvalidBirthday(birthday.to_string()));
            }
        }
        for (kind, values) in self.desired_children() {
            kind.normalize_all(values)?;
        }
        Ok(())
    }
}

/// Contact detail read model with resolved references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: RecordId,
    pub name: String,
    pub company_id: RecordId,
    pub department_id: RecordId,
    pub post_id: RecordId,
    pub post_go_id: RecordId,
    pub rank_id: RecordId,
    pub birthday: Option<String>,
    pub note: Option<String>,
    pub company: Option<SelectItem>,
    pub department: Option<SelectItem>,
    pub post: Option<SelectItem>,
    pub post_go: Option<SelectItem>,
    pub rank: Option<SelectItem>,
    pub emails: Vec<ChildRecord>,
    pub phones: Vec<ChildRecord>,
    pub faxes: Vec<ChildRecord>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Flattened contact row for list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactListRow {
    pub id: RecordId,
    pub name: String,
    pub company_id: RecordId,
    pub company_name: Option<String>,
    pub post_name: Option<String>,
    pub phones: Vec<String>,
    pub faxes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::Contact;
    use crate::model::validation::ValidationError;

    #[test]
    fn validate_rejects_blank_name_and_negative_refs() {
        assert!(matches!(
            Contact::new("  ").validate(),
            Err(ValidationError::EmptyName { entity: "contact" })
        ));

        let mut contact = Contact::new("Ivanov");
        contact.rank_id = -1;
        assert!(matches!(
            contact.validate(),
            Err(ValidationError::NegativeId { field: "rank_id", .. })
        ));
    }

    #[test]
    fn validate_checks_birthday_format() {
        let mut contact = Contact::new("Petrov");
        contact.birthday = Some("1980-02-29".to_string());
        assert!(contact.validate().is_ok());

        contact.birthday = Some("   ".to_string());
        assert!(contact.validate().is_ok());
        assert_eq!(contact.stored_birthday(), None);

        contact.birthday = Some(" 1980-02-29 ".to_string());
        assert_eq!(contact.stored_birthday(), Some("1980-02-29"));

        contact.birthday = Some("29.02.1980".to_string());
        assert!(matches!(
            contact.validate(),
            Err(ValidationError::InvalidBirthday(_))
        ));
    }

    #[test]
    fn validate_checks_child_values() {
        let mut contact = Contact::new("Sidorov");
        contact.emails = vec!["not an email".to_string()];
        assert!(matches!(
            contact.validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }
}

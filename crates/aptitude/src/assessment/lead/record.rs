use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::FieldIssue;

/// Lead-capture form fields, named as the form submits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeadField {
    Name,
    Email,
    Phone,
    Password,
    ConfirmPassword,
    AgreeToTerms,
}

impl LeadField {
    pub const ALL: [LeadField; 6] = [
        LeadField::Name,
        LeadField::Email,
        LeadField::Phone,
        LeadField::Password,
        LeadField::ConfirmPassword,
        LeadField::AgreeToTerms,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LeadField::Name => "name",
            LeadField::Email => "email",
            LeadField::Phone => "phone",
            LeadField::Password => "password",
            LeadField::ConfirmPassword => "confirmPassword",
            LeadField::AgreeToTerms => "agreeToTerms",
        }
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single edit from the lead-capture form, e.g. `{"field": "email", "value": "a@b.co"}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum LeadEdit {
    Name(String),
    Email(String),
    Phone(String),
    Password(String),
    ConfirmPassword(String),
    AgreeToTerms(bool),
}

impl LeadEdit {
    pub fn field(&self) -> LeadField {
        match self {
            LeadEdit::Name(_) => LeadField::Name,
            LeadEdit::Email(_) => LeadField::Email,
            LeadEdit::Phone(_) => LeadField::Phone,
            LeadEdit::Password(_) => LeadField::Password,
            LeadEdit::ConfirmPassword(_) => LeadField::ConfirmPassword,
            LeadEdit::AgreeToTerms(_) => LeadField::AgreeToTerms,
        }
    }
}

impl fmt::Debug for LeadEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadEdit::Password(_) | LeadEdit::ConfirmPassword(_) => {
                write!(f, "LeadEdit::{}(<redacted>)", self.field())
            }
            LeadEdit::Name(value) | LeadEdit::Email(value) | LeadEdit::Phone(value) => {
                write!(f, "LeadEdit::{}({value:?})", self.field())
            }
            LeadEdit::AgreeToTerms(accepted) => write!(f, "LeadEdit::agreeToTerms({accepted})"),
        }
    }
}

/// Current validity of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValidity {
    Valid,
    Invalid(FieldIssue),
}

impl FieldValidity {
    pub fn is_valid(&self) -> bool {
        matches!(self, FieldValidity::Valid)
    }
}

/// Identity and consent data captured before results are shown.
///
/// Passwords never leave this type through `Serialize` or `Debug`.
#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    name: String,
    email: String,
    phone: String,
    #[serde(skip_serializing)]
    password: String,
    #[serde(skip_serializing)]
    confirm_password: String,
    agree_to_terms: bool,
    validity: BTreeMap<LeadField, FieldValidity>,
}

impl LeadRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub(crate) fn confirm_password(&self) -> &str {
        &self.confirm_password
    }

    pub fn agree_to_terms(&self) -> bool {
        self.agree_to_terms
    }

    /// Per-field validity as of the most recent edit.
    pub fn validity(&self) -> &BTreeMap<LeadField, FieldValidity> {
        &self.validity
    }

    pub fn is_field_valid(&self, field: LeadField) -> bool {
        self.validity
            .get(&field)
            .map(FieldValidity::is_valid)
            .unwrap_or(false)
    }

    /// True once every field passed its most recent check.
    pub fn is_valid(&self) -> bool {
        LeadField::ALL
            .iter()
            .all(|field| self.is_field_valid(*field))
    }

    pub(crate) fn set(&mut self, edit: LeadEdit) {
        match edit {
            LeadEdit::Name(value) => self.name = value,
            LeadEdit::Email(value) => self.email = value,
            LeadEdit::Phone(value) => self.phone = value,
            LeadEdit::Password(value) => self.password = value,
            LeadEdit::ConfirmPassword(value) => self.confirm_password = value,
            LeadEdit::AgreeToTerms(accepted) => self.agree_to_terms = accepted,
        }
    }

    pub(crate) fn refresh_validity(&mut self, issues: &BTreeMap<LeadField, FieldIssue>) {
        self.validity = LeadField::ALL
            .iter()
            .map(|field| {
                let validity = match issues.get(field) {
                    Some(issue) => FieldValidity::Invalid(issue.clone()),
                    None => FieldValidity::Valid,
                };
                (*field, validity)
            })
            .collect();
    }
}

impl fmt::Debug for LeadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeadRecord")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .field("agree_to_terms", &self.agree_to_terms)
            .field("validity", &self.validity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_deserialize_from_form_payloads() {
        let edit: LeadEdit =
            serde_json::from_str(r#"{"field":"confirmPassword","value":"Abc123!"}"#)
                .expect("edit parses");
        assert_eq!(edit.field(), LeadField::ConfirmPassword);

        let edit: LeadEdit = serde_json::from_str(r#"{"field":"agreeToTerms","value":true}"#)
            .expect("edit parses");
        assert_eq!(edit, LeadEdit::AgreeToTerms(true));

        assert!(
            serde_json::from_str::<LeadEdit>(r#"{"field":"agreeToTerms","value":"yes"}"#).is_err()
        );
    }

    #[test]
    fn passwords_are_redacted_from_debug_and_json() {
        let mut record = LeadRecord::default();
        record.set(LeadEdit::Name("Sam".to_string()));
        record.set(LeadEdit::Password("Secret99".to_string()));
        record.set(LeadEdit::ConfirmPassword("Secret99".to_string()));

        let debug = format!("{record:?}");
        assert!(!debug.contains("Secret99"));
        assert!(debug.contains("Sam"));

        let json = serde_json::to_string(&record).expect("serializes");
        assert!(!json.contains("Secret99"));
        assert!(json.contains("agreeToTerms"));

        let edit = format!("{:?}", LeadEdit::Password("Secret99".to_string()));
        assert!(!edit.contains("Secret99"));
    }
}

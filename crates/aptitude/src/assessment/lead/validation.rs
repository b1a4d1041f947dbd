use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::{LeadField, LeadRecord};

const MIN_PHONE_DIGITS: usize = 7;

/// Minimum-strength rule applied to lead passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_letter: bool,
    pub require_digit: bool,
    pub require_symbol: bool,
    pub require_uppercase: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_letter: true,
            require_digit: true,
            require_symbol: false,
            require_uppercase: false,
        }
    }
}

/// Externally configured rules for the lead-capture form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPolicy {
    pub password: PasswordPolicy,
    pub require_phone: bool,
}

impl Default for LeadPolicy {
    fn default() -> Self {
        Self {
            password: PasswordPolicy::default(),
            require_phone: true,
        }
    }
}

/// Why a single lead field is currently invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum FieldIssue {
    #[error("is required")]
    Missing,
    #[error("is not a valid email address")]
    InvalidEmail,
    #[error("is not a valid phone number")]
    InvalidPhone,
    #[error("must be at least {min_length} characters")]
    TooShort { min_length: usize },
    #[error("must contain a letter")]
    MissingLetter,
    #[error("must contain a digit")]
    MissingDigit,
    #[error("must contain a symbol")]
    MissingSymbol,
    #[error("must contain an uppercase letter")]
    MissingUppercase,
    #[error("does not match the password")]
    Mismatch,
    #[error("must be accepted")]
    NotAccepted,
}

/// Check every lead field independently. An empty map means the record may be released.
pub fn validate(record: &LeadRecord, policy: &LeadPolicy) -> BTreeMap<LeadField, FieldIssue> {
    let mut issues = BTreeMap::new();

    if record.name().trim().is_empty() {
        issues.insert(LeadField::Name, FieldIssue::Missing);
    }

    let email = record.email().trim();
    if email.is_empty() {
        issues.insert(LeadField::Email, FieldIssue::Missing);
    } else if !looks_like_email(email) {
        issues.insert(LeadField::Email, FieldIssue::InvalidEmail);
    }

    let phone = record.phone().trim();
    if phone.is_empty() {
        if policy.require_phone {
            issues.insert(LeadField::Phone, FieldIssue::Missing);
        }
    } else if !looks_like_phone(phone) {
        issues.insert(LeadField::Phone, FieldIssue::InvalidPhone);
    }

    let password = record.password();
    if password.is_empty() {
        issues.insert(LeadField::Password, FieldIssue::Missing);
    } else if let Some(issue) = password_issue(password, &policy.password) {
        issues.insert(LeadField::Password, issue);
    }

    let confirmation = record.confirm_password();
    if confirmation.is_empty() {
        issues.insert(LeadField::ConfirmPassword, FieldIssue::Missing);
    } else if confirmation != password {
        issues.insert(LeadField::ConfirmPassword, FieldIssue::Mismatch);
    }

    if !record.agree_to_terms() {
        issues.insert(LeadField::AgreeToTerms, FieldIssue::NotAccepted);
    }

    issues
}

fn password_issue(password: &str, policy: &PasswordPolicy) -> Option<FieldIssue> {
    if password.chars().count() < policy.min_length {
        return Some(FieldIssue::TooShort {
            min_length: policy.min_length,
        });
    }
    if policy.require_letter && !password.chars().any(char::is_alphabetic) {
        return Some(FieldIssue::MissingLetter);
    }
    if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        return Some(FieldIssue::MissingDigit);
    }
    if policy.require_uppercase && !password.chars().any(char::is_uppercase) {
        return Some(FieldIssue::MissingUppercase);
    }
    if policy.require_symbol
        && !password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        return Some(FieldIssue::MissingSymbol);
    }
    None
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, _)| !host.is_empty())
            .unwrap_or(false)
        && !domain.ends_with('.')
}

fn looks_like_phone(phone: &str) -> bool {
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'));
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    allowed && digits >= MIN_PHONE_DIGITS
}

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::lead::{FieldIssue, LeadField};
use super::taxonomy::{AssessmentType, CategoryId, OptionSymbol, QuestionId};

/// Raised while resolving or building taxonomy configuration. Not recoverable within a session.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown assessment type '{0}'")]
    UnknownAssessmentType(String),
    #[error("assessment type '{0}' is declared more than once")]
    DuplicateAssessmentType(AssessmentType),
    #[error("assessment type '{assessment_type}' declares no categories")]
    NoCategories { assessment_type: AssessmentType },
    #[error("assessment type '{assessment_type}' declares category '{category}' more than once")]
    DuplicateCategory {
        assessment_type: AssessmentType,
        category: CategoryId,
    },
    #[error("option '{option}' of '{assessment_type}' maps to undeclared category '{category}'")]
    OrphanCategory {
        assessment_type: AssessmentType,
        option: OptionSymbol,
        category: CategoryId,
    },
    #[error("symbol '{symbol}' of '{assessment_type}' is not a single ASCII letter")]
    InvalidSymbol {
        assessment_type: AssessmentType,
        symbol: char,
    },
    #[error("option '{option}' of '{assessment_type}' is mapped more than once")]
    DuplicateOption {
        assessment_type: AssessmentType,
        option: OptionSymbol,
    },
    #[error("assessment type '{assessment_type}' has an empty question bank")]
    EmptyQuestionBank { assessment_type: AssessmentType },
    #[error("question '{question}' of '{assessment_type}' is declared more than once")]
    DuplicateQuestion {
        assessment_type: AssessmentType,
        question: QuestionId,
    },
    #[error("question '{question}' of '{assessment_type}' offers no options")]
    QuestionWithoutOptions {
        assessment_type: AssessmentType,
        question: QuestionId,
    },
    #[error(
        "question '{question}' of '{assessment_type}' offers option '{option}' outside the answer alphabet"
    )]
    UnmappedOption {
        assessment_type: AssessmentType,
        question: QuestionId,
        option: OptionSymbol,
    },
    #[error("failed to read taxonomy definitions from {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("taxonomy definitions in {} are malformed", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// An answer that cannot be recorded. The existing response set is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidOptionError {
    #[error("'{raw}' is not a single-letter option symbol")]
    Malformed { raw: String },
    #[error("option '{option}' is not part of the '{assessment_type}' answer alphabet")]
    OutsideAlphabet {
        assessment_type: AssessmentType,
        question: QuestionId,
        option: OptionSymbol,
    },
    #[error("question '{question}' does not offer option '{option}'")]
    NotOffered {
        question: QuestionId,
        option: OptionSymbol,
    },
    #[error("question '{question}' is not part of the '{assessment_type}' question bank")]
    UnknownQuestion {
        assessment_type: AssessmentType,
        question: QuestionId,
    },
}

/// Lead record fields that blocked a release, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("lead record failed validation: {}", describe_failures(.failures))]
pub struct ValidationError {
    pub failures: BTreeMap<LeadField, FieldIssue>,
}

impl ValidationError {
    pub fn fields(&self) -> Vec<LeadField> {
        self.failures.keys().copied().collect()
    }

    pub fn issue(&self, field: LeadField) -> Option<&FieldIssue> {
        self.failures.get(&field)
    }
}

fn describe_failures(failures: &BTreeMap<LeadField, FieldIssue>) -> String {
    failures
        .iter()
        .map(|(field, issue)| format!("{field} {issue}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Umbrella error for the scoring and gating pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    InvalidOption(#[from] InvalidOptionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("lead record is finalized; '{0}' can no longer change")]
    LeadFinalized(LeadField),
    #[error("results were already released; answer to '{0}' was not recorded")]
    ResponsesClosed(QuestionId),
}

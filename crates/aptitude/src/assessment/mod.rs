//! Assessment scoring and results gating.
//!
//! Answers flow through the [`ResponseCollector`], are scored against a [`Taxonomy`] from the
//! [`TaxonomyRegistry`], and the resulting [`ScoreProfile`] is only exposed once the
//! [`LeadGate`] has validated the learner's lead record.

pub mod error;
pub mod import;
pub mod lead;
pub mod repository;
pub mod responses;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod taxonomy;

#[cfg(test)]
mod tests;

pub use error::{AssessmentError, ConfigurationError, InvalidOptionError, ValidationError};
pub use import::{ResponseImportError, ResponseImporter};
pub use lead::{
    validate, FieldIssue, FieldValidity, GateState, LeadEdit, LeadField, LeadGate, LeadPolicy,
    LeadRecord, PasswordPolicy,
};
pub use repository::{RepositoryError, SessionRepository};
pub use responses::{ProgressView, ResponseCollector, ResponseSet};
pub use router::assessment_router;
pub use scoring::{score, CategoryScore, ScoreProfile};
pub use service::{AssessmentService, AssessmentServiceError, LeadStatusView};
pub use session::{AssessmentSession, SessionId, SessionStatusView};
pub use taxonomy::{
    AssessmentType, Category, CategoryId, OptionRule, OptionSymbol, Question, QuestionId,
    Taxonomy, TaxonomyDefinition, TaxonomyRegistry, TaxonomySummary,
};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::assessment::lead::{LeadEdit, LeadPolicy};
use crate::assessment::repository::{RepositoryError, SessionRepository};
use crate::assessment::responses::ResponseSet;
use crate::assessment::session::{AssessmentSession, SessionId};
use crate::assessment::taxonomy::{
    definition, standard_definitions, OptionSymbol, QuestionId, Taxonomy, TaxonomyDefinition,
    TaxonomyRegistry,
};
use crate::assessment::AssessmentService;

const RIASEC_RULES: [(char, &[&str]); 18] = [
    ('a', &["R"]),
    ('d', &["R"]),
    ('g', &["R"]),
    ('b', &["I"]),
    ('e', &["I"]),
    ('h', &["I"]),
    ('c', &["A"]),
    ('f', &["A"]),
    ('i', &["A"]),
    ('j', &["S"]),
    ('m', &["S"]),
    ('p', &["S"]),
    ('k', &["E"]),
    ('n', &["E"]),
    ('q', &["E"]),
    ('l', &["C"]),
    ('o', &["C"]),
    ('r', &["C"]),
];

/// Three-question RIASEC bank where R, I and A can each be reached twice.
pub(super) fn scenario_definition() -> TaxonomyDefinition {
    definition(
        "riasec-mini",
        &["R", "I", "A", "S", "E", "C"],
        &RIASEC_RULES,
        &[("q1", "ac"), ("q2", "ab"), ("q3", "bf")],
    )
}

pub(super) fn scenario_taxonomy() -> Arc<Taxonomy> {
    Arc::new(Taxonomy::new(scenario_definition()).expect("scenario taxonomy valid"))
}

/// Two questions where `x` feeds both categories, for multi-category contributions.
pub(super) fn overlapping_taxonomy() -> Arc<Taxonomy> {
    Arc::new(
        Taxonomy::new(definition(
            "overlap",
            &["P", "Q"],
            &[('x', &["P", "Q"]), ('y', &["Q"])],
            &[("q1", "xy"), ("q2", "xy")],
        ))
        .expect("overlap taxonomy valid"),
    )
}

pub(super) fn responses(answers: &[(&str, char)]) -> ResponseSet {
    answers
        .iter()
        .map(|(question, option)| (QuestionId::from(*question), OptionSymbol(*option)))
        .collect()
}

pub(super) fn registry() -> Arc<TaxonomyRegistry> {
    let mut definitions = standard_definitions();
    definitions.push(scenario_definition());
    Arc::new(TaxonomyRegistry::from_definitions(definitions).expect("registry builds"))
}

pub(super) fn complete_lead() -> Vec<LeadEdit> {
    vec![
        LeadEdit::Name("Priya Raman".to_string()),
        LeadEdit::Email("priya@example.edu".to_string()),
        LeadEdit::Phone("515-555-0142".to_string()),
        LeadEdit::Password("Abc123!".to_string()),
        LeadEdit::ConfirmPassword("Abc123!".to_string()),
        LeadEdit::AgreeToTerms(true),
    ]
}

pub(super) fn session() -> AssessmentSession {
    AssessmentSession::new(
        SessionId("sess-test".to_string()),
        scenario_taxonomy(),
        LeadPolicy::default(),
    )
}

pub(super) fn build_service() -> (AssessmentService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AssessmentService::new(registry(), repository.clone(), LeadPolicy::default());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) sessions: Arc<Mutex<HashMap<SessionId, AssessmentSession>>>,
}

impl SessionRepository for MemoryRepository {
    fn insert(&self, session: AssessmentSession) -> Result<AssessmentSession, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(session.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id().clone(), session.clone());
        Ok(session)
    }

    fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut AssessmentSession) -> T,
    {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        let session = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        Ok(change(session))
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn insert(&self, _session: AssessmentSession) -> Result<AssessmentSession, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn modify<T, F>(&self, _id: &SessionId, _change: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut AssessmentSession) -> T,
    {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

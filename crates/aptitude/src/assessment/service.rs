use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::error::AssessmentError;
use super::lead::{GateState, LeadEdit, LeadPolicy, LeadRecord};
use super::repository::{RepositoryError, SessionRepository};
use super::responses::ProgressView;
use super::scoring::ScoreProfile;
use super::session::{AssessmentSession, SessionId, SessionStatusView};
use super::taxonomy::{OptionSymbol, QuestionId, TaxonomyRegistry, TaxonomySummary};

/// Service composing the taxonomy registry, lead policy, and session storage.
pub struct AssessmentService<R> {
    registry: Arc<TaxonomyRegistry>,
    repository: Arc<R>,
    lead_policy: LeadPolicy,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("sess-{id:06}"))
}

/// Lead form state returned after every edit.
#[derive(Debug, Clone, Serialize)]
pub struct LeadStatusView {
    pub session_id: SessionId,
    pub state: GateState,
    pub lead: LeadRecord,
}

impl<R> AssessmentService<R>
where
    R: SessionRepository + 'static,
{
    pub fn new(registry: Arc<TaxonomyRegistry>, repository: Arc<R>, lead_policy: LeadPolicy) -> Self {
        Self {
            registry,
            repository,
            lead_policy,
        }
    }

    pub fn registry(&self) -> &TaxonomyRegistry {
        &self.registry
    }

    pub fn catalogue(&self) -> Vec<TaxonomySummary> {
        self.registry.catalogue()
    }

    /// Open a session for `assessment_type`.
    pub fn start(&self, assessment_type: &str) -> Result<AssessmentSession, AssessmentServiceError> {
        let taxonomy = self
            .registry
            .get(assessment_type)
            .map_err(AssessmentError::from)?;
        let session = AssessmentSession::new(next_session_id(), taxonomy, self.lead_policy);

        let stored = self.repository.insert(session)?;
        info!(
            session_id = %stored.id().0,
            assessment_type = %stored.assessment_type(),
            "assessment session started"
        );
        Ok(stored)
    }

    pub fn record_answer(
        &self,
        session_id: &SessionId,
        question: QuestionId,
        option: OptionSymbol,
    ) -> Result<ProgressView, AssessmentServiceError> {
        let outcome = self.repository.modify(session_id, |session| {
            session
                .record(question, option)
                .map(|_| session.progress())
        })?;
        Ok(outcome?)
    }

    pub fn update_lead(
        &self,
        session_id: &SessionId,
        edit: LeadEdit,
    ) -> Result<LeadStatusView, AssessmentServiceError> {
        let outcome = self.repository.modify(session_id, |session| {
            session.update_lead(edit).map(|state| LeadStatusView {
                session_id: session_id.clone(),
                state,
                lead: session.lead().clone(),
            })
        })?;
        Ok(outcome?)
    }

    /// Score the session and release it through the lead gate.
    ///
    /// A rejected release still stores the refreshed validity map and gate state.
    pub fn submit(&self, session_id: &SessionId) -> Result<ScoreProfile, AssessmentServiceError> {
        let outcome = self
            .repository
            .modify(session_id, |session| session.submit())?;
        Ok(outcome?)
    }

    pub fn status(&self, session_id: &SessionId) -> Result<SessionStatusView, AssessmentServiceError> {
        Ok(self.load(session_id)?.status_view())
    }

    /// Released profile, or `None` while the session is still gated.
    pub fn profile(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ScoreProfile>, AssessmentServiceError> {
        Ok(self.load(session_id)?.get_profile().cloned())
    }

    /// Discard a session and everything it collected.
    pub fn abandon(&self, session_id: &SessionId) -> Result<(), AssessmentServiceError> {
        self.repository.remove(session_id)?;
        info!(session_id = %session_id.0, "assessment session abandoned");
        Ok(())
    }

    fn load(&self, session_id: &SessionId) -> Result<AssessmentSession, AssessmentServiceError> {
        let session = self
            .repository
            .fetch(session_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(session)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

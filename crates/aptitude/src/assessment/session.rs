use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::AssessmentError;
use super::lead::{GateState, LeadEdit, LeadGate, LeadPolicy, LeadRecord};
use super::responses::{ProgressView, ResponseCollector, ResponseSet};
use super::scoring::{score, ScoreProfile};
use super::taxonomy::{AssessmentType, OptionSymbol, QuestionId, Taxonomy};

/// Identifier wrapper for in-progress assessment sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// One learner's answers and lead record for one assessment.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: SessionId,
    collector: ResponseCollector,
    gate: LeadGate,
    started_at: DateTime<Utc>,
    released_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    pub fn new(id: SessionId, taxonomy: Arc<Taxonomy>, policy: LeadPolicy) -> Self {
        Self {
            id,
            collector: ResponseCollector::new(taxonomy),
            gate: LeadGate::new(policy),
            started_at: Utc::now(),
            released_at: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn assessment_type(&self) -> &AssessmentType {
        self.collector.taxonomy().assessment_type()
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        self.collector.taxonomy()
    }

    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    pub fn lead(&self) -> &LeadRecord {
        self.gate.record()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn released_at(&self) -> Option<DateTime<Utc>> {
        self.released_at
    }

    /// Record an answer. Answers are closed once the profile has been released.
    pub fn record(
        &mut self,
        question: QuestionId,
        option: OptionSymbol,
    ) -> Result<Option<OptionSymbol>, AssessmentError> {
        if self.gate.is_released() {
            return Err(AssessmentError::ResponsesClosed(question));
        }
        Ok(self.collector.record(question, option)?)
    }

    pub fn update_lead(&mut self, edit: LeadEdit) -> Result<GateState, AssessmentError> {
        self.gate.apply(edit)
    }

    pub fn completion_ratio(&self) -> f64 {
        self.collector.completion_ratio()
    }

    pub fn progress(&self) -> ProgressView {
        self.collector.progress()
    }

    pub fn snapshot(&self) -> ResponseSet {
        self.collector.snapshot()
    }

    /// Score the current answers and try to release them through the lead gate.
    pub fn submit(&mut self) -> Result<ScoreProfile, AssessmentError> {
        if let Some(profile) = self.gate.profile() {
            return Ok(profile.clone());
        }

        let profile = score(&self.collector.snapshot(), self.collector.taxonomy());
        let released = self.gate.attempt_release(profile)?;
        let released_at = Utc::now();
        self.released_at = Some(released_at);
        info!(
            session_id = %self.id.0,
            answered = released.answered,
            total = released.total_questions,
            "session results released"
        );
        Ok(released)
    }

    /// Released profile for presentation; `None` until the gate releases it.
    pub fn get_profile(&self) -> Option<&ScoreProfile> {
        self.gate.profile()
    }

    pub fn status_view(&self) -> SessionStatusView {
        SessionStatusView {
            session_id: self.id.clone(),
            assessment_type: self.assessment_type().clone(),
            state: self.state(),
            progress: self.progress(),
            lead: self.lead().clone(),
            started_at: self.started_at,
            released_at: self.released_at,
            profile: self.get_profile().cloned(),
        }
    }
}

/// Presentation view of a session. `profile` stays empty until release.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusView {
    pub session_id: SessionId,
    pub assessment_type: AssessmentType,
    pub state: GateState,
    pub progress: ProgressView,
    pub lead: LeadRecord,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
    pub profile: Option<ScoreProfile>,
}

//! Lead-capture gate guarding score profile visibility.

mod record;
mod validation;

pub use record::{FieldValidity, LeadEdit, LeadField, LeadRecord};
pub use validation::{validate, FieldIssue, LeadPolicy, PasswordPolicy};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::{AssessmentError, ValidationError};
use super::scoring::ScoreProfile;

/// Linear gate lifecycle: `Collecting -> Validated -> Released`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Collecting,
    Validated,
    Released,
}

impl GateState {
    pub const fn label(self) -> &'static str {
        match self {
            GateState::Collecting => "collecting",
            GateState::Validated => "validated",
            GateState::Released => "released",
        }
    }
}

/// Holds the lead record and releases a score profile once every field validates.
///
/// The gate never alters the profile it releases; it only controls whether one is visible.
#[derive(Debug, Clone)]
pub struct LeadGate {
    policy: LeadPolicy,
    record: LeadRecord,
    state: GateState,
    released: Option<ScoreProfile>,
}

impl LeadGate {
    pub fn new(policy: LeadPolicy) -> Self {
        let mut record = LeadRecord::default();
        record.refresh_validity(&validate(&record, &policy));
        Self {
            policy,
            record,
            state: GateState::Collecting,
            released: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn record(&self) -> &LeadRecord {
        &self.record
    }

    pub fn policy(&self) -> &LeadPolicy {
        &self.policy
    }

    /// Apply one form edit and re-run every field validation.
    pub fn apply(&mut self, edit: LeadEdit) -> Result<GateState, AssessmentError> {
        let field = edit.field();
        if self.state == GateState::Released {
            return Err(AssessmentError::LeadFinalized(field));
        }

        self.record.set(edit);
        let issues = validate(&self.record, &self.policy);
        self.record.refresh_validity(&issues);
        self.state = if issues.is_empty() {
            GateState::Validated
        } else {
            GateState::Collecting
        };

        debug!(
            %field,
            field_valid = self.record.is_field_valid(field),
            outstanding = issues.len(),
            state = self.state.label(),
            "applied lead edit"
        );
        Ok(self.state)
    }

    /// Release `profile` if the lead record validates.
    ///
    /// Once released, later calls return the stored profile and ignore `profile`.
    pub fn attempt_release(
        &mut self,
        profile: ScoreProfile,
    ) -> Result<ScoreProfile, ValidationError> {
        if let Some(released) = &self.released {
            debug!("lead gate already released; returning stored profile");
            return Ok(released.clone());
        }

        let failures = validate(&self.record, &self.policy);
        self.record.refresh_validity(&failures);
        if !failures.is_empty() {
            self.state = GateState::Collecting;
            let error = ValidationError { failures };
            warn!(fields = ?error.fields(), "lead gate rejected release");
            return Err(error);
        }

        self.state = GateState::Released;
        self.released = Some(profile.clone());
        info!(
            assessment_type = %profile.assessment_type,
            dominant = ?profile.dominant,
            "lead gate released score profile"
        );
        Ok(profile)
    }

    /// The released profile, or `None` before release.
    pub fn profile(&self) -> Option<&ScoreProfile> {
        self.released.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.state == GateState::Released
    }
}

use std::sync::{Arc, Barrier};
use std::thread;

use super::common::*;
use crate::assessment::error::{AssessmentError, ConfigurationError};
use crate::assessment::lead::{GateState, LeadEdit, LeadField, LeadPolicy};
use crate::assessment::repository::RepositoryError;
use crate::assessment::service::{AssessmentService, AssessmentServiceError};
use crate::assessment::session::SessionId;
use crate::assessment::taxonomy::{OptionSymbol, QuestionId};

#[test]
fn start_persists_a_collecting_session() {
    let (service, repository) = build_service();

    let session = service.start("riasec-mini").expect("session started");

    assert_eq!(session.state(), GateState::Collecting);
    assert!(session.id().0.starts_with("sess-"));
    let stored = repository
        .sessions
        .lock()
        .expect("repository mutex poisoned")
        .contains_key(session.id());
    assert!(stored);
}

#[test]
fn start_rejects_unknown_types() {
    let (service, _) = build_service();

    let outcome = service.start("mbti");

    assert!(matches!(
        outcome,
        Err(AssessmentServiceError::Assessment(AssessmentError::Configuration(
            ConfigurationError::UnknownAssessmentType(_)
        )))
    ));
}

#[test]
fn failed_submit_still_records_field_validity() {
    let (service, _) = build_service();
    let session = service.start("riasec-mini").expect("session started");
    let id = session.id().clone();
    service
        .update_lead(&id, LeadEdit::Name("Priya".to_string()))
        .expect("lead edit accepted");

    let outcome = service.submit(&id);

    assert!(matches!(
        outcome,
        Err(AssessmentServiceError::Assessment(AssessmentError::Validation(_)))
    ));
    let status = service.status(&id).expect("status");
    assert_eq!(status.state, GateState::Collecting);
    assert!(status.lead.is_field_valid(LeadField::Name));
    assert!(!status.lead.is_field_valid(LeadField::Email));
    assert!(service.profile(&id).expect("lookup").is_none());
}

#[test]
fn full_flow_releases_the_profile() {
    let (service, _) = build_service();
    let id = service.start("riasec-mini").expect("session started").id().clone();

    for (question, option) in [("q1", 'a'), ("q2", 'a'), ("q3", 'b')] {
        service
            .record_answer(&id, QuestionId::from(question), OptionSymbol(option))
            .expect("answer accepted");
    }
    let mut last = None;
    for edit in complete_lead() {
        last = Some(service.update_lead(&id, edit).expect("lead edit accepted"));
    }
    assert_eq!(last.map(|view| view.state), Some(GateState::Validated));

    let profile = service.submit(&id).expect("released");

    assert_eq!(profile.score_for("I").map(|s| s.normalized), Some(50));
    assert_eq!(service.profile(&id).expect("lookup"), Some(profile));
}

#[test]
fn abandon_discards_the_session() {
    let (service, _) = build_service();
    let id = service.start("disc").expect("session started").id().clone();

    service.abandon(&id).expect("abandoned");

    assert!(matches!(
        service.status(&id),
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound))
    ));
    assert!(matches!(
        service.abandon(&id),
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn missing_sessions_are_not_found() {
    let (service, _) = build_service();

    let outcome = service.record_answer(
        &SessionId("sess-missing".to_string()),
        QuestionId::from("q1"),
        OptionSymbol('a'),
    );

    assert!(matches!(
        outcome,
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn storage_failures_surface_as_repository_errors() {
    let service = AssessmentService::new(
        registry(),
        Arc::new(UnavailableRepository),
        LeadPolicy::default(),
    );

    assert!(matches!(
        service.start("riasec"),
        Err(AssessmentServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}

#[test]
fn catalogue_lists_every_registered_type() {
    let (service, _) = build_service();

    let types: Vec<_> = service
        .catalogue()
        .into_iter()
        .map(|summary| summary.assessment_type.0)
        .collect();

    assert_eq!(types, ["disc", "learning-style", "riasec", "riasec-mini"]);
}

#[test]
fn concurrent_lead_edits_cannot_undo_a_release() {
    let (service, _) = build_service();
    let id = service.start("riasec-mini").expect("session started").id().clone();
    for edit in complete_lead() {
        service.update_lead(&id, edit).expect("lead edit accepted");
    }

    let barrier = Barrier::new(9);
    let released = thread::scope(|scope| {
        let editors: Vec<_> = (0..8)
            .map(|n| {
                let (service, id, barrier) = (&service, &id, &barrier);
                scope.spawn(move || {
                    barrier.wait();
                    service.update_lead(id, LeadEdit::Name(format!("Priya {n}")))
                })
            })
            .collect();

        barrier.wait();
        let released = service.submit(&id).expect("released");
        for editor in editors {
            let outcome = editor.join().expect("editor thread");
            assert!(matches!(
                outcome,
                Ok(_)
                    | Err(AssessmentServiceError::Assessment(AssessmentError::LeadFinalized(
                        LeadField::Name
                    )))
            ));
        }
        released
    });

    let status = service.status(&id).expect("status");
    assert_eq!(status.state, GateState::Released);
    assert_eq!(status.profile.as_ref(), Some(&released));
    assert_eq!(service.profile(&id).expect("lookup"), Some(released));
}

#[test]
fn concurrent_answers_are_all_kept() {
    let (service, _) = build_service();
    let id = service.start("riasec").expect("session started").id().clone();
    let taxonomy = service.registry().get("riasec").expect("riasec registered");
    let barrier = Barrier::new(taxonomy.question_count());

    thread::scope(|scope| {
        for question in taxonomy.questions() {
            let (service, id, barrier) = (&service, &id, &barrier);
            scope.spawn(move || {
                barrier.wait();
                service
                    .record_answer(id, question.id.clone(), question.options[0])
                    .expect("answer accepted");
            });
        }
    });

    let progress = service.status(&id).expect("status").progress;
    assert_eq!(progress.answered, taxonomy.question_count());
    assert_eq!(progress.value, 100);
}

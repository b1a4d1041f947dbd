use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::error::{AssessmentError, ConfigurationError};
use super::lead::LeadEdit;
use super::repository::{RepositoryError, SessionRepository};
use super::service::{AssessmentService, AssessmentServiceError};
use super::session::SessionId;
use super::taxonomy::{OptionSymbol, QuestionId};

#[derive(Debug, Deserialize)]
pub(crate) struct StartSessionRequest {
    pub(crate) assessment_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerRequest {
    pub(crate) question_id: String,
    pub(crate) option: String,
}

/// Router builder exposing the assessment session endpoints.
pub fn assessment_router<R>(service: Arc<AssessmentService<R>>) -> Router
where
    R: SessionRepository + 'static,
{
    Router::new()
        .route("/api/v1/assessments", get(catalogue_handler::<R>))
        .route("/api/v1/assessments/sessions", post(start_handler::<R>))
        .route(
            "/api/v1/assessments/sessions/:session_id",
            get(status_handler::<R>).delete(abandon_handler::<R>),
        )
        .route(
            "/api/v1/assessments/sessions/:session_id/answers",
            put(answer_handler::<R>),
        )
        .route(
            "/api/v1/assessments/sessions/:session_id/lead",
            put(lead_handler::<R>),
        )
        .route(
            "/api/v1/assessments/sessions/:session_id/submit",
            post(submit_handler::<R>),
        )
        .route(
            "/api/v1/assessments/sessions/:session_id/profile",
            get(profile_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn catalogue_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
) -> Response
where
    R: SessionRepository + 'static,
{
    (StatusCode::OK, Json(service.catalogue())).into_response()
}

pub(crate) async fn start_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Json(request): Json<StartSessionRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.start(&request.assessment_type) {
        Ok(session) => (StatusCode::CREATED, Json(session.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.status(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn answer_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let option = match OptionSymbol::parse(&request.option) {
        Ok(option) => option,
        Err(error) => return error_response(AssessmentError::from(error).into()),
    };

    match service.record_answer(
        &SessionId(session_id),
        QuestionId(request.question_id),
        option,
    ) {
        Ok(progress) => (StatusCode::OK, Json(progress)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn lead_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
    Json(edit): Json<LeadEdit>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.update_lead(&SessionId(session_id), edit) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.submit(&SessionId(session_id)) {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn profile_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.profile(&SessionId(session_id.clone())) {
        Ok(Some(profile)) => (StatusCode::OK, Json(profile)).into_response(),
        Ok(None) => {
            let payload = json!({
                "session_id": session_id,
                "error": "results are locked until the lead form is completed",
            });
            (StatusCode::FORBIDDEN, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn abandon_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.abandon(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AssessmentServiceError) -> Response {
    let (status, payload) = match &error {
        AssessmentServiceError::Assessment(AssessmentError::Configuration(
            ConfigurationError::UnknownAssessmentType(_),
        )) => (StatusCode::BAD_REQUEST, json!({ "error": error.to_string() })),
        AssessmentServiceError::Assessment(AssessmentError::InvalidOption(_)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": error.to_string() }),
        ),
        AssessmentServiceError::Assessment(AssessmentError::Validation(validation)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "error": error.to_string(),
                "fields": validation.failures,
            }),
        ),
        AssessmentServiceError::Assessment(
            AssessmentError::LeadFinalized(_) | AssessmentError::ResponsesClosed(_),
        )
        | AssessmentServiceError::Repository(RepositoryError::Conflict) => {
            (StatusCode::CONFLICT, json!({ "error": error.to_string() }))
        }
        AssessmentServiceError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, json!({ "error": error.to_string() }))
        }
        AssessmentServiceError::Assessment(AssessmentError::Configuration(_))
        | AssessmentServiceError::Repository(RepositoryError::Unavailable(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": error.to_string() }),
        ),
    };

    (status, Json(payload)).into_response()
}

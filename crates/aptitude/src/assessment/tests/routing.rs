use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::assessment::lead::LeadPolicy;
use crate::assessment::router::{assessment_router, status_handler};
use crate::assessment::service::AssessmentService;

fn router() -> Router {
    let (service, _) = build_service();
    assessment_router(Arc::new(service))
}

fn json_request(method: &str, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn start(router: &Router, assessment_type: &str) -> String {
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/assessments/sessions",
            &json!({ "assessment_type": assessment_type }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn catalogue_route_lists_assessments() {
    let response = router()
        .oneshot(empty_request("GET", "/api/v1/assessments"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let riasec = body
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["assessment_type"] == "riasec")
        .cloned()
        .unwrap();
    assert_eq!(riasec["question_count"], 12);
}

#[tokio::test]
async fn start_route_rejects_unknown_types() {
    let response = router()
        .oneshot(json_request(
            "POST",
            "/api/v1/assessments/sessions",
            &json!({ "assessment_type": "enneagram" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn answer_route_validates_options() {
    let router = router();
    let session_id = start(&router, "riasec-mini").await;
    let uri = format!("/api/v1/assessments/sessions/{session_id}/answers");

    let accepted = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &uri,
            &json!({ "question_id": "q1", "option": "A" }),
        ))
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::OK);
    let progress = read_json_body(accepted).await;
    assert_eq!(progress["answered"], 1);
    assert_eq!(progress["max"], 100);

    let malformed = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &uri,
            &json!({ "question_id": "q1", "option": "7" }),
        ))
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let not_offered = router
        .oneshot(json_request(
            "PUT",
            &uri,
            &json!({ "question_id": "q1", "option": "b" }),
        ))
        .await
        .unwrap();
    assert_eq!(not_offered.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn profile_stays_locked_until_submit_succeeds() {
    let router = router();
    let session_id = start(&router, "riasec-mini").await;
    let base = format!("/api/v1/assessments/sessions/{session_id}");

    for (question, option) in [("q1", "a"), ("q2", "a"), ("q3", "b")] {
        let response = router
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("{base}/answers"),
                &json!({ "question_id": question, "option": option }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let locked = router
        .clone()
        .oneshot(empty_request("GET", &format!("{base}/profile")))
        .await
        .unwrap();
    assert_eq!(locked.status(), StatusCode::FORBIDDEN);

    let rejected = router
        .clone()
        .oneshot(empty_request("POST", &format!("{base}/submit")))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(rejected).await;
    assert_eq!(body["fields"]["email"]["issue"], "missing");

    for edit in complete_lead() {
        let response = router
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("{base}/lead"),
                &serde_json::to_value(&edit).unwrap(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let released = router
        .clone()
        .oneshot(empty_request("POST", &format!("{base}/submit")))
        .await
        .unwrap();
    assert_eq!(released.status(), StatusCode::OK);
    let profile = read_json_body(released).await;
    assert_eq!(profile["dominant"], json!(["R"]));
    assert_eq!(profile["scores"][1]["normalized"], 50);

    let unlocked = router
        .clone()
        .oneshot(empty_request("GET", &format!("{base}/profile")))
        .await
        .unwrap();
    assert_eq!(unlocked.status(), StatusCode::OK);
    assert_eq!(read_json_body(unlocked).await, profile);

    let late_edit = router
        .oneshot(json_request(
            "PUT",
            &format!("{base}/lead"),
            &json!({ "field": "name", "value": "Someone Else" }),
        ))
        .await
        .unwrap();
    assert_eq!(late_edit.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn abandon_route_removes_sessions() {
    let router = router();
    let session_id = start(&router, "disc").await;
    let uri = format!("/api/v1/assessments/sessions/{session_id}");

    let deleted = router
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = router.oneshot(empty_request("GET", &uri)).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(AssessmentService::new(
        registry(),
        Arc::new(UnavailableRepository),
        LeadPolicy::default(),
    ));

    let response =
        status_handler::<UnavailableRepository>(State(service), Path("sess-1".to_string())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

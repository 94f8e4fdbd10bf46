//! # Integration Tests for mhub-api
//!
//! Drives the full router: authentication schemes, the mentorship
//! request lifecycle with the counterparty rule, scheduled call
//! confirmation and lazy auto-completion, and the participant gate on
//! collaboration resources.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use mhub_api::state::{AppConfig, AppState, RelationshipRecord, RelationshipStatus};

/// Helper: build the test app with secret verification disabled.
fn test_app() -> axum::Router {
    let state = AppState::new();
    mhub_api::app(state)
}

/// Helper: build the test app with a configured session secret.
fn test_app_with_auth(token: &str) -> axum::Router {
    let config = AppConfig {
        port: 8080,
        auth_token: Some(token.to_string()),
    };
    let state = AppState::with_config(config, None);
    mhub_api::app(state)
}

fn mentor_bearer(id: Uuid) -> String {
    format!("Bearer mentor:{id}")
}

fn user_bearer(id: Uuid) -> String {
    format!("Bearer user:{id}")
}

/// Helper: send one request through a clone of the app.
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> axum::http::Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper: register a startup owned by `owner`; returns the startup id.
async fn create_startup(app: &axum::Router, owner: Uuid, name: &str) -> Uuid {
    let response = send(
        app,
        "POST",
        "/v1/startups",
        Some(&user_bearer(owner)),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["id"].as_str().unwrap().parse().unwrap()
}

/// Helper: mentor-initiated request against a startup; returns the
/// request id.
async fn create_request(app: &axum::Router, mentor: Uuid, startup_id: Uuid) -> Uuid {
    let response = send(
        app,
        "POST",
        "/v1/requests",
        Some(&mentor_bearer(mentor)),
        Some(json!({
            "mentor_id": mentor,
            "startup_id": startup_id,
            "message": "I would like to mentor your team"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["id"].as_str().unwrap().parse().unwrap()
}

/// Helper: full happy path to an ACTIVE relationship. Returns
/// (mentor, owner, relationship id).
async fn establish_relationship(app: &axum::Router) -> (Uuid, Uuid, Uuid) {
    let mentor = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(app, owner, "Acme Robotics").await;
    let request_id = create_request(app, mentor, startup_id).await;

    let response = send(
        app,
        "POST",
        &format!("/v1/requests/{request_id}/accept"),
        Some(&user_bearer(owner)),
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let relationship_id = body["relationship"]["id"].as_str().unwrap().parse().unwrap();
    (mentor, owner, relationship_id)
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn liveness_probe_is_unauthenticated() {
    let app = test_app();
    let response = send(&app, "GET", "/health/liveness", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn readiness_probe_is_unauthenticated() {
    let app = test_app();
    let response = send(&app, "GET", "/health/readiness", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn api_rejects_missing_authorization() {
    let app = test_app();
    let response = send(&app, "GET", "/v1/startups", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn both_credential_schemes_resolve() {
    let app = test_app();
    let mentor = Uuid::new_v4();
    let user = Uuid::new_v4();

    let response = send(&app, "GET", "/v1/requests", Some(&mentor_bearer(mentor)), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/v1/requests", Some(&user_bearer(user)), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn configured_secret_is_enforced() {
    let app = test_app_with_auth("session-secret");
    let id = Uuid::new_v4();

    let response = send(
        &app,
        "GET",
        "/v1/requests",
        Some(&format!("Bearer mentor:{id}:session-secret")),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "GET",
        "/v1/requests",
        Some(&format!("Bearer mentor:{id}:wrong-secret")),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Scheme without a secret is rejected when one is configured.
    let response = send(&app, "GET", "/v1/requests", Some(&mentor_bearer(id)), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// -- Startups -----------------------------------------------------------------

#[tokio::test]
async fn startup_creation_records_the_caller_as_owner() {
    let app = test_app();
    let owner = Uuid::new_v4();

    let response = send(
        &app,
        "POST",
        "/v1/startups",
        Some(&user_bearer(owner)),
        Some(json!({ "name": "Acme Robotics" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["owner_id"], json!(owner));
    assert_eq!(body["name"], "Acme Robotics");
}

#[tokio::test]
async fn startup_name_must_not_be_empty() {
    let app = test_app();
    let response = send(
        &app,
        "POST",
        "/v1/startups",
        Some(&user_bearer(Uuid::new_v4())),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// -- Request Lifecycle --------------------------------------------------------

#[tokio::test]
async fn mentor_initiated_request_starts_pending() {
    let app = test_app();
    let mentor = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(&app, owner, "Acme Robotics").await;

    let response = send(
        &app,
        "POST",
        "/v1/requests",
        Some(&mentor_bearer(mentor)),
        Some(json!({
            "mentor_id": mentor,
            "startup_id": startup_id,
            "message": "I would like to mentor your team"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["initiated_by"], "MENTOR");
}

#[tokio::test]
async fn startup_owner_initiated_request_is_marked_startup() {
    let app = test_app();
    let mentor = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(&app, owner, "Acme Robotics").await;

    let response = send(
        &app,
        "POST",
        "/v1/requests",
        Some(&user_bearer(owner)),
        Some(json!({
            "mentor_id": mentor,
            "startup_id": startup_id,
            "message": "We would love your guidance"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["initiated_by"], "STARTUP");
}

#[tokio::test]
async fn request_creation_requires_being_a_named_party() {
    let app = test_app();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(&app, owner, "Acme Robotics").await;

    let response = send(
        &app,
        "POST",
        "/v1/requests",
        Some(&user_bearer(Uuid::new_v4())),
        Some(json!({
            "mentor_id": Uuid::new_v4(),
            "startup_id": startup_id,
            "message": "hello"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_pending_request_is_a_conflict() {
    let app = test_app();
    let mentor = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(&app, owner, "Acme Robotics").await;
    create_request(&app, mentor, startup_id).await;

    let response = send(
        &app,
        "POST",
        "/v1/requests",
        Some(&mentor_bearer(mentor)),
        Some(json!({
            "mentor_id": mentor,
            "startup_id": startup_id,
            "message": "asking again"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn empty_request_message_is_rejected() {
    let app = test_app();
    let mentor = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(&app, owner, "Acme Robotics").await;

    let response = send(
        &app,
        "POST",
        "/v1/requests",
        Some(&mentor_bearer(mentor)),
        Some(json!({
            "mentor_id": mentor,
            "startup_id": startup_id,
            "message": ""
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn initiator_cannot_accept_their_own_request() {
    let app = test_app();
    let mentor = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(&app, owner, "Acme Robotics").await;
    let request_id = create_request(&app, mentor, startup_id).await;

    let response = send(
        &app,
        "POST",
        &format!("/v1/requests/{request_id}/accept"),
        Some(&mentor_bearer(mentor)),
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn counterparty_accept_creates_the_relationship() {
    let app = test_app();
    let mentor = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(&app, owner, "Acme Robotics").await;
    let request_id = create_request(&app, mentor, startup_id).await;

    let response = send(
        &app,
        "POST",
        &format!("/v1/requests/{request_id}/accept"),
        Some(&user_bearer(owner)),
        Some(json!({ "response": "Happy to work together" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["request"]["status"], "ACCEPTED");
    assert_eq!(body["request"]["response"], "Happy to work together");
    assert_eq!(body["relationship"]["status"], "ACTIVE");
    assert_eq!(body["relationship"]["mentor_id"], json!(mentor));
    assert_eq!(body["relationship"]["startup_owner_id"], json!(owner));

    // Both participants see exactly one relationship.
    for bearer in [mentor_bearer(mentor), user_bearer(owner)] {
        let response = send(&app, "GET", "/v1/relationships", Some(&bearer), None).await;
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn second_accept_is_a_conflict_and_creates_no_second_relationship() {
    let app = test_app();
    let mentor = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(&app, owner, "Acme Robotics").await;
    let request_id = create_request(&app, mentor, startup_id).await;

    let first = send(
        &app,
        "POST",
        &format!("/v1/requests/{request_id}/accept"),
        Some(&user_bearer(owner)),
        Some(json!({})),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = send(
        &app,
        "POST",
        &format!("/v1/requests/{request_id}/accept"),
        Some(&user_bearer(owner)),
        Some(json!({})),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let response = send(&app, "GET", "/v1/relationships", Some(&user_bearer(owner)), None).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn accept_conflicts_when_the_pair_already_has_an_active_relationship() {
    let state = AppState::new();
    let app = mhub_api::app(state.clone());
    let mentor = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(&app, owner, "Acme Robotics").await;
    let request_id = create_request(&app, mentor, startup_id).await;

    // An ACTIVE relationship for the same pair lands after the request
    // was created, as a concurrently accepted sibling request would.
    let existing = RelationshipRecord {
        id: Uuid::new_v4(),
        mentor_id: mentor,
        startup_id,
        startup_owner_id: owner,
        status: RelationshipStatus::Active,
        start_date: chrono::Utc::now(),
    };
    state.relationships.insert(existing.id, existing);

    let response = send(
        &app,
        "POST",
        &format!("/v1/requests/{request_id}/accept"),
        Some(&user_bearer(owner)),
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // No second ACTIVE relationship, and the request is still open.
    let response = send(&app, "GET", "/v1/relationships", Some(&user_bearer(owner)), None).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = send(
        &app,
        "GET",
        &format!("/v1/requests/{request_id}"),
        Some(&user_bearer(owner)),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["status"], "PENDING");
}

#[tokio::test]
async fn decline_resolves_without_a_relationship() {
    let app = test_app();
    let mentor = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(&app, owner, "Acme Robotics").await;
    let request_id = create_request(&app, mentor, startup_id).await;

    let response = send(
        &app,
        "POST",
        &format!("/v1/requests/{request_id}/decline"),
        Some(&user_bearer(owner)),
        Some(json!({ "response": "Not the right fit" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["request"]["status"], "DECLINED");

    let response = send(&app, "GET", "/v1/relationships", Some(&mentor_bearer(mentor)), None).await;
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());

    // A declined request cannot be accepted afterwards.
    let response = send(
        &app,
        "POST",
        &format!("/v1/requests/{request_id}/accept"),
        Some(&user_bearer(owner)),
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn request_listing_is_scoped_to_participants() {
    let app = test_app();
    let mentor = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let startup_id = create_startup(&app, owner, "Acme Robotics").await;
    let request_id = create_request(&app, mentor, startup_id).await;

    let response = send(&app, "GET", "/v1/requests", Some(&user_bearer(owner)), None).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = send(
        &app,
        "GET",
        "/v1/requests",
        Some(&user_bearer(Uuid::new_v4())),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());

    let response = send(
        &app,
        "GET",
        &format!("/v1/requests/{request_id}"),
        Some(&user_bearer(Uuid::new_v4())),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// -- Relationships ------------------------------------------------------------

#[tokio::test]
async fn relationship_access_is_participant_gated() {
    let app = test_app();
    let (_, owner, relationship_id) = establish_relationship(&app).await;

    let response = send(
        &app,
        "GET",
        &format!("/v1/relationships/{relationship_id}"),
        Some(&user_bearer(owner)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "GET",
        &format!("/v1/relationships/{relationship_id}"),
        Some(&user_bearer(Uuid::new_v4())),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        "GET",
        &format!("/v1/relationships/{}", Uuid::new_v4()),
        Some(&user_bearer(owner)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Scheduled Calls ----------------------------------------------------------

#[tokio::test]
async fn proposed_call_defaults_and_derives_the_meeting_url() {
    let app = test_app();
    let (mentor, _, relationship_id) = establish_relationship(&app).await;

    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/scheduled-calls"),
        Some(&mentor_bearer(mentor)),
        Some(json!({
            "title": "Kickoff",
            "scheduled_at": "2027-01-10T15:00:00Z"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["duration_minutes"], 30);
    assert_eq!(
        body["meeting_url"],
        format!("https://meet.jit.si/mentorhub-{relationship_id}")
    );
}

#[tokio::test]
async fn call_proposal_requires_a_scheduled_time() {
    let app = test_app();
    let (mentor, _, relationship_id) = establish_relationship(&app).await;

    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/scheduled-calls"),
        Some(&mentor_bearer(mentor)),
        Some(json!({ "title": "Kickoff" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn call_duration_is_bounded() {
    let app = test_app();
    let (mentor, _, relationship_id) = establish_relationship(&app).await;

    for minutes in [0i64, -5, 1441, i64::MAX] {
        let response = send(
            &app,
            "POST",
            &format!("/v1/relationships/{relationship_id}/scheduled-calls"),
            Some(&mentor_bearer(mentor)),
            Some(json!({
                "title": "Marathon",
                "scheduled_at": "2027-01-10T15:00:00Z",
                "duration_minutes": minutes
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    // A full-day call is the longest accepted, and the list stays
    // readable once it is on the books.
    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/scheduled-calls"),
        Some(&mentor_bearer(mentor)),
        Some(json!({
            "title": "Offsite",
            "scheduled_at": "2027-01-10T15:00:00Z",
            "duration_minutes": 1440
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        "GET",
        &format!("/v1/relationships/{relationship_id}/scheduled-calls"),
        Some(&mentor_bearer(mentor)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn proposer_cannot_confirm_their_own_call() {
    let app = test_app();
    let (mentor, owner, relationship_id) = establish_relationship(&app).await;

    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/scheduled-calls"),
        Some(&mentor_bearer(mentor)),
        Some(json!({
            "title": "Kickoff",
            "scheduled_at": "2027-01-10T15:00:00Z"
        })),
    )
    .await;
    let call_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        "POST",
        &format!("/v1/scheduled-calls/{call_id}/confirm"),
        Some(&mentor_bearer(mentor)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The counterparty may confirm.
    let response = send(
        &app,
        "POST",
        &format!("/v1/scheduled-calls/{call_id}/confirm"),
        Some(&user_bearer(owner)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "CONFIRMED");

    // Confirming again is a state conflict, not an authorization error.
    let response = send(
        &app,
        "POST",
        &format!("/v1/scheduled-calls/{call_id}/confirm"),
        Some(&user_bearer(owner)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn outsiders_cannot_respond_to_a_call() {
    let app = test_app();
    let (mentor, _, relationship_id) = establish_relationship(&app).await;

    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/scheduled-calls"),
        Some(&mentor_bearer(mentor)),
        Some(json!({
            "title": "Kickoff",
            "scheduled_at": "2027-01-10T15:00:00Z"
        })),
    )
    .await;
    let call_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        "POST",
        &format!("/v1/scheduled-calls/{call_id}/decline"),
        Some(&user_bearer(Uuid::new_v4())),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

async fn propose_and_confirm(
    app: &axum::Router,
    mentor: Uuid,
    owner: Uuid,
    relationship_id: Uuid,
    title: &str,
    scheduled_at: chrono::DateTime<chrono::Utc>,
) -> String {
    let response = send(
        app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/scheduled-calls"),
        Some(&mentor_bearer(mentor)),
        Some(json!({
            "title": title,
            "scheduled_at": scheduled_at.to_rfc3339()
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let call_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = send(
        app,
        "POST",
        &format!("/v1/scheduled-calls/{call_id}/confirm"),
        Some(&user_bearer(owner)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    call_id
}

#[tokio::test]
async fn listing_completes_elapsed_confirmed_calls_only() {
    let app = test_app();
    let (mentor, owner, relationship_id) = establish_relationship(&app).await;
    let now = chrono::Utc::now();

    // Elapsed: ended well over its 30-minute window ago.
    let elapsed_id = propose_and_confirm(
        &app,
        mentor,
        owner,
        relationship_id,
        "Retro",
        now - chrono::Duration::hours(2),
    )
    .await;
    // In progress: started 10 minutes ago, 30-minute window still open.
    let in_progress_id = propose_and_confirm(
        &app,
        mentor,
        owner,
        relationship_id,
        "Standup",
        now - chrono::Duration::minutes(10),
    )
    .await;
    // Future: has not started.
    let future_id = propose_and_confirm(
        &app,
        mentor,
        owner,
        relationship_id,
        "Planning",
        now + chrono::Duration::hours(2),
    )
    .await;

    let response = send(
        &app,
        "GET",
        &format!("/v1/relationships/{relationship_id}/scheduled-calls"),
        Some(&mentor_bearer(mentor)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let calls = body["scheduled_calls"].as_array().unwrap();
    assert_eq!(calls.len(), 3);

    let status_of = |id: &str| {
        calls
            .iter()
            .find(|c| c["id"] == *id)
            .map(|c| c["status"].clone())
            .unwrap()
    };
    assert_eq!(status_of(&elapsed_id), "COMPLETED");
    assert_eq!(status_of(&in_progress_id), "CONFIRMED");
    assert_eq!(status_of(&future_id), "CONFIRMED");

    // Chronological order: elapsed, in progress, future.
    assert_eq!(calls[0]["id"], elapsed_id);
    assert_eq!(calls[1]["id"], in_progress_id);
    assert_eq!(calls[2]["id"], future_id);
}

#[tokio::test]
async fn declined_calls_are_never_swept_to_completed() {
    let app = test_app();
    let (mentor, owner, relationship_id) = establish_relationship(&app).await;
    let past = chrono::Utc::now() - chrono::Duration::hours(3);

    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/scheduled-calls"),
        Some(&mentor_bearer(mentor)),
        Some(json!({
            "title": "Never happened",
            "scheduled_at": past.to_rfc3339()
        })),
    )
    .await;
    let call_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        "POST",
        &format!("/v1/scheduled-calls/{call_id}/decline"),
        Some(&user_bearer(owner)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "GET",
        &format!("/v1/relationships/{relationship_id}/scheduled-calls"),
        Some(&user_bearer(owner)),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["scheduled_calls"][0]["status"], "DECLINED");
}

// -- Collaboration Resources --------------------------------------------------

#[tokio::test]
async fn notes_round_trip_within_a_relationship() {
    let app = test_app();
    let (mentor, owner, relationship_id) = establish_relationship(&app).await;

    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/notes"),
        Some(&mentor_bearer(mentor)),
        Some(json!({ "title": "Kickoff notes", "content": "Agreed on weekly calls" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let note = body_json(response).await;
    assert_eq!(note["author_id"], json!(mentor));

    let response = send(
        &app,
        "GET",
        &format!("/v1/relationships/{relationship_id}/notes"),
        Some(&user_bearer(owner)),
        None,
    )
    .await;
    let body = body_json(response).await;
    let notes = body.as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "Kickoff notes");
}

#[tokio::test]
async fn only_the_author_may_edit_a_note() {
    let app = test_app();
    let (mentor, owner, relationship_id) = establish_relationship(&app).await;

    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/notes"),
        Some(&mentor_bearer(mentor)),
        Some(json!({ "title": "Draft", "content": "v1" })),
    )
    .await;
    let note_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // The other participant can read but not edit.
    let response = send(
        &app,
        "PUT",
        &format!("/v1/relationships/{relationship_id}/notes"),
        Some(&user_bearer(owner)),
        Some(json!({ "note_id": note_id, "title": "Hijacked", "content": "v2" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        "PUT",
        &format!("/v1/relationships/{relationship_id}/notes"),
        Some(&mentor_bearer(mentor)),
        Some(json!({ "note_id": note_id, "title": "Final", "content": "v2" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Final");
    assert_eq!(body["content"], "v2");
}

#[tokio::test]
async fn messages_append_in_send_order() {
    let app = test_app();
    let (mentor, owner, relationship_id) = establish_relationship(&app).await;
    let uri = format!("/v1/relationships/{relationship_id}/messages");

    for (bearer, content) in [
        (mentor_bearer(mentor), "Hello!"),
        (user_bearer(owner), "Hi, thanks for accepting"),
    ] {
        let response = send(&app, "POST", &uri, Some(&bearer), Some(json!({ "content": content }))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&app, "GET", &uri, Some(&mentor_bearer(mentor)), None).await;
    let body = body_json(response).await;
    let messages = body.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "Hello!");
    assert_eq!(messages[1]["content"], "Hi, thanks for accepting");
}

#[tokio::test]
async fn empty_message_content_is_rejected() {
    let app = test_app();
    let (mentor, _, relationship_id) = establish_relationship(&app).await;

    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/messages"),
        Some(&mentor_bearer(mentor)),
        Some(json!({ "content": "  " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn file_metadata_registers_and_lists() {
    let app = test_app();
    let (mentor, owner, relationship_id) = establish_relationship(&app).await;

    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/files"),
        Some(&user_bearer(owner)),
        Some(json!({
            "file_name": "pitch-deck.pdf",
            "file_path": "uploads/8f2c/pitch-deck.pdf",
            "size_bytes": 482133
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["uploader_id"], json!(owner));

    let response = send(
        &app,
        "GET",
        &format!("/v1/relationships/{relationship_id}/files"),
        Some(&mentor_bearer(mentor)),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn every_collaboration_resource_rejects_outsiders() {
    let app = test_app();
    let (_, _, relationship_id) = establish_relationship(&app).await;
    let outsider = user_bearer(Uuid::new_v4());

    for resource in ["messages", "files", "notes", "scheduled-calls"] {
        let response = send(
            &app,
            "GET",
            &format!("/v1/relationships/{relationship_id}/{resource}"),
            Some(&outsider),
            None,
        )
        .await;
        assert_eq!(
            response.status(),
            StatusCode::FORBIDDEN,
            "outsider should be forbidden from {resource}"
        );
    }
}

#[tokio::test]
async fn resource_gate_runs_before_body_validation() {
    let app = test_app();
    let (mentor, _, relationship_id) = establish_relationship(&app).await;
    let outsider = Uuid::new_v4();
    let invalid = json!({ "content": "" });

    // Unknown relationship: 404 even though the body is invalid.
    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{}/messages", Uuid::new_v4()),
        Some(&user_bearer(outsider)),
        Some(invalid.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Known relationship, non-participant: 403 before 422.
    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/messages"),
        Some(&user_bearer(outsider)),
        Some(invalid.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Only a participant learns the body was invalid.
    let response = send(
        &app,
        "POST",
        &format!("/v1/relationships/{relationship_id}/messages"),
        Some(&mentor_bearer(mentor)),
        Some(invalid),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn openapi_spec_is_served() {
    let app = test_app();
    let response = send(
        &app,
        "GET",
        "/openapi.json",
        Some(&user_bearer(Uuid::new_v4())),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["info"]["title"], "MentorHub API");
    assert!(body["paths"].get("/v1/requests").is_some());
}

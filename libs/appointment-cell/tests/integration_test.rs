// libs/appointment-cell/tests/integration_test.rs
use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path};

use appointment_cell::router::appointment_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{TestConfig, MockSupabaseResponses};

fn create_test_app(config: AppConfig) -> Router {
    appointment_routes(Arc::new(config))
}

fn post_appointment(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn appointment_body(doctor_id: Uuid, time: &str, kind: &str) -> serde_json::Value {
    json!({
        "doctor_id": doctor_id,
        "patient_first_name": "Jane",
        "patient_last_name": "Smith",
        "date": "2024-04-20",
        "time": time,
        "kind": kind
    })
}

#[tokio::test]
async fn test_create_appointment_returns_200() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::with_url(&mock_server.uri()).to_app_config());

    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response(&doctor_id.to_string(), "John", "Doe")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/slot_locks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::slot_lock_response("slot", &doctor_id.to_string())
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/slot_locks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_response(
                &Uuid::new_v4().to_string(), &doctor_id.to_string(),
                "Jane", "Smith", "2024-04-20", "08:15", "New Patient",
            )
        ])))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(post_appointment(appointment_body(doctor_id, "08:15", "New Patient")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_appointment_invalid_time_returns_422() {
    let app = create_test_app(TestConfig::default().to_app_config());

    let response = app
        .oneshot(post_appointment(appointment_body(Uuid::new_v4(), "08:05", "New Patient")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_appointment_unknown_kind_returns_422() {
    let app = create_test_app(TestConfig::default().to_app_config());

    let response = app
        .oneshot(post_appointment(appointment_body(Uuid::new_v4(), "08:15", "Walk-in")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_appointment_full_slot_returns_400() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::with_url(&mock_server.uri()).to_app_config());

    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response(&doctor_id.to_string(), "John", "Doe")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/slot_locks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::slot_lock_response("slot", &doctor_id.to_string())
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/slot_locks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let full_slot: Vec<_> = (0..3)
        .map(|i| MockSupabaseResponses::appointment_response(
            &Uuid::new_v4().to_string(), &doctor_id.to_string(),
            &format!("Patient{}", i), "Smith", "2024-04-20", "08:15", "Follow-up",
        ))
        .collect();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(full_slot)))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(post_appointment(appointment_body(doctor_id, "08:15", "Follow-up")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_appointments_returns_200() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::with_url(&mock_server.uri()).to_app_config());

    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}/2024-04-20", doctor_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_delete_unknown_appointment_returns_404() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::with_url(&mock_server.uri()).to_app_config());

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/{}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

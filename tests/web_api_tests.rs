//! Integration tests for the web API.
//!
//! These tests verify the HTTP API endpoints against a mock device.

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use gpio_panel::hal::MockTransport;
use gpio_panel::services::{build_router, ApiResponse, SharedPanel, WebServerConfig};
use gpio_panel::Panel;

fn create_test_app() -> (axum::Router, Arc<SharedPanel<MockTransport>>) {
    let mut panel = Panel::new(MockTransport::new(), "ws://192.168.4.1/ws");
    panel.start(0);
    panel.poll(0);
    let state = Arc::new(SharedPanel::new(panel));
    let config = WebServerConfig::default();
    let router = build_router(Arc::clone(&state), &config);
    (router, state)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, ApiResponse<Value>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_list_pins() {
    let (app, _state) = create_test_app();

    let (status, json) = send(&app, get("/api/pins")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json.success);
    let pins = json.data.unwrap();
    let pins = pins.as_array().unwrap();
    assert_eq!(pins.len(), 32);

    let gnd = pins.iter().find(|p| p["id"] == "GND").unwrap();
    assert_eq!(gnd["visualClass"], "excluded");
    let io34 = pins.iter().find(|p| p["id"] == "IO34").unwrap();
    assert_eq!(io34["capability"], "input_only");
    assert_eq!(io34["visualClass"], "neconfig");
}

#[tokio::test]
async fn test_begin_edit() {
    let (app, _state) = create_test_app();

    let (status, json) = send(&app, get("/api/pins/IO34")).await;

    assert_eq!(status, StatusCode::OK);
    let session = json.data.unwrap();
    assert_eq!(session["pinId"], "IO34");
    assert_eq!(session["inputOnly"], true);
    assert_eq!(session["direction"], "Input");
}

#[tokio::test]
async fn test_begin_edit_unknown_pin() {
    let (app, _state) = create_test_app();

    let (status, json) = send(&app, get("/api/pins/IO99")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!json.success);
    assert!(json.error.is_some());
}

#[tokio::test]
async fn test_begin_edit_excluded_pin() {
    let (app, _state) = create_test_app();

    let (status, json) = send(&app, get("/api/pins/GND")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!json.success);
    assert!(json.error.is_some());
}

#[tokio::test]
async fn test_commit_gpio_output() {
    let (app, state) = create_test_app();

    let (status, json) = send(
        &app,
        post("/api/pins/IO5", r#"{"function": "GPIO", "type": "Output"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = json.data.unwrap();
    assert_eq!(data["accepted"], true);
    assert_eq!(data["delivery"], "sent");
    assert_eq!(data["config"]["function"], "GPIO5");

    state.with_panel(|panel| {
        assert!(panel.store().get("IO5").is_some_and(|c| c.is_output()));
        assert_eq!(panel.channel().transport().sent_commands(), ["configurePin"]);
    });
}

#[tokio::test]
async fn test_commit_pwm_bad_frequency() {
    let (app, state) = create_test_app();

    let (status, _json) = send(
        &app,
        post("/api/pins/IO2", r#"{"function": "PWM", "freq": "abc", "duty": 70}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let sent = state.with_panel(|panel| panel.channel().transport().sent_json());
    assert_eq!(sent[0]["freq"], 1000);
    assert_eq!(sent[0]["duty"], 70);
}

#[tokio::test]
async fn test_commit_invalid_body() {
    let (app, _state) = create_test_app();

    let (status, json) = send(&app, post("/api/pins/IO5", "not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!json.success);
}

#[tokio::test]
async fn test_commit_pwm_on_input_only_pin() {
    let (app, state) = create_test_app();

    let (status, _json) = send(&app, post("/api/pins/IO34", r#"{"function": "PWM"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(state.with_panel(|panel| panel.store().is_empty()));
}

#[tokio::test]
async fn test_set_state_requires_output() {
    let (app, _state) = create_test_app();

    send(
        &app,
        post("/api/pins/IO18", r#"{"function": "GPIO", "type": "Input"}"#),
    )
    .await;
    let (status, json) = send(&app, post("/api/pins/IO18/state", r#"{"value": 1}"#)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(!json.success);
}

#[tokio::test]
async fn test_set_state_output() {
    let (app, state) = create_test_app();

    send(
        &app,
        post("/api/pins/IO5", r#"{"function": "GPIO", "type": "Output"}"#),
    )
    .await;
    let (status, json) = send(&app, post("/api/pins/IO5/state", r#"{"value": 1}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.data.unwrap()["delivery"], "sent");

    let sent = state.with_panel(|panel| panel.channel().transport().sent_json());
    assert_eq!(sent[1]["command"], "setPinState");
    assert_eq!(sent[1]["pinId"], "IO5");
    assert_eq!(sent[1]["value"], 1);
}

#[tokio::test]
async fn test_reset_clears_dashboard() {
    let (app, _state) = create_test_app();

    send(&app, post("/api/pins/IO32", r#"{"function": "ADC", "sensorType": "LDR"}"#)).await;
    let (_, json) = send(&app, get("/api/dashboard")).await;
    let entries = json.data.unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["title"], "ADC - IO32");

    let (status, json) = send(&app, post("/api/reset", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.data.unwrap()["accepted"], true);

    let (_, json) = send(&app, get("/api/dashboard")).await;
    assert!(json.data.unwrap().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_status() {
    let (app, _state) = create_test_app();

    send(
        &app,
        post("/api/pins/IO5", r#"{"function": "GPIO", "type": "Output"}"#),
    )
    .await;
    let (status, json) = send(&app, get("/api/status")).await;

    assert_eq!(status, StatusCode::OK);
    let data = json.data.unwrap();
    assert_eq!(data["connection"], "open");
    assert_eq!(data["configuredPins"], 1);
    assert_eq!(data["stats"]["sent"], 1);
}

#[tokio::test]
async fn test_not_found() {
    let (app, _state) = create_test_app();

    let (status, json) = send(&app, get("/nonexistent")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!json.success);
}
